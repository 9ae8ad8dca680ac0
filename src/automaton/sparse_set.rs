//! Sparse set of NFA state ids with O(1) clear.
//!
//! Based on: https://research.swtch.com/sparse
//!
//! The subset compiler computes one epsilon closure per (DFA state, symbol)
//! pair, so the scratch set is cleared far more often than it is filled.

use super::arena::StateId;

/// A set of `StateId`s below a fixed capacity, kept in insertion order.
#[derive(Clone, Debug)]
pub struct SparseSet {
    len: usize,
    /// Members in insertion order; only `dense[..len]` is meaningful.
    dense: Vec<StateId>,
    /// `id` is a member iff `sparse[id] < len && dense[sparse[id]] == id`.
    sparse: Vec<usize>,
}

impl SparseSet {
    /// Create an empty set accepting ids in `[0, capacity)`.
    pub fn new(capacity: usize) -> Self {
        SparseSet {
            len: 0,
            dense: vec![StateId::new(0); capacity],
            sparse: vec![0; capacity],
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.dense.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `id`, returning true if it was not already present.
    ///
    /// Panics if `id` is outside the capacity.
    #[inline]
    pub fn insert(&mut self, id: StateId) -> bool {
        if self.contains(id) {
            return false;
        }
        debug_assert!(
            self.len < self.capacity(),
            "SparseSet overflow: len={}, capacity={}",
            self.len,
            self.capacity()
        );
        self.dense[self.len] = id;
        self.sparse[id.index()] = self.len;
        self.len += 1;
        true
    }

    #[inline]
    pub fn contains(&self, id: StateId) -> bool {
        let slot = self.sparse[id.index()];
        slot < self.len && self.dense[slot] == id
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.dense[..self.len].iter().copied()
    }

    /// Members sorted by id, the canonical key of a DFA state.
    pub fn to_sorted_vec(&self) -> Vec<StateId> {
        let mut members = self.dense[..self.len].to_vec();
        members.sort_unstable();
        members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> StateId {
        StateId::new(n)
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = SparseSet::new(8);
        assert!(set.is_empty());
        assert!(set.insert(id(5)));
        assert!(set.insert(id(2)));
        assert!(!set.insert(id(5)), "duplicate insert must report false");
        assert_eq!(set.len(), 2);
        assert!(set.contains(id(2)));
        assert!(!set.contains(id(3)));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![id(5), id(2)]);
        assert_eq!(set.to_sorted_vec(), vec![id(2), id(5)]);
    }

    #[test]
    fn test_clear_forgets_stale_slots() {
        let mut set = SparseSet::new(4);
        set.insert(id(3));
        set.insert(id(1));
        set.clear();
        assert!(!set.contains(id(3)));
        assert!(set.insert(id(1)));
        assert!(!set.contains(id(3)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_sorted_members() {
        let mut set = SparseSet::new(8);
        for i in [6, 0, 3] {
            set.insert(id(i));
        }
        assert_eq!(set.capacity(), 8);
        assert_eq!(set.to_sorted_vec(), vec![id(0), id(3), id(6)]);
    }
}
