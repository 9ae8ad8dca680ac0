//! Subset construction: NFA → DFA.
//!
//! Every DFA state stands for the epsilon-closed set of NFA states the
//! automaton could be in. Symbols are treated as opaque labels, exactly as
//! they appear on NFA transitions; the matcher decides which label a scalar
//! follows (see `traverse`).
//!
//! Besides the transition graph, two pieces of metadata are carried over:
//!
//! - capture tags: a DFA transition built from an NFA edge that belongs to a
//!   capture group is tagged with that group, keyed by destination state;
//! - trace ids: a final DFA state remembers which source pattern accepts.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use super::arena::{Edge, Nfa, PatternId, StateId};
use super::sparse_set::SparseSet;
use super::symbol::Symbol;

/// Raised when the subset construction exceeds its state budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("subset construction exceeded {limit} DFA states")]
pub struct StateLimitExceeded {
    pub limit: usize,
}

/// A state of a deterministic automaton.
#[derive(Clone, Debug, Default)]
pub struct DfaState {
    transitions: FxHashMap<Symbol, StateId>,
    /// `NoneOf` transitions in alphabet order, for the matcher's priority scan.
    exclusions: Vec<(Symbol, StateId)>,
    /// Capture group credited when moving to the destination state.
    captures: FxHashMap<StateId, usize>,
    is_final: bool,
    pattern: Option<PatternId>,
}

impl DfaState {
    #[inline]
    pub fn next(&self, symbol: &Symbol) -> Option<StateId> {
        self.transitions.get(symbol).copied()
    }

    /// Destination of the first `NoneOf` transition whose set excludes `c`.
    #[inline]
    pub fn next_excluding(&self, c: char) -> Option<StateId> {
        self.exclusions
            .iter()
            .find(|(symbol, _)| symbol.accepts(c))
            .map(|&(_, dest)| dest)
    }

    /// Capture group credited for the transition into `dest`, if any.
    #[inline]
    pub fn capture_group(&self, dest: StateId) -> Option<usize> {
        self.captures.get(&dest).copied()
    }

    #[inline]
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// The source pattern accepting in this state.
    #[inline]
    pub fn pattern(&self) -> Option<PatternId> {
        self.pattern
    }

    pub fn transitions(&self) -> impl Iterator<Item = (&Symbol, StateId)> + '_ {
        self.transitions.iter().map(|(s, &d)| (s, d))
    }
}

/// An immutable deterministic automaton, safe to share between threads.
#[derive(Clone, Debug)]
pub struct Dfa {
    states: Vec<DfaState>,
    initial: StateId,
}

impl Dfa {
    /// Build the DFA equivalent to `nfa` over its symbol alphabet.
    ///
    /// `max_states` bounds the number of DFA states; the construction is
    /// otherwise unbounded and can grow exponentially in the NFA size.
    pub fn from_nfa(nfa: &Nfa, max_states: Option<usize>) -> Result<Dfa, StateLimitExceeded> {
        let alphabet = nfa.alphabet();

        // Edge → group, innermost group first. Captures are stored in the
        // order they were recorded, and an inner group is always recorded
        // before the group enclosing it.
        let mut capture_index: FxHashMap<Edge, usize> = FxHashMap::default();
        for set in nfa.captures() {
            for edge in &set.edges {
                capture_index.entry(edge.clone()).or_insert(set.group);
            }
        }

        let mut scratch = SparseSet::new(nfa.len());
        let mut states: Vec<DfaState> = Vec::new();
        let mut index: FxHashMap<Vec<StateId>, StateId> = FxHashMap::default();
        let mut pending: VecDeque<(StateId, Vec<StateId>)> = VecDeque::new();

        let start = nfa.epsilon_closure([nfa.initial()], &mut scratch);
        let initial = intern(nfa, start, &mut states, &mut index, &mut pending, max_states)?;

        let mut targets: Vec<StateId> = Vec::new();
        while let Some((id, members)) = pending.pop_front() {
            for symbol in &alphabet {
                targets.clear();
                let mut group: Option<usize> = None;

                for &from in &members {
                    let Some(dests) = nfa.state(from).transitions.get(symbol) else {
                        continue;
                    };
                    for &to in dests {
                        targets.push(to);
                        if group.is_none() && !capture_index.is_empty() {
                            let edge = Edge {
                                from,
                                to,
                                symbol: symbol.clone(),
                            };
                            group = capture_index.get(&edge).copied();
                        }
                    }
                }
                if targets.is_empty() {
                    continue;
                }

                let closure = nfa.epsilon_closure(targets.iter().copied(), &mut scratch);
                let dest = intern(nfa, closure, &mut states, &mut index, &mut pending, max_states)?;

                let state = &mut states[id.index()];
                state.transitions.insert(symbol.clone(), dest);
                if matches!(symbol, Symbol::NoneOf(_)) {
                    state.exclusions.push((symbol.clone(), dest));
                }
                if let Some(group) = group {
                    state.captures.entry(dest).or_insert(group);
                }
            }
        }

        log::debug!(
            "subset construction: {} NFA states, {} symbols -> {} DFA states",
            nfa.len(),
            alphabet.len(),
            states.len()
        );

        Ok(Dfa { states, initial })
    }

    /// A single non-accepting state; rejects every input.
    pub fn empty() -> Dfa {
        Dfa {
            states: vec![DfaState::default()],
            initial: StateId::new(0),
        }
    }

    #[inline]
    pub fn initial(&self) -> StateId {
        self.initial
    }

    #[inline]
    pub fn state(&self, id: StateId) -> &DfaState {
        &self.states[id.index()]
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Return the DFA state for `members`, allocating and queueing it if new.
fn intern(
    nfa: &Nfa,
    members: Vec<StateId>,
    states: &mut Vec<DfaState>,
    index: &mut FxHashMap<Vec<StateId>, StateId>,
    pending: &mut VecDeque<(StateId, Vec<StateId>)>,
    max_states: Option<usize>,
) -> Result<StateId, StateLimitExceeded> {
    if let Some(&id) = index.get(&members) {
        return Ok(id);
    }
    if let Some(limit) = max_states {
        if states.len() >= limit {
            return Err(StateLimitExceeded { limit });
        }
    }

    let id = StateId::new(states.len() as u32);
    let mut state = DfaState::default();
    for &m in &members {
        if nfa.is_final(m) {
            state.is_final = true;
            if let Some(p) = nfa.trace(m) {
                state.pattern = Some(state.pattern.map_or(p, |cur| cur.min(p)));
            }
        }
    }
    states.push(state);
    index.insert(members.clone(), id);
    pending.push_back((id, members));
    Ok(id)
}
