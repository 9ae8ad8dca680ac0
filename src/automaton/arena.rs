//! Arena-based state storage for NFAs.
//!
//! States live in one flat vector and refer to each other by `StateId`, a
//! plain index, so the cycles created by `*` and `+` need no shared ownership.
//! Composing two automata appends the right-hand arena to the left-hand one
//! and re-bases every index it carries (transitions, epsilons, capture edge
//! sets and trace stamps) by the left-hand length.
//!
//! ```text
//! left:  0 ──a──▶ 1              right: 0 ──b──▶ 1
//!
//! absorbed:  0 ──a──▶ 1    2 ──b──▶ 3      (right shifted by 2)
//! ```

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use super::sparse_set::SparseSet;
use super::symbol::Symbol;

/// A state identifier: an index into the owning automaton's state vector.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct StateId(u32);

impl StateId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        StateId(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    fn shifted(self, offset: u32) -> Self {
        StateId(self.0 + offset)
    }
}

/// Identifies one source pattern inside a merged automaton.
///
/// It is the pattern's position in the set it was compiled with.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct PatternId(u32);

impl PatternId {
    #[inline]
    pub fn new(index: usize) -> Self {
        PatternId(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One labelled transition `from --symbol--> to`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Edge {
    pub from: StateId,
    pub to: StateId,
    pub symbol: Symbol,
}

impl Edge {
    fn shifted(&self, offset: u32) -> Edge {
        Edge {
            from: self.from.shifted(offset),
            to: self.to.shifted(offset),
            symbol: self.symbol.clone(),
        }
    }
}

/// A capture group, identified by the exact edges built inside its parentheses.
#[derive(Clone, Debug)]
pub struct CaptureSet {
    /// Result slot the group reports into.
    pub group: usize,
    pub edges: FxHashSet<Edge>,
}

/// A state of a nondeterministic automaton.
#[derive(Clone, Default, Debug)]
pub struct NfaState {
    /// Symbol transitions; one symbol may lead to several states.
    pub transitions: FxHashMap<Symbol, SmallVec<[StateId; 2]>>,
    /// Transitions taken without consuming input.
    pub epsilons: SmallVec<[StateId; 2]>,
}

impl NfaState {
    fn shift(&mut self, offset: u32) {
        for dests in self.transitions.values_mut() {
            for d in dests.iter_mut() {
                *d = d.shifted(offset);
            }
        }
        for e in self.epsilons.iter_mut() {
            *e = e.shifted(offset);
        }
    }
}

/// A nondeterministic finite automaton under construction.
///
/// NFAs are mutated by the Thompson operators in `fa_builders` and consumed
/// once by the subset compiler.
#[derive(Clone, Debug)]
pub struct Nfa {
    states: Vec<NfaState>,
    initial: StateId,
    finals: Vec<StateId>,
    /// Capture groups in recording order (inner groups before outer ones).
    captures: Vec<CaptureSet>,
    /// Source pattern of stamped final states.
    traces: FxHashMap<StateId, PatternId>,
}

impl Default for Nfa {
    fn default() -> Self {
        Self::new()
    }
}

impl Nfa {
    /// An automaton with a single, non-accepting initial state.
    pub fn new() -> Self {
        Self {
            states: vec![NfaState::default()],
            initial: StateId(0),
            finals: Vec::new(),
            captures: Vec::new(),
            traces: FxHashMap::default(),
        }
    }

    /// The two-state automaton `0 --symbol--> 1` accepting in state 1.
    pub fn from_symbol(symbol: Symbol) -> Self {
        let mut nfa = Self::new();
        let last = nfa.add_state();
        nfa.add_transition(nfa.initial, last, symbol);
        nfa.finals.push(last);
        nfa
    }

    /// Append a fresh state and return its id.
    pub fn add_state(&mut self) -> StateId {
        let id = StateId(self.states.len() as u32);
        self.states.push(NfaState::default());
        id
    }

    pub fn add_transition(&mut self, from: StateId, to: StateId, symbol: Symbol) {
        let dests = self.states[from.index()].transitions.entry(symbol).or_default();
        if !dests.contains(&to) {
            dests.push(to);
        }
    }

    pub fn add_epsilon(&mut self, from: StateId, to: StateId) {
        let epsilons = &mut self.states[from.index()].epsilons;
        if !epsilons.contains(&to) {
            epsilons.push(to);
        }
    }

    #[inline]
    pub fn state(&self, id: StateId) -> &NfaState {
        &self.states[id.index()]
    }

    pub fn states(&self) -> &[NfaState] {
        &self.states
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Never true; every automaton owns at least its initial state.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[inline]
    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn set_initial(&mut self, initial: StateId) {
        self.initial = initial;
    }

    pub fn finals(&self) -> &[StateId] {
        &self.finals
    }

    pub fn set_finals(&mut self, finals: Vec<StateId>) {
        self.finals = finals;
    }

    #[inline]
    pub fn is_final(&self, id: StateId) -> bool {
        self.finals.contains(&id)
    }

    pub fn captures(&self) -> &[CaptureSet] {
        &self.captures
    }

    /// Record every edge currently in the automaton as capture group `group`.
    pub fn record_capture(&mut self, group: usize) {
        let edges = self.edges().into_iter().collect();
        self.captures.push(CaptureSet { group, edges });
    }

    /// Tag every current final state as belonging to `pattern`.
    pub fn stamp(&mut self, pattern: PatternId) {
        for &f in &self.finals {
            self.traces.insert(f, pattern);
        }
    }

    #[inline]
    pub fn trace(&self, id: StateId) -> Option<PatternId> {
        self.traces.get(&id).copied()
    }

    /// All symbol transitions, one `Edge` per destination.
    pub fn edges(&self) -> Vec<Edge> {
        let mut all = Vec::new();
        for (i, state) in self.states.iter().enumerate() {
            let from = StateId(i as u32);
            for (symbol, dests) in &state.transitions {
                all.extend(dests.iter().map(|&to| Edge {
                    from,
                    to,
                    symbol: symbol.clone(),
                }));
            }
        }
        all
    }

    /// Every symbol that labels at least one transition.
    pub fn alphabet(&self) -> BTreeSet<Symbol> {
        self.states
            .iter()
            .flat_map(|s| s.transitions.keys().cloned())
            .collect()
    }

    /// Move `other`'s states to the end of this arena.
    ///
    /// Returns `other`'s initial and final states re-based into this arena.
    /// Its capture sets are appended after ours and its trace stamps are kept;
    /// our own initial and final states are left unchanged.
    pub fn absorb(&mut self, other: Nfa) -> (StateId, Vec<StateId>) {
        let offset = self.states.len() as u32;
        let Nfa {
            states,
            initial,
            finals,
            captures,
            traces,
        } = other;

        self.states.extend(states.into_iter().map(|mut s| {
            s.shift(offset);
            s
        }));
        self.captures.extend(captures.into_iter().map(|c| CaptureSet {
            group: c.group,
            edges: c.edges.iter().map(|e| e.shifted(offset)).collect(),
        }));
        self.traces.extend(
            traces
                .into_iter()
                .map(|(state, pattern)| (state.shifted(offset), pattern)),
        );

        (
            initial.shifted(offset),
            finals.into_iter().map(|f| f.shifted(offset)).collect(),
        )
    }

    /// States reachable from `seeds` through epsilon transitions only, sorted.
    ///
    /// `scratch` must have a capacity of at least `self.len()`.
    pub fn epsilon_closure<I>(&self, seeds: I, scratch: &mut SparseSet) -> Vec<StateId>
    where
        I: IntoIterator<Item = StateId>,
    {
        scratch.clear();
        let mut stack: Vec<StateId> = Vec::new();
        for seed in seeds {
            if scratch.insert(seed) {
                stack.push(seed);
            }
        }
        while let Some(id) = stack.pop() {
            for &next in &self.states[id.index()].epsilons {
                if scratch.insert(next) {
                    stack.push(next);
                }
            }
        }
        scratch.to_sorted_vec()
    }
}
