//! Finite automata: the shared state graph, Thompson operators, the subset
//! compiler and the DFA matcher.
//!
//! # Module Organization
//!
//! - `symbol`: transition labels (`Symbol`) and the ASCII class tests
//! - `arena`: `Nfa`, `StateId`, `Edge`, capture edge sets, epsilon closure
//! - `sparse_set`: O(1)-clear scratch set used by the closure computation
//! - `fa_builders`: Thompson operators (`concat`, `alt`, `star`, ...) and
//!   `merge_fas` for pattern sets
//! - `dfa`: subset construction with capture and trace propagation
//! - `traverse`: DFA execution under a `MatchPolicy`

mod arena;
mod dfa;
mod fa_builders;
mod sparse_set;
mod symbol;
mod traverse;

pub use arena::{CaptureSet, Edge, Nfa, NfaState, PatternId, StateId};
pub use dfa::{Dfa, DfaState, StateLimitExceeded};
pub use fa_builders::{alt, capture, concat, merge_fas, negate, plus, qmark, star};
pub use sparse_set::SparseSet;
pub use symbol::{is_digit, is_word, Symbol};
pub use traverse::{find_next, traverse_dfa, Traversal};
