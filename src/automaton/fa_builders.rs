//! Thompson construction operators.
//!
//! Each operator takes fragments by value and returns the combined fragment.
//! Binary operators keep the left fragment's arena and absorb the right one,
//! so state ids of the left operand never move.
//!
//! ```text
//! concat:  L ──ε──▶ R
//! alt:     n ──ε──▶ L ──ε──▶ f
//!          n ──ε──▶ R ──ε──▶ f
//! plus:    n ──ε──▶ A ──ε──▶ f,  A.finals ──ε──▶ A.initial
//! star:    plus + n ──ε──▶ f
//! qmark:   A.initial ──ε──▶ A.finals
//! ```

use crate::config::NegatedClasses;

use super::arena::{Nfa, PatternId};
use super::symbol::Symbol;

/// Sequence `left` then `right`.
pub fn concat(mut left: Nfa, right: Nfa) -> Nfa {
    let (right_initial, right_finals) = left.absorb(right);
    for f in left.finals().to_vec() {
        left.add_epsilon(f, right_initial);
    }
    left.set_finals(right_finals);
    left
}

/// Either `left` or `right`, converging on one new final state.
pub fn alt(mut left: Nfa, right: Nfa) -> Nfa {
    let (right_initial, right_finals) = left.absorb(right);
    let start = left.add_state();
    let end = left.add_state();

    left.add_epsilon(start, left.initial());
    left.add_epsilon(start, right_initial);
    for f in left.finals().iter().chain(right_finals.iter()).copied().collect::<Vec<_>>() {
        left.add_epsilon(f, end);
    }

    left.set_initial(start);
    left.set_finals(vec![end]);
    left
}

/// One or more repetitions.
pub fn plus(mut nfa: Nfa) -> Nfa {
    let old_initial = nfa.initial();
    let start = nfa.add_state();
    let end = nfa.add_state();

    nfa.add_epsilon(start, old_initial);
    for f in nfa.finals().to_vec() {
        nfa.add_epsilon(f, end);
        nfa.add_epsilon(f, old_initial);
    }

    nfa.set_initial(start);
    nfa.set_finals(vec![end]);
    nfa
}

/// Zero or more repetitions.
pub fn star(nfa: Nfa) -> Nfa {
    let mut nfa = plus(nfa);
    let start = nfa.initial();
    for f in nfa.finals().to_vec() {
        nfa.add_epsilon(start, f);
    }
    nfa
}

/// Zero or one occurrence.
pub fn qmark(mut nfa: Nfa) -> Nfa {
    let start = nfa.initial();
    for f in nfa.finals().to_vec() {
        nfa.add_epsilon(start, f);
    }
    nfa
}

/// Apply a `[^...]` negation to the fragment built for the class members.
///
/// With `NegatedClasses::Exclude` the fragment is replaced by a single
/// `NoneOf` transition over the members' symbols. With
/// `NegatedClasses::LegacyAny` an `Any` transition is added from the initial
/// state to a new state that becomes the only final; the member transitions
/// stay in place and lead to dead ends.
pub fn negate(mut nfa: Nfa, mode: NegatedClasses) -> Nfa {
    match mode {
        NegatedClasses::Exclude => {
            let members = nfa.edges().into_iter().map(|e| e.symbol);
            Nfa::from_symbol(Symbol::none_of(members))
        }
        NegatedClasses::LegacyAny => {
            let end = nfa.add_state();
            nfa.add_transition(nfa.initial(), end, Symbol::Any);
            nfa.set_finals(vec![end]);
            nfa
        }
    }
}

/// Mark every edge of `nfa` as belonging to capture group `group`.
pub fn capture(mut nfa: Nfa, group: usize) -> Nfa {
    nfa.record_capture(group);
    nfa
}

/// Merge independently built pattern automata into one.
///
/// Each automaton's finals are stamped with its position in `fas` before the
/// merge. The result has a new initial state with an epsilon to every source
/// initial, and keeps every source final as a final, so each accepting state
/// still knows which pattern it came from.
pub fn merge_fas(fas: Vec<Nfa>) -> Nfa {
    let mut merged = Nfa::new();
    let start = merged.initial();
    let mut finals = Vec::new();

    for (i, mut fa) in fas.into_iter().enumerate() {
        fa.stamp(PatternId::new(i));
        let (initial, fa_finals) = merged.absorb(fa);
        merged.add_epsilon(start, initial);
        finals.extend(fa_finals);
    }

    merged.set_finals(finals);
    merged
}
