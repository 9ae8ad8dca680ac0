//! DFA execution.
//!
//! A scan walks the input's scalars once, left to right, with no
//! backtracking. At each step the outgoing transition is chosen by a fixed
//! priority rather than a set lookup:
//!
//! 1. the exact `Char` transition;
//! 2. `Digit`, if the scalar is an ASCII digit;
//! 3. `Word`, if the scalar is an ASCII letter, digit or `_`;
//! 4. the first `NoneOf` transition whose set excludes the scalar;
//! 5. `Any`.
//!
//! If none applies the scan stops at a dead end.

use crate::config::MatchPolicy;

use super::arena::{PatternId, StateId};
use super::dfa::Dfa;
use super::symbol::{is_digit, is_word, Symbol};

/// Raw outcome of one scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Traversal {
    pub matched: bool,
    /// Captured text per group; empty unless `matched`.
    pub captures: Vec<String>,
    /// The accepting source pattern; `None` unless `matched`.
    pub pattern: Option<PatternId>,
}

impl Traversal {
    fn accepted(captures: Vec<String>, pattern: Option<PatternId>) -> Self {
        Traversal {
            matched: true,
            captures,
            pattern,
        }
    }

    fn rejected() -> Self {
        Traversal::default()
    }
}

/// Pick the transition `c` follows out of `state`.
#[inline]
pub fn find_next(dfa: &Dfa, state: StateId, c: char) -> Option<StateId> {
    let state = dfa.state(state);
    if let Some(dest) = state.next(&Symbol::Char(c)) {
        return Some(dest);
    }
    if is_digit(c) {
        if let Some(dest) = state.next(&Symbol::Digit) {
            return Some(dest);
        }
    }
    if is_word(c) {
        if let Some(dest) = state.next(&Symbol::Word) {
            return Some(dest);
        }
    }
    if let Some(dest) = state.next_excluding(c) {
        return Some(dest);
    }
    state.next(&Symbol::Any)
}

/// Run `dfa` over `text` under `policy`.
pub fn traverse_dfa(dfa: &Dfa, text: &str, policy: MatchPolicy) -> Traversal {
    let mut scan = Scan::new(dfa);

    let outcome = match policy {
        MatchPolicy::First => scan.first(text),
        MatchPolicy::EarlyExit => scan.early_exit(text),
        MatchPolicy::Longest => scan.longest(text),
    };
    if let Some(pattern) = outcome {
        return Traversal::accepted(scan.captures, pattern);
    }

    // Nothing consumed was accepted; fall back to the empty prefix.
    let start = dfa.state(dfa.initial());
    if start.is_final() {
        return Traversal::accepted(Vec::new(), start.pattern());
    }
    Traversal::rejected()
}

/// The accepting pattern of a recorded match. The match's captures are
/// whatever the scan holds when it returns.
type Accept = Option<PatternId>;

/// Capture slot lengths and pattern at the last accepting position.
struct Mark {
    lengths: Vec<usize>,
    pattern: Option<PatternId>,
}

struct Scan<'a> {
    dfa: &'a Dfa,
    state: StateId,
    captures: Vec<String>,
}

impl<'a> Scan<'a> {
    fn new(dfa: &'a Dfa) -> Self {
        Scan {
            dfa,
            state: dfa.initial(),
            captures: Vec::new(),
        }
    }

    /// Move to `next`, crediting `c` to the transition's capture group.
    fn step(&mut self, next: StateId, c: char) {
        if let Some(group) = self.dfa.state(self.state).capture_group(next) {
            if self.captures.len() <= group {
                self.captures.resize(group + 1, String::new());
            }
            self.captures[group].push(c);
        }
        self.state = next;
    }

    fn accept_here(&self) -> Option<Accept> {
        let state = self.dfa.state(self.state);
        state.is_final().then(|| state.pattern())
    }

    /// Accepting state behind an `EndOfLine` transition from the current state.
    fn accept_at_end(&self) -> Option<Accept> {
        let eol = self.dfa.state(self.state).next(&Symbol::EndOfLine)?;
        let state = self.dfa.state(eol);
        state.is_final().then(|| state.pattern())
    }

    fn first(&mut self, text: &str) -> Option<Accept> {
        for c in text.chars() {
            let next = find_next(self.dfa, self.state, c)?;
            self.step(next, c);
            if let Some(accept) = self.accept_here() {
                return Some(accept);
            }
        }
        self.accept_at_end()
    }

    /// After the first accept only capture-tagged steps are taken, so the
    /// live captures always belong to the recorded match.
    fn early_exit(&mut self, text: &str) -> Option<Accept> {
        let mut recorded: Option<Accept> = None;
        for c in text.chars() {
            let Some(next) = find_next(self.dfa, self.state, c) else {
                return recorded;
            };
            let tagged = self.dfa.state(self.state).capture_group(next).is_some();
            if recorded.is_some() && !tagged {
                return recorded;
            }
            self.step(next, c);
            if let Some(accept) = self.accept_here() {
                recorded = Some(accept);
            }
        }
        self.accept_at_end().or(recorded)
    }

    fn longest(&mut self, text: &str) -> Option<Accept> {
        let mut best: Option<Mark> = None;
        for c in text.chars() {
            let Some(next) = find_next(self.dfa, self.state, c) else {
                return best.map(|mark| self.rewind(mark));
            };
            self.step(next, c);
            if let Some(pattern) = self.accept_here() {
                best = Some(self.mark(pattern));
            }
        }
        match self.accept_at_end() {
            Some(accept) => Some(accept),
            None => best.map(|mark| self.rewind(mark)),
        }
    }

    fn mark(&self, pattern: Option<PatternId>) -> Mark {
        Mark {
            lengths: self.captures.iter().map(String::len).collect(),
            pattern,
        }
    }

    /// Cut the captures back to `mark`.
    fn rewind(&mut self, mark: Mark) -> Accept {
        self.captures.truncate(mark.lengths.len());
        for (capture, &len) in self.captures.iter_mut().zip(&mark.lengths) {
            capture.truncate(len);
        }
        mark.pattern
    }
}
