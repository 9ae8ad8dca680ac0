//! Single compiled patterns and the result type shared with pattern sets.

use std::sync::Arc;

use crate::automaton::{merge_fas, traverse_dfa, Dfa, Nfa, Traversal};
use crate::config::{MatchPolicy, Options};
use crate::regexp::{build_nfa, parse_postfix};
use crate::PatternError;

/// Outcome of matching one input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchResult<P = ()> {
    /// The input, as given.
    pub text: String,
    pub matches: bool,
    /// Text consumed by each capture group, indexed by group number.
    pub captures: Vec<String>,
    /// Payload of the matching pattern; `None` when nothing matched.
    pub payload: Option<P>,
}

impl<P> MatchResult<P> {
    pub(crate) fn from_traversal(text: &str, traversal: Traversal, payload: Option<P>) -> Self {
        if !traversal.matched {
            return MatchResult {
                text: text.to_string(),
                matches: false,
                captures: Vec::new(),
                payload: None,
            };
        }
        MatchResult {
            text: text.to_string(),
            matches: true,
            captures: traversal.captures,
            payload,
        }
    }

    /// Captured text for `group`, if the group took part in the match.
    pub fn capture(&self, group: usize) -> Option<&str> {
        self.captures.get(group).map(String::as_str)
    }
}

/// Anything that classifies input lines.
pub trait PatternMatcher {
    type Payload;

    fn matches(&self, text: &str) -> MatchResult<Self::Payload>;

    fn is_match(&self, text: &str) -> bool {
        self.matches(text).matches
    }
}

/// Parse and build the NFA for one pattern.
pub(crate) fn pattern_nfa(pattern: &str, options: &Options) -> Result<Nfa, PatternError> {
    let tokens = parse_postfix(pattern)?;
    let nfa = build_nfa(&tokens, options)?;
    Ok(nfa)
}

/// A regular expression compiled to a DFA.
///
/// Matching is anchored at the start of the input and needs no mutable
/// state, so one `CompiledPattern` can be shared freely between threads.
/// Clones share the automaton.
///
/// ```
/// let date = pattern_machine::compile(r"(\d+)-(\d+)-(\d+)$").unwrap();
/// let m = date.matches("2017-12-16");
/// assert!(m.matches);
/// assert_eq!(m.captures, vec!["2017", "12", "16"]);
/// ```
#[derive(Clone, Debug)]
pub struct CompiledPattern {
    pattern: String,
    dfa: Arc<Dfa>,
    policy: MatchPolicy,
}

impl CompiledPattern {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Self::with_options(pattern, &Options::default())
    }

    pub fn with_options(pattern: &str, options: &Options) -> Result<Self, PatternError> {
        let nfa = merge_fas(vec![pattern_nfa(pattern, options)?]);
        let dfa = Dfa::from_nfa(&nfa, options.max_dfa_states)?;
        log::debug!(
            "compiled {:?}: {} NFA states -> {} DFA states",
            pattern,
            nfa.len(),
            dfa.len()
        );
        Ok(CompiledPattern {
            pattern: pattern.to_string(),
            dfa: Arc::new(dfa),
            policy: options.policy_or(MatchPolicy::First),
        })
    }

    pub fn matches(&self, text: &str) -> MatchResult<()> {
        let traversal = traverse_dfa(&self.dfa, text, self.policy);
        let payload = traversal.matched.then_some(());
        MatchResult::from_traversal(text, traversal, payload)
    }

    pub fn is_match(&self, text: &str) -> bool {
        traverse_dfa(&self.dfa, text, self.policy).matched
    }

    /// The source pattern.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }
}

impl PatternMatcher for CompiledPattern {
    type Payload = ();

    fn matches(&self, text: &str) -> MatchResult<()> {
        CompiledPattern::matches(self, text)
    }

    fn is_match(&self, text: &str) -> bool {
        CompiledPattern::is_match(self, text)
    }
}

/// Compile `pattern` with default options.
pub fn compile(pattern: &str) -> Result<CompiledPattern, PatternError> {
    CompiledPattern::new(pattern)
}
