//! Several patterns compiled into one DFA.
//!
//! Each pattern is parsed and built on its own, its accepting states are
//! stamped with its position, and the automata are merged before a single
//! subset construction. Matching a line therefore costs one scan no matter
//! how many patterns the set holds.

use std::sync::Arc;

use crate::automaton::{merge_fas, traverse_dfa, Dfa, PatternId};
use crate::config::{MatchPolicy, Options};
use crate::pattern::{pattern_nfa, MatchResult, PatternMatcher};
use crate::PatternError;

/// Patterns tagged with payloads, compiled together.
///
/// When several patterns accept at the same point, the one registered first
/// wins. Capture groups are numbered per pattern, so the winner's first
/// group is always `captures[0]`.
///
/// ```
/// use pattern_machine::PatternSet;
///
/// let set = PatternSet::compile([
///     (r"(\*+)\s+.*", "headline"),
///     (r"\s*#\+(\w+):\s*(.*)$", "keyword"),
/// ])
/// .unwrap();
///
/// assert_eq!(set.matches("* headline").payload, Some("headline"));
/// assert_eq!(set.matches("#+TITLE: hello").captures, vec!["TITLE", "hello"]);
/// assert!(!set.matches("").matches);
/// ```
#[derive(Clone, Debug)]
pub struct PatternSet<P> {
    patterns: Vec<(String, P)>,
    dfa: Arc<Dfa>,
    policy: MatchPolicy,
}

impl<P> PatternSet<P> {
    pub fn compile<I, S>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = (S, P)>,
        S: AsRef<str>,
    {
        Self::compile_with(patterns, &Options::default())
    }

    pub fn compile_with<I, S>(patterns: I, options: &Options) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = (S, P)>,
        S: AsRef<str>,
    {
        let policy = options.policy_or(MatchPolicy::EarlyExit);
        let patterns: Vec<(String, P)> = patterns
            .into_iter()
            .map(|(pattern, payload)| (pattern.as_ref().to_string(), payload))
            .collect();

        if patterns.is_empty() {
            log::warn!("compiling an empty pattern set; it will never match");
            return Ok(Self::empty(options));
        }

        let mut nfas = Vec::with_capacity(patterns.len());
        for (i, (pattern, _)) in patterns.iter().enumerate() {
            let nfa = pattern_nfa(pattern, options).inspect_err(|e| {
                log::debug!("pattern {} of the set failed to compile: {}", i, e);
            })?;
            nfas.push(nfa);
        }

        let nfa = merge_fas(nfas);
        let dfa = Dfa::from_nfa(&nfa, options.max_dfa_states)?;
        log::debug!(
            "compiled pattern set: {} patterns, {} NFA states -> {} DFA states",
            patterns.len(),
            nfa.len(),
            dfa.len()
        );

        Ok(PatternSet {
            patterns,
            dfa: Arc::new(dfa),
            policy,
        })
    }

    /// A set with no patterns; never matches.
    pub(crate) fn empty(options: &Options) -> Self {
        PatternSet {
            patterns: Vec::new(),
            dfa: Arc::new(Dfa::empty()),
            policy: options.policy_or(MatchPolicy::EarlyExit),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Source patterns and payloads, in registration order.
    pub fn patterns(&self) -> &[(String, P)] {
        &self.patterns
    }

    /// Payload of the pattern registered at `id`.
    pub fn payload(&self, id: PatternId) -> Option<&P> {
        self.patterns.get(id.index()).map(|(_, payload)| payload)
    }

    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn is_match(&self, text: &str) -> bool {
        traverse_dfa(&self.dfa, text, self.policy).matched
    }
}

impl<P: Clone> PatternSet<P> {
    pub fn matches(&self, text: &str) -> MatchResult<P> {
        let traversal = traverse_dfa(&self.dfa, text, self.policy);
        let payload = traversal
            .pattern
            .and_then(|id| self.payload(id))
            .cloned();
        MatchResult::from_traversal(text, traversal, payload)
    }
}

impl<P: Clone> PatternMatcher for PatternSet<P> {
    type Payload = P;

    fn matches(&self, text: &str) -> MatchResult<P> {
        PatternSet::matches(self, text)
    }

    fn is_match(&self, text: &str) -> bool {
        PatternSet::is_match(self, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org_lines() -> PatternSet<&'static str> {
        PatternSet::compile([
            (r"(\*+)\s+.*", "headline"),
            (r"\s*#\+(\w+):\s*(.*)$", "keyword"),
        ])
        .unwrap()
    }

    #[test]
    fn test_headline() {
        let m = org_lines().matches("* headline");
        assert!(m.matches);
        assert_eq!(m.payload, Some("headline"));
        assert_eq!(m.captures, vec!["*"]);
    }

    #[test]
    fn test_deep_headline() {
        let m = org_lines().matches("*** deeper");
        assert_eq!(m.payload, Some("headline"));
        assert_eq!(m.captures, vec!["***"]);
    }

    #[test]
    fn test_keyword() {
        let m = org_lines().matches("#+TITLE: hello");
        assert!(m.matches);
        assert_eq!(m.payload, Some("keyword"));
        assert_eq!(m.captures, vec!["TITLE", "hello"]);
    }

    #[test]
    fn test_no_match() {
        let set = org_lines();
        let m = set.matches("");
        assert!(!m.matches);
        assert_eq!(m.payload, None);
        assert!(m.captures.is_empty());

        assert!(!set.is_match("plain text"));
        assert!(!set.is_match("*bold*"));
    }

    #[test]
    fn test_disjoint_patterns() {
        let set = PatternSet::compile([("cat", 1), ("dog", 2)]).unwrap();
        assert_eq!(set.matches("cat").payload, Some(1));
        assert_eq!(set.matches("dog").payload, Some(2));
        assert_eq!(set.matches("cow").payload, None);
    }

    #[test]
    fn test_overlap_prefers_first_registered() {
        let set = PatternSet::compile([("ab", "first"), ("a(b)", "second")]).unwrap();
        assert_eq!(set.matches("ab").payload, Some("first"));

        let set = PatternSet::compile([("a(b)", "second"), ("ab", "first")]).unwrap();
        assert_eq!(set.matches("ab").payload, Some("second"));
    }

    #[test]
    fn test_captures_numbered_per_pattern() {
        let set = PatternSet::compile([(r"x(\d+)", "num"), (r"y(\w+)-(\w+)", "pair")]).unwrap();

        let m = set.matches("x42");
        assert_eq!(m.payload, Some("num"));
        assert_eq!(m.captures, vec!["42"]);

        let m = set.matches("yab-cd");
        assert_eq!(m.payload, Some("pair"));
        assert_eq!(m.captures, vec!["ab", "cd"]);
    }

    #[test]
    fn test_early_exit_stops_at_untagged_transition() {
        let set = PatternSet::compile([(r"(\d+)x*", "n")]).unwrap();
        let m = set.matches("12xx");
        assert!(m.matches);
        assert_eq!(m.captures, vec!["12"]);
    }

    #[test]
    fn test_early_exit_versus_longest() {
        let patterns = [("a", "short"), ("abc", "long")];

        let early = PatternSet::compile(patterns).unwrap();
        assert_eq!(early.policy(), MatchPolicy::EarlyExit);
        assert_eq!(early.matches("abc").payload, Some("short"));

        let options = Options::new().match_policy(MatchPolicy::Longest);
        let longest = PatternSet::compile_with(patterns, &options).unwrap();
        assert_eq!(longest.matches("abc").payload, Some("long"));
        assert_eq!(longest.matches("abd").payload, Some("short"));
    }

    #[test]
    fn test_empty_set() {
        let set = PatternSet::<u8>::compile(Vec::<(&str, u8)>::new()).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert!(!set.is_match(""));
        assert!(!set.is_match("anything"));
    }

    #[test]
    fn test_error_names_failing_pattern() {
        let err = PatternSet::compile([("ok", 1), ("(bad", 2)]).unwrap_err();
        match err {
            PatternError::Syntax(e) => assert_eq!(e.pattern, "(bad"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_accessors() {
        let set = org_lines();
        assert_eq!(set.len(), 2);
        assert_eq!(set.patterns()[1].1, "keyword");
        assert_eq!(set.payload(PatternId::new(0)), Some(&"headline"));
        assert_eq!(set.payload(PatternId::new(7)), None);
        assert!(set.dfa().len() > 1);
    }

    #[test]
    fn test_state_budget() {
        let options = Options::new().max_dfa_states(3);
        let err = PatternSet::compile_with([("abcdef", ())], &options).unwrap_err();
        assert!(matches!(err, PatternError::TooManyStates { limit: 3 }));
    }
}
