//! pattern-machine: regular expressions compiled to DFAs with capture tracking
//!
//! Patterns go through a small pipeline:
//!
//! 1. `regexp::parse_postfix` turns the infix pattern into postfix tokens;
//! 2. `regexp::build_nfa` runs the tokens through a Thompson-construction
//!    stack machine;
//! 3. `automaton::Dfa::from_nfa` performs the subset construction, carrying
//!    capture groups and source-pattern ids onto the DFA;
//! 4. `automaton::traverse_dfa` scans an input once, with no backtracking.
//!
//! `CompiledPattern` wraps one pattern. `PatternSet` compiles many patterns,
//! each tagged with a payload, into a single DFA and reports which one
//! matched. `SharedPatternSet` adds lock-free reads with serialized updates.
//!
//! ```
//! use pattern_machine::compile;
//!
//! let footnote = compile(r"\[fn:(\w+)\].*").unwrap();
//! let m = footnote.matches("[fn:1] footnote one.");
//! assert!(m.matches);
//! assert_eq!(m.captures, vec!["1"]);
//! ```

pub mod automaton;
mod config;
mod pattern;
mod pattern_set;
pub mod regexp;
mod thread_safe;

pub use automaton::{Dfa, PatternId};
pub use config::{CaptureNumbering, MatchPolicy, NegatedClasses, Options};
pub use pattern::{compile, CompiledPattern, MatchResult, PatternMatcher};
pub use pattern_set::PatternSet;
pub use regexp::{BuildError, SyntaxError};
pub use thread_safe::SharedPatternSet;

use automaton::StateLimitExceeded;

/// Errors that can occur while compiling a pattern or a pattern set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("invalid pattern: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("malformed token stream: {0}")]
    Build(#[from] BuildError),
    #[error("DFA construction exceeded the limit of {limit} states")]
    TooManyStates { limit: usize },
}

impl From<StateLimitExceeded> for PatternError {
    fn from(e: StateLimitExceeded) -> Self {
        PatternError::TooManyStates { limit: e.limit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_by_hand() {
        let tokens = regexp::parse_postfix("(a|b)c").unwrap();
        let nfa = automaton::merge_fas(vec![regexp::build_nfa(&tokens, &Options::default()).unwrap()]);
        let dfa = Dfa::from_nfa(&nfa, None).unwrap();

        let t = automaton::traverse_dfa(&dfa, "bc", MatchPolicy::First);
        assert!(t.matched);
        assert_eq!(t.captures, vec!["b"]);
        assert_eq!(t.pattern, Some(PatternId::new(0)));
    }

    #[test]
    fn test_error_display() {
        let err = compile("[z-a]").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid pattern: inverted range 'z-a' at offset 0 in \"[z-a]\""
        );

        let err = CompiledPattern::with_options("abc", &Options::new().max_dfa_states(1)).unwrap_err();
        assert_eq!(err.to_string(), "DFA construction exceeded the limit of 1 states");
    }

    #[test]
    fn test_error_conversions() {
        let syntax = regexp::parse_postfix("").unwrap_err();
        assert!(matches!(PatternError::from(syntax), PatternError::Syntax(_)));

        let build = regexp::build_nfa(&[], &Options::default()).unwrap_err();
        assert!(matches!(PatternError::from(build), PatternError::Build(_)));

        let limit = StateLimitExceeded { limit: 4 };
        assert_eq!(PatternError::from(limit), PatternError::TooManyStates { limit: 4 });
    }

    #[test]
    fn test_generic_classification() {
        fn first_match<M: PatternMatcher>(m: &M, lines: &[&str]) -> Option<usize> {
            lines.iter().position(|line| m.is_match(line))
        }

        let lines = ["text", "* head", "#+KEY: v"];
        let set = PatternSet::compile([(r"\*+\s", 'h'), (r"#\+\w+:", 'k')]).unwrap();
        assert_eq!(first_match(&set, &lines), Some(1));

        let keyword = compile(r"#\+\w+:").unwrap();
        assert_eq!(first_match(&keyword, &lines), Some(2));

        let shared = SharedPatternSet::new();
        shared.replace_all([("text", ())]).unwrap();
        assert_eq!(first_match(&shared, &lines), Some(0));
    }
}
