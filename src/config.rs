//! Compilation and matching options.

/// How `[^...]` classes are compiled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NegatedClasses {
    /// The class matches exactly one scalar that is not a member.
    #[default]
    Exclude,
    /// Reproduces the historical behaviour: an `Any` transition is added from
    /// the class's initial state to a new final state. A member scalar still
    /// prefers its own (now dead-end) literal transition, so a lone class
    /// rejects members, but the class accepts everything else including
    /// symbols another branch would have claimed.
    LegacyAny,
}

/// How capture groups are numbered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaptureNumbering {
    /// Group `n` is the `n`-th opening parenthesis, counted left to right.
    #[default]
    OpenParen,
    /// Groups are numbered in the order they were closed while building the
    /// automaton, so in `((a)b)` the inner group is 0 and the outer is 1.
    Recorded,
}

/// When a scan reports its result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Stop as soon as an accepting state is entered.
    First,
    /// After the first accepting state, keep consuming only while transitions
    /// feed a capture group; stop before the first transition that does not.
    EarlyExit,
    /// Scan until the input or the automaton runs out and report the last
    /// accepting position.
    Longest,
}

/// Options shared by `CompiledPattern` and `PatternSet`.
///
/// ```
/// use pattern_machine::{CompiledPattern, MatchPolicy, Options};
///
/// let options = Options::new().match_policy(MatchPolicy::Longest);
/// let p = CompiledPattern::with_options("(a+)", &options).unwrap();
/// assert_eq!(p.matches("aaa").captures, vec!["aaa"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Options {
    /// How `[^...]` classes compile.
    pub negated_classes: NegatedClasses,
    /// Order in which capture groups get their slots.
    pub capture_numbering: CaptureNumbering,
    /// Overrides the facade's default policy when set.
    pub match_policy: Option<MatchPolicy>,
    /// Upper bound on DFA states built by the subset compiler.
    pub max_dfa_states: Option<usize>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn negated_classes(mut self, mode: NegatedClasses) -> Self {
        self.negated_classes = mode;
        self
    }

    pub fn capture_numbering(mut self, numbering: CaptureNumbering) -> Self {
        self.capture_numbering = numbering;
        self
    }

    pub fn match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = Some(policy);
        self
    }

    pub fn max_dfa_states(mut self, limit: usize) -> Self {
        self.max_dfa_states = Some(limit);
        self
    }

    pub(crate) fn policy_or(&self, default: MatchPolicy) -> MatchPolicy {
        self.match_policy.unwrap_or(default)
    }
}
