//! Regexp front end: infix pattern → postfix tokens → Thompson NFA.
//!
//! The dialect is small and line oriented:
//! - `.` matches any scalar, `$` matches the end of the input
//! - `\d`, `\w` are ASCII classes, `\s` is a space or a tab
//! - `[...]` classes with ranges, `[^...]` negated classes
//! - `|` alternation, `(...)` capturing groups
//! - `?`, `+`, `*` quantifiers
//!
//! There are no anchors at the start: every pattern is matched against a
//! prefix of the input.

mod nfa;
mod parser;

pub use nfa::{build_nfa, BuildError};
pub use parser::{parse_postfix, SyntaxError, Token};
