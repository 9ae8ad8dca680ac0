//! Transition symbols shared by the NFA and the DFA.
//!
//! A symbol is either a literal Unicode scalar or one of the reserved
//! pseudo-symbols the parser inserts for `.`, `\d`, `\w`, `$` and negated
//! classes. Pseudo-symbols live in their own enum variants, so they can never
//! collide with a real scalar value.

use std::fmt;
use std::sync::Arc;

/// A label on an automaton transition.
///
/// The derived ordering (`Char` < `Digit` < `Word` < `NoneOf` < `Any` <
/// `EndOfLine`) is the order in which the subset compiler walks the alphabet,
/// which keeps DFA state numbering stable between runs.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// Exactly this scalar.
    Char(char),
    /// ASCII `0`-`9` (`\d`).
    Digit,
    /// ASCII letters, digits and `_` (`\w`).
    Word,
    /// Any scalar not matched by one of the members (`[^...]`).
    ///
    /// Members are `Char`, `Digit` or `Word`, sorted and deduplicated.
    NoneOf(Arc<[Symbol]>),
    /// Any scalar (`.`).
    Any,
    /// End of input (`$`). Never matched by a scalar.
    EndOfLine,
}

impl Symbol {
    /// Build a `NoneOf` symbol from class members.
    ///
    /// Only scalar-matching members are kept; `Any`, `EndOfLine` and nested
    /// `NoneOf` members are dropped.
    pub fn none_of<I>(members: I) -> Symbol
    where
        I: IntoIterator<Item = Symbol>,
    {
        let mut members: Vec<Symbol> = members
            .into_iter()
            .filter(|s| matches!(s, Symbol::Char(_) | Symbol::Digit | Symbol::Word))
            .collect();
        members.sort();
        members.dedup();
        Symbol::NoneOf(members.into())
    }

    /// Returns true if consuming `c` may follow a transition on this symbol.
    #[inline]
    pub fn accepts(&self, c: char) -> bool {
        match self {
            Symbol::Char(expected) => *expected == c,
            Symbol::Digit => is_digit(c),
            Symbol::Word => is_word(c),
            Symbol::NoneOf(members) => !members.iter().any(|m| m.accepts(c)),
            Symbol::Any => true,
            Symbol::EndOfLine => false,
        }
    }
}

/// ASCII digit test used by `\d`.
#[inline]
pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// ASCII word test used by `\w`.
#[inline]
pub fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Char(c) => write!(f, "{:?}", c),
            Symbol::Digit => f.write_str("\\d"),
            Symbol::Word => f.write_str("\\w"),
            Symbol::NoneOf(members) => {
                f.write_str("[^")?;
                for m in members.iter() {
                    match m {
                        Symbol::Char(c) => write!(f, "{}", c.escape_debug())?,
                        other => write!(f, "{}", other)?,
                    }
                }
                f.write_str("]")
            }
            Symbol::Any => f.write_str("."),
            Symbol::EndOfLine => f.write_str("$"),
        }
    }
}
