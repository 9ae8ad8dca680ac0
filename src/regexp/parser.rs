//! Infix pattern → postfix token stream.
//!
//! Recursive descent, lowest precedence first:
//!
//! ```text
//! expr    := term ('|' expr)?
//! term    := factor (term)?
//! factor  := primary ('*' | '+' | '?')?
//! primary := '(' expr ')' | '\' escape | '.' | '[' class ']' | '$' | literal
//! ```
//!
//! Tokens are emitted in the order a stack machine consumes them: `Alt` after
//! its right operand, `Concat` after the right sub-term, a quantifier right
//! after its operand and `Capture` after the group's expression.
//!
//! Supported:
//! - `.` any scalar, `$` end of line
//! - `\d`, `\w` (ASCII classes), `\s` (space or tab), `\x` literal `x`
//! - `[...]` classes with `a-z` ranges and `\d`, `\w`, `\s` members
//! - `[^...]` negated classes
//! - `|`, `(...)`, `*`, `+`, `?`

use std::fmt;

use crate::automaton::Symbol;

/// One element of the postfix stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Literal(Symbol),
    Concat,
    Alt,
    Star,
    Plus,
    Question,
    /// Negates the class fragment on top of the stack.
    Negate,
    Dot,
    /// Closes a group; carries the group's opening-parenthesis number.
    Capture(usize),
    Eol,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(Symbol::Char(c)) => write!(f, "{}", c),
            Token::Literal(other) => write!(f, "{}", other),
            Token::Concat => f.write_str("&"),
            Token::Alt => f.write_str("|"),
            Token::Star => f.write_str("*"),
            Token::Plus => f.write_str("+"),
            Token::Question => f.write_str("?"),
            Token::Negate => f.write_str("^"),
            Token::Dot => f.write_str("."),
            Token::Capture(n) => write!(f, "({})", n),
            Token::Eol => f.write_str("$"),
        }
    }
}

/// A malformed pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {offset} in {pattern:?}")]
pub struct SyntaxError {
    pub message: String,
    /// Offset in scalars, not bytes.
    pub offset: usize,
    /// The pattern from `offset` on.
    pub fragment: String,
    pub pattern: String,
}

/// A class member before range expansion.
enum ClassItem {
    Scalar(char),
    Class(Symbol),
    Dash,
}

struct RegexpParse {
    chars: Vec<char>,
    index: usize,
    postfix: Vec<Token>,
    groups: usize,
}

impl RegexpParse {
    fn new(pattern: &str) -> Self {
        Self {
            chars: pattern.chars().collect(),
            index: 0,
            postfix: Vec::new(),
            groups: 0,
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    #[inline]
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.index += 1;
        Some(c)
    }

    #[inline]
    fn emit(&mut self, token: Token) {
        self.postfix.push(token);
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            message: message.into(),
            offset,
            fragment: self.chars[offset.min(self.chars.len())..].iter().collect(),
            pattern: self.chars.iter().collect(),
        }
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        self.error_at(self.index, message)
    }

    /// Emit `members` as a left-associative chain of alternations.
    fn emit_members(&mut self, members: &[Symbol]) {
        for (i, m) in members.iter().enumerate() {
            self.emit(Token::Literal(m.clone()));
            if i > 0 {
                self.emit(Token::Alt);
            }
        }
    }
}

/// Parse `pattern` into its postfix token stream.
pub fn parse_postfix(pattern: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut parse = RegexpParse::new(pattern);
    if parse.chars.is_empty() {
        return Err(parse.error("empty pattern"));
    }

    read_expr(&mut parse)?;

    if let Some(c) = parse.peek() {
        let message = if c == ')' {
            "unmatched ')'".to_string()
        } else {
            format!("unexpected '{}'", c)
        };
        return Err(parse.error(message));
    }

    log::trace!(
        "parsed {:?} -> {}",
        pattern,
        parse.postfix.iter().map(|t| t.to_string()).collect::<String>()
    );
    Ok(parse.postfix)
}

fn read_expr(parse: &mut RegexpParse) -> Result<(), SyntaxError> {
    read_term(parse)?;
    let mut terms = 1;
    while parse.peek() == Some('|') {
        parse.bump();
        read_term(parse)?;
        terms += 1;
    }
    for _ in 1..terms {
        parse.emit(Token::Alt);
    }
    Ok(())
}

/// Reads factors up to `|`, `)` or the end. The `Concat` tokens go out
/// last, so `abc` becomes `abc&&` without recursing per factor.
fn read_term(parse: &mut RegexpParse) -> Result<(), SyntaxError> {
    read_factor(parse)?;
    let mut factors = 1;
    while let Some(c) = parse.peek() {
        if c == ')' || c == '|' {
            break;
        }
        read_factor(parse)?;
        factors += 1;
    }
    for _ in 1..factors {
        parse.emit(Token::Concat);
    }
    Ok(())
}

fn read_factor(parse: &mut RegexpParse) -> Result<(), SyntaxError> {
    read_primary(parse)?;
    let quantifier = match parse.peek() {
        Some('*') => Token::Star,
        Some('+') => Token::Plus,
        Some('?') => Token::Question,
        _ => return Ok(()),
    };
    parse.bump();
    parse.emit(quantifier);
    Ok(())
}

fn read_primary(parse: &mut RegexpParse) -> Result<(), SyntaxError> {
    let Some(c) = parse.peek() else {
        return Err(parse.error("unexpected end of pattern"));
    };

    match c {
        '(' => {
            let open = parse.index;
            parse.bump();
            let group = parse.groups;
            parse.groups += 1;
            read_expr(parse)?;
            if parse.peek() != Some(')') {
                return Err(parse.error_at(open, "missing ')'"));
            }
            parse.bump();
            parse.emit(Token::Capture(group));
        }
        '\\' => {
            parse.bump();
            read_escape(parse)?;
        }
        '.' => {
            parse.bump();
            parse.emit(Token::Dot);
        }
        '[' => {
            parse.bump();
            read_class(parse)?;
        }
        '$' => {
            parse.bump();
            parse.emit(Token::Eol);
        }
        ')' | ']' | '*' | '+' | '?' | '|' | '^' => {
            return Err(parse.error(format!("unexpected '{}'", c)));
        }
        _ => {
            parse.bump();
            parse.emit(Token::Literal(Symbol::Char(c)));
        }
    }
    Ok(())
}

fn read_escape(parse: &mut RegexpParse) -> Result<(), SyntaxError> {
    let Some(c) = parse.bump() else {
        return Err(parse.error_at(parse.index - 1, "trailing '\\'"));
    };
    match c {
        'd' => parse.emit(Token::Literal(Symbol::Digit)),
        'w' => parse.emit(Token::Literal(Symbol::Word)),
        's' => parse.emit_members(&[Symbol::Char(' '), Symbol::Char('\t')]),
        other => parse.emit(Token::Literal(Symbol::Char(other))),
    }
    Ok(())
}

/// Read a class body; the opening `[` has been consumed.
fn read_class(parse: &mut RegexpParse) -> Result<(), SyntaxError> {
    let open = parse.index - 1;
    let negated = parse.peek() == Some('^');
    if negated {
        parse.bump();
    }

    let mut items = Vec::new();
    loop {
        let Some(c) = parse.bump() else {
            return Err(parse.error_at(open, "unterminated character class"));
        };
        match c {
            ']' => break,
            '-' => items.push(ClassItem::Dash),
            '\\' => {
                let Some(e) = parse.bump() else {
                    return Err(parse.error_at(open, "unterminated character class"));
                };
                match e {
                    'd' => items.push(ClassItem::Class(Symbol::Digit)),
                    'w' => items.push(ClassItem::Class(Symbol::Word)),
                    's' => items.extend([ClassItem::Scalar(' '), ClassItem::Scalar('\t')]),
                    other => items.push(ClassItem::Scalar(other)),
                }
            }
            other => items.push(ClassItem::Scalar(other)),
        }
    }

    let members = expand_ranges(parse, open, items)?;
    if members.is_empty() {
        return Err(parse.error_at(open, "empty character class"));
    }

    parse.emit_members(&members);
    if negated {
        parse.emit(Token::Negate);
    }
    Ok(())
}

/// Replace every `from-to` run with the scalars it spans.
///
/// A `-` with nothing usable before it, or at the very end, is literal.
fn expand_ranges(
    parse: &RegexpParse,
    open: usize,
    items: Vec<ClassItem>,
) -> Result<Vec<Symbol>, SyntaxError> {
    let mut members: Vec<Symbol> = Vec::new();
    let mut range_from: Option<char> = None;

    for item in items {
        let Some(from) = range_from else {
            match item {
                ClassItem::Dash => match members.last() {
                    Some(&Symbol::Char(from)) => {
                        members.pop();
                        range_from = Some(from);
                    }
                    _ => members.push(Symbol::Char('-')),
                },
                ClassItem::Scalar(c) => members.push(Symbol::Char(c)),
                ClassItem::Class(symbol) => members.push(symbol),
            }
            continue;
        };

        let to = match item {
            ClassItem::Scalar(to) => to,
            ClassItem::Dash => '-',
            ClassItem::Class(_) => {
                return Err(parse.error_at(
                    open,
                    format!("range starting at '{}' must end with a character", from),
                ));
            }
        };
        if !from.is_ascii() || !to.is_ascii() {
            return Err(parse.error_at(open, "range endpoints must be ASCII"));
        }
        if from > to {
            return Err(parse.error_at(open, format!("inverted range '{}-{}'", from, to)));
        }
        members.extend((from..=to).map(Symbol::Char));
        range_from = None;
    }

    if let Some(from) = range_from {
        members.push(Symbol::Char(from));
        members.push(Symbol::Char('-'));
    }
    Ok(members)
}
