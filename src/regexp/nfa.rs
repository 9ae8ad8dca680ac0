//! Postfix token stream → Thompson NFA.
//!
//! A stack machine: operands push a two-state fragment, operators pop their
//! operands (right first) and push the combined fragment. A well-formed
//! stream leaves exactly one fragment behind.

use crate::automaton::{alt, capture, concat, negate, plus, qmark, star, Nfa, Symbol};
use crate::config::{CaptureNumbering, Options};

use super::parser::Token;

/// A token stream that does not describe a single automaton.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("'{token}' at position {position} needs {needed} operand(s) but the stack holds {found}")]
    MissingOperand {
        token: String,
        position: usize,
        needed: usize,
        found: usize,
    },
    #[error("token stream left {0} fragments on the stack, expected exactly one")]
    Unbalanced(usize),
}

/// Build the NFA for a postfix token stream.
pub fn build_nfa(tokens: &[Token], options: &Options) -> Result<Nfa, BuildError> {
    let mut stack: Vec<Nfa> = Vec::with_capacity(tokens.len() / 2 + 1);
    // Closing order, for `CaptureNumbering::Recorded`.
    let mut recorded = 0;

    for (position, token) in tokens.iter().enumerate() {
        let fragment = match token {
            Token::Literal(symbol) => Nfa::from_symbol(symbol.clone()),
            Token::Dot => Nfa::from_symbol(Symbol::Any),
            Token::Eol => Nfa::from_symbol(Symbol::EndOfLine),
            Token::Concat => {
                let (left, right) = pop_pair(&mut stack, token, position)?;
                concat(left, right)
            }
            Token::Alt => {
                let (left, right) = pop_pair(&mut stack, token, position)?;
                alt(left, right)
            }
            Token::Star => star(pop_one(&mut stack, token, position)?),
            Token::Plus => plus(pop_one(&mut stack, token, position)?),
            Token::Question => qmark(pop_one(&mut stack, token, position)?),
            Token::Negate => negate(
                pop_one(&mut stack, token, position)?,
                options.negated_classes,
            ),
            Token::Capture(open_paren) => {
                let group = match options.capture_numbering {
                    CaptureNumbering::OpenParen => *open_paren,
                    CaptureNumbering::Recorded => {
                        recorded += 1;
                        recorded - 1
                    }
                };
                capture(pop_one(&mut stack, token, position)?, group)
            }
        };
        stack.push(fragment);
    }

    if stack.len() != 1 {
        return Err(BuildError::Unbalanced(stack.len()));
    }
    stack.pop().ok_or(BuildError::Unbalanced(0))
}

fn pop_one(stack: &mut Vec<Nfa>, token: &Token, position: usize) -> Result<Nfa, BuildError> {
    stack.pop().ok_or_else(|| BuildError::MissingOperand {
        token: token.to_string(),
        position,
        needed: 1,
        found: 0,
    })
}

fn pop_pair(
    stack: &mut Vec<Nfa>,
    token: &Token,
    position: usize,
) -> Result<(Nfa, Nfa), BuildError> {
    if stack.len() < 2 {
        return Err(BuildError::MissingOperand {
            token: token.to_string(),
            position,
            needed: 2,
            found: stack.len(),
        });
    }
    let right = pop_one(stack, token, position)?;
    let left = pop_one(stack, token, position)?;
    Ok((left, right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::Symbol;
    use crate::regexp::parse_postfix;

    fn build(pattern: &str) -> Nfa {
        let tokens = parse_postfix(pattern).unwrap();
        build_nfa(&tokens, &Options::default()).unwrap()
    }

    #[test]
    fn test_single_literal() {
        let nfa = build("a");
        assert_eq!(nfa.len(), 2);
        assert_eq!(nfa.finals().len(), 1);
        assert_eq!(nfa.alphabet().into_iter().collect::<Vec<_>>(), vec![Symbol::Char('a')]);
    }

    #[test]
    fn test_dot_and_eol_operands() {
        let nfa = build(".$");
        let alphabet: Vec<_> = nfa.alphabet().into_iter().collect();
        assert_eq!(alphabet, vec![Symbol::Any, Symbol::EndOfLine]);
    }

    #[test]
    fn test_missing_operand() {
        let err = build_nfa(&[Token::Literal(Symbol::Char('a')), Token::Concat], &Options::default())
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingOperand {
                token: "&".to_string(),
                position: 1,
                needed: 2,
                found: 1,
            }
        );

        let err = build_nfa(&[Token::Star], &Options::default()).unwrap_err();
        assert!(matches!(err, BuildError::MissingOperand { needed: 1, found: 0, .. }));
    }

    #[test]
    fn test_unbalanced_stream() {
        let tokens = [Token::Literal(Symbol::Char('a')), Token::Literal(Symbol::Char('b'))];
        assert_eq!(
            build_nfa(&tokens, &Options::default()).unwrap_err(),
            BuildError::Unbalanced(2)
        );
        assert_eq!(
            build_nfa(&[], &Options::default()).unwrap_err(),
            BuildError::Unbalanced(0)
        );
    }

    #[test]
    fn test_capture_numbering_open_paren() {
        // Inner group closes first but opens second.
        let nfa = build("((a)b)");
        let groups: Vec<usize> = nfa.captures().iter().map(|c| c.group).collect();
        assert_eq!(groups, vec![1, 0]);
    }

    #[test]
    fn test_capture_numbering_recorded() {
        let tokens = parse_postfix("((a)b)").unwrap();
        let options = Options::new().capture_numbering(CaptureNumbering::Recorded);
        let nfa = build_nfa(&tokens, &options).unwrap();
        let groups: Vec<usize> = nfa.captures().iter().map(|c| c.group).collect();
        assert_eq!(groups, vec![0, 1]);
    }

    #[test]
    fn test_capture_edges_follow_concat() {
        // The group is built first, then shifted when absorbed on the right.
        let nfa = build("x(y)");
        assert_eq!(nfa.captures().len(), 1);
        let set = &nfa.captures()[0];
        assert_eq!(set.edges.len(), 1);
        let edge = set.edges.iter().next().unwrap();
        assert_eq!(edge.symbol, Symbol::Char('y'));
        let dests = &nfa.state(edge.from).transitions[&Symbol::Char('y')];
        assert!(dests.contains(&edge.to));
    }

    #[test]
    fn test_alt_keeps_both_operands_captures() {
        let nfa = build("(a)|(b)");
        let groups: Vec<usize> = nfa.captures().iter().map(|c| c.group).collect();
        assert_eq!(groups, vec![0, 1]);
    }

    #[test]
    fn test_negate_modes() {
        let tokens = parse_postfix("[^ab]").unwrap();

        let exclude = build_nfa(&tokens, &Options::default()).unwrap();
        let alphabet: Vec<_> = exclude.alphabet().into_iter().collect();
        assert_eq!(
            alphabet,
            vec![Symbol::none_of([Symbol::Char('a'), Symbol::Char('b')])]
        );

        let options = Options::new().negated_classes(crate::config::NegatedClasses::LegacyAny);
        let legacy = build_nfa(&tokens, &options).unwrap();
        let alphabet: Vec<_> = legacy.alphabet().into_iter().collect();
        assert_eq!(
            alphabet,
            vec![Symbol::Char('a'), Symbol::Char('b'), Symbol::Any]
        );
        assert_eq!(legacy.finals().len(), 1);
    }
}
