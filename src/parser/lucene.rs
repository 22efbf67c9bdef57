//! Structural validator for Apache Lucene classical query syntax.
//!
//! Full Lucene fidelity (boosts, fuzziness, proximity, range brackets,
//! grouping semantics) is deliberately out of scope: this only confirms
//! the input is well-formed enough to hand to ElasticSearch's own
//! `query_string` parser, which does the real work server-side. On
//! success the whole source text becomes a [`Query::QueryString`]
//! escape hatch; there is no Lucene AST.

use crate::ast::Query;
use crate::diag::DecodeError;
use crate::source::Reader;

/// Validates `source` as Lucene query syntax and wraps it in a
/// [`Query::QueryString`] escape hatch.
pub fn parse(source: &str) -> Result<Query, DecodeError> {
    validate(source)?;
    Ok(Query::QueryString {
        query: source.to_string(),
    })
}

#[derive(Clone, Copy)]
enum Delim {
    Paren,
    Bracket,
    Brace,
}

/// Two operand slots either side of an `AND`/`OR`; one of them is shared
/// across `NOT`/`!`, which only binds a following operand.
///
/// `expect_operand` tracks whether the next non-delimiter token must be
/// an operand (or a prefix operator, which doesn't change that) rather
/// than a binary operator. `pending_operator` records the offset of the
/// most recently consumed operator so a dangling one at end-of-input can
/// be reported at its own position rather than at EOF.
fn validate(source: &str) -> Result<(), DecodeError> {
    let mut reader = Reader::new(source);
    let mut stack: Vec<(Delim, usize)> = Vec::new();
    let mut expect_operand = true;
    let mut pending_operator: Option<usize> = None;

    while let Some(ch) = reader.peek() {
        match ch {
            '"' => {
                let start = reader.offset();
                reader.advance();
                loop {
                    match reader.peek() {
                        None => {
                            return Err(DecodeError::at(
                                crate::diag::position_at(source, start),
                                "unterminated quoted string",
                            ));
                        }
                        Some('\\') => {
                            reader.advance();
                            reader.advance();
                        }
                        Some('"') => {
                            reader.advance();
                            break;
                        }
                        Some(_) => {
                            reader.advance();
                        }
                    }
                }
                expect_operand = false;
                pending_operator = None;
            }
            '(' | '[' | '{' => {
                let delim = match ch {
                    '(' => Delim::Paren,
                    '[' => Delim::Bracket,
                    _ => Delim::Brace,
                };
                stack.push((delim, reader.offset()));
                reader.advance();
                expect_operand = true;
            }
            ')' | ']' | '}' => {
                let expected = match ch {
                    ')' => Delim::Paren,
                    ']' => Delim::Bracket,
                    _ => Delim::Brace,
                };
                match stack.pop() {
                    Some((open, _)) if matches_delim(open, expected) => {}
                    _ => {
                        return Err(DecodeError::at(
                            reader.position(),
                            format!("unmatched '{ch}'"),
                        ));
                    }
                }
                reader.advance();
                expect_operand = false;
                pending_operator = None;
            }
            c if c.is_whitespace() => {
                reader.skip_whitespace();
            }
            _ => {
                let start = reader.offset();
                while let Some(c) = reader.peek() {
                    if c.is_whitespace() || "()[]{}\"".contains(c) {
                        break;
                    }
                    reader.advance();
                }
                let word = &source[start..reader.offset()];
                if is_binary_operator(word) {
                    if expect_operand {
                        return Err(DecodeError::at(
                            crate::diag::position_at(source, start),
                            format!("operator '{word}' in invalid position"),
                        ));
                    }
                    expect_operand = true;
                    pending_operator = Some(start);
                } else if is_prefix_operator(word) {
                    // NOT/! bind only a following operand, so they're
                    // welcome wherever an operand is expected and also
                    // right after one (`foo NOT bar` means `foo AND NOT bar`).
                    expect_operand = true;
                    pending_operator = Some(start);
                } else if word == "+" || word == "-" {
                    return Err(DecodeError::at(
                        crate::diag::position_at(source, start),
                        format!("'{word}' must be attached directly to a term"),
                    ));
                } else {
                    expect_operand = false;
                    pending_operator = None;
                }
            }
        }
    }

    if let Some((_, open_offset)) = stack.last() {
        return Err(DecodeError::at(
            crate::diag::position_at(source, *open_offset),
            "unmatched opening delimiter",
        ));
    }

    if expect_operand {
        if let Some(offset) = pending_operator {
            return Err(DecodeError::at(
                crate::diag::position_at(source, offset),
                "dangling operator at end of query",
            ));
        }
    }

    Ok(())
}

fn matches_delim(open: Delim, close: Delim) -> bool {
    matches!(
        (open, close),
        (Delim::Paren, Delim::Paren) | (Delim::Bracket, Delim::Bracket) | (Delim::Brace, Delim::Brace)
    )
}

fn is_binary_operator(word: &str) -> bool {
    matches!(word, "AND" | "OR" | "&&" | "||")
}

fn is_prefix_operator(word: &str) -> bool {
    matches!(word, "NOT" | "!")
}
