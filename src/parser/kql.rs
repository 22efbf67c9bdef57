//! Recursive-descent parser for KQL, following the Kuery PEG grammar:
//!
//! ```text
//! query      := or_query
//! or_query   := and_query ( OR and_query )*
//! and_query  := not_query ( AND not_query )*
//! not_query  := NOT not_query | sub_query
//! sub_query  := '(' query ')' | expression
//! expression := field_exp | value_exp
//! field_exp  := field ':' ( list_value | value )
//! list_value := '{' or_list '}'
//! value      := literal_value | range_value
//! range_value:= ( '<'|'<='|'>'|'>=' ) literal_value
//! ```
//!
//! A field is, in practice, the text of a single `LITERAL`/`QUOTED`/
//! `WILDCARD` token: the lexer never splits on `.`, so a dotted path
//! like `http.request.method` already arrives as one token.

use crate::ast::{Operator, Query, ScoreMode, Value};
use crate::diag::DecodeError;
use crate::lexer::{tokenize, token::TokenKind};
use crate::parser::base::TokenStream;

/// Parses `source` as KQL, returning its `Query` AST.
///
/// Empty or whitespace-only input is a well-formed `MatchAll`.
pub fn parse(source: &str) -> Result<Query, DecodeError> {
    let tokens = tokenize(source)?;
    let stream = TokenStream::new(&tokens);
    if stream.at_eof() {
        return Ok(Query::MatchAll);
    }

    let mut parser = Parser {
        stream,
        field_prefix: None,
    };
    let query = parser.parse_or()?;
    if !parser.stream.at_eof() {
        return Err(parser.stream.error_here(format!(
            "expected end of input, found {}",
            parser.stream.current().kind.describe()
        )));
    }
    Ok(query)
}

enum RangeOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

struct Parser<'a> {
    stream: TokenStream<'a>,
    /// The absolute path of an enclosing `field: { ... }` nested query,
    /// prefixed onto every field parsed underneath it.
    field_prefix: Option<String>,
}

impl<'a> Parser<'a> {
    fn parse_or(&mut self) -> Result<Query, DecodeError> {
        let mut left = self.parse_and()?;
        while self.stream.consume(&TokenKind::KwOr) {
            let right = self.parse_and()?;
            left = left.or(right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Query, DecodeError> {
        let mut left = self.parse_not()?;
        while self.stream.consume(&TokenKind::KwAnd) {
            let right = self.parse_not()?;
            left = left.and(right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Query, DecodeError> {
        if self.stream.consume(&TokenKind::KwNot) {
            let inner = self.parse_not()?;
            return Ok(inner.negate());
        }
        self.parse_sub()
    }

    fn parse_sub(&mut self) -> Result<Query, DecodeError> {
        if matches!(self.stream.current().kind, TokenKind::LParen) {
            let open_pos = self.stream.current().position;
            self.stream.advance();
            let inner = self.parse_or()?;
            if !self.stream.consume(&TokenKind::RParen) {
                return Err(DecodeError::at(open_pos, "unmatched '('"));
            }
            return Ok(inner);
        }
        self.parse_expression()
    }

    fn parse_expression(&mut self) -> Result<Query, DecodeError> {
        match &self.stream.current().kind {
            TokenKind::Literal(_) | TokenKind::Quoted(_) | TokenKind::Wildcard(_) => {
                let followed_by_colon =
                    matches!(self.stream.peek_next().map(|t| &t.kind), Some(TokenKind::Colon));
                if followed_by_colon {
                    self.parse_field_exp()
                } else {
                    self.parse_value_exp()
                }
            }
            _ => Err(self.stream.error_here(format!(
                "expected expression, found {}",
                self.stream.current().kind.describe()
            ))),
        }
    }

    fn parse_field_exp(&mut self) -> Result<Query, DecodeError> {
        let field = self.parse_field_segment()?;
        self.stream.expect(TokenKind::Colon)?;
        let field = self.qualify(&field);

        if self.stream.consume(&TokenKind::LBrace) {
            let saved_prefix = self.field_prefix.replace(field.clone());
            let inner = self.parse_or()?;
            self.field_prefix = saved_prefix;
            self.stream.expect(TokenKind::RBrace)?;
            return Ok(Query::Nested {
                path: field,
                query: Box::new(inner),
                score_mode: Some(ScoreMode::None),
            });
        }

        if let Some(op) = self.range_operator() {
            self.stream.advance();
            let value = self.parse_range_literal()?;
            return Ok(build_range(field, op, value));
        }

        match self.stream.current().kind.clone() {
            TokenKind::Quoted(text) => {
                self.stream.advance();
                Ok(Query::MatchPhrase {
                    field,
                    value: Value::text(text.as_str()),
                })
            }
            TokenKind::Wildcard(text) => {
                self.stream.advance();
                Ok(Query::Wildcard {
                    field,
                    value: text.to_string(),
                })
            }
            TokenKind::Literal(text) => {
                self.stream.advance();
                Ok(Query::Match {
                    field,
                    value: Value::from_literal(text.as_str()),
                    operator: Operator::Or,
                })
            }
            _ => Err(self.stream.error_here("expected field value")),
        }
    }

    fn parse_value_exp(&mut self) -> Result<Query, DecodeError> {
        match self.stream.current().kind.clone() {
            TokenKind::Quoted(text) => {
                self.stream.advance();
                Ok(Query::MatchPhrase {
                    field: "*".to_string(),
                    value: Value::text(text.as_str()),
                })
            }
            TokenKind::Wildcard(text) => {
                self.stream.advance();
                Ok(Query::QueryString {
                    query: text.to_string(),
                })
            }
            TokenKind::Literal(text) => {
                self.stream.advance();
                Ok(Query::Match {
                    field: "*".to_string(),
                    value: Value::from_literal(text.as_str()),
                    operator: Operator::Or,
                })
            }
            _ => unreachable!("parse_expression only dispatches here for field-capable tokens"),
        }
    }

    fn parse_field_segment(&mut self) -> Result<String, DecodeError> {
        match self.stream.current().kind.clone() {
            TokenKind::Literal(s) | TokenKind::Quoted(s) | TokenKind::Wildcard(s) => {
                self.stream.advance();
                Ok(s.to_string())
            }
            _ => Err(self.stream.error_here("expected field name")),
        }
    }

    fn range_operator(&self) -> Option<RangeOp> {
        match self.stream.current().kind {
            TokenKind::OpGt => Some(RangeOp::Gt),
            TokenKind::OpGe => Some(RangeOp::Gte),
            TokenKind::OpLt => Some(RangeOp::Lt),
            TokenKind::OpLe => Some(RangeOp::Lte),
            _ => None,
        }
    }

    fn parse_range_literal(&mut self) -> Result<Value, DecodeError> {
        match self.stream.current().kind.clone() {
            TokenKind::Literal(text) => {
                self.stream.advance();
                Ok(Value::from_literal(text.as_str()))
            }
            TokenKind::Quoted(text) => {
                self.stream.advance();
                Ok(Value::text(text.as_str()))
            }
            _ => Err(self.stream.error_here("expected range value")),
        }
    }

    fn qualify(&self, field: &str) -> String {
        match &self.field_prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        }
    }
}

fn build_range(field: String, op: RangeOp, value: Value) -> Query {
    let mut gt = None;
    let mut gte = None;
    let mut lt = None;
    let mut lte = None;
    match op {
        RangeOp::Gt => gt = Some(value),
        RangeOp::Gte => gte = Some(value),
        RangeOp::Lt => lt = Some(value),
        RangeOp::Lte => lte = Some(value),
    }
    Query::Range {
        field,
        gt,
        gte,
        lt,
        lte,
        time_zone: None,
    }
}
