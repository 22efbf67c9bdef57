//! Shared token-stream navigation used by the KQL parser.

use crate::diag::DecodeError;
use crate::lexer::token::{Token, TokenKind};

/// Result type shared by every parsing operation.
pub type ParseResult<T> = Result<T, DecodeError>;

/// A cursor over a slice of tokens with lookahead and backtracking.
pub struct TokenStream<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Returns the current token. Past the end this returns the trailing `Eof`.
    pub fn current(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .unwrap_or_else(|| self.tokens.last().expect("token stream must be non-empty"))
    }

    /// Returns the next token without consuming the current one.
    pub fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1)
    }

    /// Advances to the next token. A no-op once positioned at the final (`Eof`) token.
    pub fn advance(&mut self) {
        if self.pos < self.tokens.len().saturating_sub(1) {
            self.pos += 1;
        }
    }

    /// True if the current token matches `kind`.
    pub fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    /// Consumes the current token if it matches `kind`.
    pub fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects `kind`, advancing past it, or raises a `DecodeError`.
    pub fn expect(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.check(&kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(format!(
                "expected {}, found {}",
                kind.describe(),
                self.current().kind.describe()
            )))
        }
    }

    /// True once positioned at the trailing `Eof` token.
    pub fn at_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    /// Builds a `DecodeError` at the current token's position.
    pub fn error_here(&self, message: impl Into<String>) -> DecodeError {
        DecodeError::at(self.current().position, message.into())
    }

    /// The current position in the token stream, for backtracking via `set_position`.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Rewinds (or fast-forwards) the cursor to a previously recorded position.
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::Position;

    fn toks(kinds: Vec<TokenKind>) -> Vec<Token> {
        kinds
            .into_iter()
            .enumerate()
            .map(|(i, kind)| {
                Token::new(
                    kind,
                    Position {
                        offset: i as u32,
                        line: 1,
                        column: i as u32 + 1,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn advance_stops_at_last_token() {
        let tokens = toks(vec![TokenKind::Colon, TokenKind::Eof]);
        let mut stream = TokenStream::new(&tokens);
        assert!(stream.check(&TokenKind::Colon));
        stream.advance();
        assert!(stream.at_eof());
        stream.advance();
        assert!(stream.at_eof());
    }

    #[test]
    fn consume_advances_only_on_match() {
        let tokens = toks(vec![TokenKind::LParen, TokenKind::RParen, TokenKind::Eof]);
        let mut stream = TokenStream::new(&tokens);
        assert!(!stream.consume(&TokenKind::RParen));
        assert!(stream.consume(&TokenKind::LParen));
        assert!(stream.check(&TokenKind::RParen));
    }

    #[test]
    fn expect_errors_with_position() {
        let tokens = toks(vec![TokenKind::Colon, TokenKind::Eof]);
        let mut stream = TokenStream::new(&tokens);
        let err = stream.expect(TokenKind::LParen).unwrap_err();
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn set_position_backtracks() {
        let tokens = toks(vec![TokenKind::LParen, TokenKind::RParen, TokenKind::Eof]);
        let mut stream = TokenStream::new(&tokens);
        let mark = stream.position();
        stream.advance();
        stream.set_position(mark);
        assert!(stream.check(&TokenKind::LParen));
    }
}
