//! Lexical analysis for KQL.
//!
//! Converts KQL source text into a stream of [`Token`]s, following the
//! token grammar in the Kuery PEG grammar: punctuation, range
//! operators, the three reserved words (`and`/`or`/`not`, matched
//! case-insensitively and only as standalone tokens), unquoted
//! literals (with backslash escaping and wildcard detection), and
//! double-quoted strings (with `\\`, `\"`, `\n`, `\r`, `\t`, `\uXXXX`
//! escapes). Unlike the recovery-oriented lexers this crate's author
//! has written elsewhere, this one is single-shot: the first
//! unrecoverable character stops the scan and returns a `DecodeError`.

pub mod keywords;
pub mod token;

use crate::diag::{DecodeError, Position};
use crate::source::Reader;
use keywords::lookup_keyword;
use smol_str::SmolStr;
use token::{Token, TokenKind};

pub(crate) const RESERVED: &[char] = &[':', '(', ')', '{', '}', '"', '<', '>', '='];

/// Tokenizes `source`, returning every token including a trailing `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, DecodeError> {
    Lexer::new(source).tokenize()
}

struct Lexer<'a> {
    reader: Reader<'a>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            reader: Reader::new(source),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, DecodeError> {
        let mut tokens = Vec::new();
        loop {
            self.reader.skip_whitespace();
            if self.reader.eof() {
                break;
            }
            tokens.push(self.scan_token()?);
        }
        tokens.push(Token::new(TokenKind::Eof, self.reader.position()));
        Ok(tokens)
    }

    fn scan_token(&mut self) -> Result<Token, DecodeError> {
        let start = self.reader.position();
        let ch = self.reader.peek().expect("scan_token called at eof");

        let kind = match ch {
            '{' => {
                self.reader.advance();
                TokenKind::LBrace
            }
            '}' => {
                self.reader.advance();
                TokenKind::RBrace
            }
            '(' => {
                self.reader.advance();
                TokenKind::LParen
            }
            ')' => {
                self.reader.advance();
                TokenKind::RParen
            }
            ':' => {
                self.reader.advance();
                TokenKind::Colon
            }
            '<' => {
                self.reader.advance();
                if self.reader.eat('=') {
                    TokenKind::OpLe
                } else {
                    TokenKind::OpLt
                }
            }
            '>' => {
                self.reader.advance();
                if self.reader.eat('=') {
                    TokenKind::OpGe
                } else {
                    TokenKind::OpGt
                }
            }
            '"' => self.scan_quoted(start)?,
            '=' => {
                return Err(DecodeError::at(start, "unexpected character '='"));
            }
            _ => self.scan_literal(),
        };

        Ok(Token::new(kind, start))
    }

    /// Scans an unquoted literal: any run of non-reserved, non-whitespace
    /// characters, with `\` escaping the following character literally.
    fn scan_literal(&mut self) -> TokenKind {
        let mut text = String::new();
        let mut has_unescaped_wildcard = false;

        loop {
            match self.reader.peek() {
                None => break,
                Some(c) if c.is_whitespace() || RESERVED.contains(&c) => break,
                Some('\\') => {
                    self.reader.advance();
                    if let Some(escaped) = self.reader.advance() {
                        text.push(escaped);
                    }
                }
                Some('*') => {
                    self.reader.advance();
                    text.push('*');
                    has_unescaped_wildcard = true;
                }
                Some(c) => {
                    self.reader.advance();
                    text.push(c);
                }
            }
        }

        if let Some(keyword) = lookup_keyword(&text) {
            return keyword;
        }

        if has_unescaped_wildcard {
            TokenKind::Wildcard(SmolStr::new(text))
        } else {
            TokenKind::Literal(SmolStr::new(text))
        }
    }

    /// Scans a double-quoted string, processing `\\ \" \n \r \t \uXXXX`.
    fn scan_quoted(&mut self, start: Position) -> Result<TokenKind, DecodeError> {
        self.reader.advance(); // opening quote
        let mut text = String::new();

        loop {
            match self.reader.peek() {
                None => {
                    return Err(DecodeError::at(start, "unterminated quoted string"));
                }
                Some('"') => {
                    self.reader.advance();
                    break;
                }
                Some('\\') => {
                    let escape_pos = self.reader.position();
                    self.reader.advance();
                    match self.reader.peek() {
                        Some('\\') => {
                            self.reader.advance();
                            text.push('\\');
                        }
                        Some('"') => {
                            self.reader.advance();
                            text.push('"');
                        }
                        Some('n') => {
                            self.reader.advance();
                            text.push('\n');
                        }
                        Some('r') => {
                            self.reader.advance();
                            text.push('\r');
                        }
                        Some('t') => {
                            self.reader.advance();
                            text.push('\t');
                        }
                        Some('u') => {
                            self.reader.advance();
                            text.push(self.scan_unicode_escape(escape_pos)?);
                        }
                        _ => {
                            return Err(DecodeError::at(
                                escape_pos,
                                "invalid escape sequence in quoted string",
                            ));
                        }
                    }
                }
                Some(c) => {
                    self.reader.advance();
                    text.push(c);
                }
            }
        }

        Ok(TokenKind::Quoted(SmolStr::new(text)))
    }

    fn scan_unicode_escape(&mut self, escape_pos: Position) -> Result<char, DecodeError> {
        let mut hex = String::with_capacity(4);
        for _ in 0..4 {
            match self.reader.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    hex.push(c);
                    self.reader.advance();
                }
                _ => {
                    return Err(DecodeError::at(escape_pos, "invalid \\u escape sequence"));
                }
            }
        }
        let code_point = u32::from_str_radix(&hex, 16)
            .map_err(|_| DecodeError::at(escape_pos, "invalid \\u escape sequence"))?;
        char::from_u32(code_point)
            .ok_or_else(|| DecodeError::at(escape_pos, "invalid \\u escape sequence"))
    }
}
