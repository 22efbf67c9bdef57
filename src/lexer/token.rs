//! Token types produced by the KQL lexer.

use crate::diag::Position;
use smol_str::SmolStr;

/// The kind of a lexical token in KQL.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LBrace,
    RBrace,
    LParen,
    RParen,
    Colon,

    OpEq,
    OpLt,
    OpLe,
    OpGt,
    OpGe,

    KwAnd,
    KwOr,
    KwNot,

    /// An unquoted identifier/value fragment.
    Literal(SmolStr),
    /// The escape-processed content of a double-quoted string.
    Quoted(SmolStr),
    /// An unquoted literal containing at least one unescaped `*`.
    Wildcard(SmolStr),

    Eof,
}

impl TokenKind {
    /// A short human name for this kind, used in "expected X, found Y" diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::LBrace => "'{'".to_string(),
            TokenKind::RBrace => "'}'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Colon => "':'".to_string(),
            TokenKind::OpEq => "'='".to_string(),
            TokenKind::OpLt => "'<'".to_string(),
            TokenKind::OpLe => "'<='".to_string(),
            TokenKind::OpGt => "'>'".to_string(),
            TokenKind::OpGe => "'>='".to_string(),
            TokenKind::KwAnd => "'and'".to_string(),
            TokenKind::KwOr => "'or'".to_string(),
            TokenKind::KwNot => "'not'".to_string(),
            TokenKind::Literal(s) => format!("literal `{s}`"),
            TokenKind::Quoted(s) => format!("quoted string \"{s}\""),
            TokenKind::Wildcard(s) => format!("wildcard `{s}`"),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

/// A single lexed token: its kind plus the position it started at.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, position: Position) -> Self {
        Self { kind, position }
    }
}
