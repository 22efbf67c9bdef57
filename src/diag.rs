//! The diagnostic model for decode failures.
//!
//! KQL, Lucene, and ES-DSL decoding share a single error surface:
//! [`DecodeError`]. It carries a byte offset plus the 1-based line and
//! column that offset falls on, so callers can point a user at the
//! exact spot in their query string without re-deriving position from
//! scratch.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// A 1-based line/column position paired with a 0-based byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// 0-based byte offset into the source.
    pub offset: u32,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl Position {
    /// The position at the very start of a source: offset 0, line 1, column 1.
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

/// The sole parse/decode failure surface for this crate.
///
/// Every `parse_kql`, `parse_lucene`, `render_as_kql`, and `parse_es`
/// failure is reported through this single variant — there are no
/// recoverable error classes and no partial results.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{message}")]
pub struct DecodeError {
    /// 0-based byte offset of the failure.
    pub offset: u32,
    /// 1-based line number of the failure.
    pub line: u32,
    /// 1-based column number of the failure.
    pub column: u32,
    /// Human-readable diagnostic naming the expected construct.
    pub message: String,
    #[label("here")]
    span: SourceSpan,
}

impl DecodeError {
    /// Builds a `DecodeError` at the given position.
    pub fn at(position: Position, message: impl Into<String>) -> Self {
        let offset = position.offset as usize;
        Self {
            offset: position.offset,
            line: position.line,
            column: position.column,
            message: message.into(),
            span: (offset, 1).into(),
        }
    }

    /// Builds a `DecodeError` for a failure with no meaningful source
    /// position (e.g. an ES-DSL JSON value that carries no byte cursor).
    pub fn without_position(message: impl Into<String>) -> Self {
        Self::at(Position::default(), message)
    }
}

/// Computes the 1-based `(line, column)` that a byte `offset` falls on
/// within `source`, by walking `source[0..offset]`.
///
/// Used by callers that only have a raw offset (not a live [`Position`]
/// tracked incrementally by a cursor), e.g. when re-deriving a position
/// for a value handed back from elsewhere.
pub fn position_at(source: &str, offset: usize) -> Position {
    let offset = offset.min(source.len());
    let mut line = 1u32;
    let mut column = 1u32;

    for ch in source[..offset].chars() {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    Position {
        offset: offset as u32,
        line,
        column,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_is_one_one_zero() {
        let pos = Position::start();
        assert_eq!(pos.offset, 0);
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 1);
    }

    #[test]
    fn decode_error_carries_position_and_message() {
        let err = DecodeError::at(
            Position {
                offset: 10,
                line: 2,
                column: 3,
            },
            "expected field value",
        );
        assert_eq!(err.offset, 10);
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 3);
        assert_eq!(err.message, "expected field value");
        assert_eq!(err.to_string(), "expected field value");
    }

    #[test]
    fn position_at_start_of_source() {
        let pos = position_at("hello", 0);
        assert_eq!((pos.offset, pos.line, pos.column), (0, 1, 1));
    }

    #[test]
    fn position_at_tracks_newlines() {
        let source = "ab\ncd\nef";
        let pos = position_at(source, 6); // points at 'f'
        assert_eq!((pos.line, pos.column), (3, 2));
    }

    #[test]
    fn position_at_clamps_past_end() {
        let pos = position_at("hi", 50);
        assert_eq!(pos.offset, 2);
    }

    #[test]
    fn without_position_defaults_to_zero() {
        let err = DecodeError::without_position("unknown key \"foo\"");
        assert_eq!(err.offset, 0);
        assert_eq!(err.line, 0);
        assert_eq!(err.column, 0);
    }
}
