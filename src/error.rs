use std::fmt;

use thiserror::Error;

use crate::syntax::ProjectionError;

/// A location in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in characters within the line
    pub column: usize,
    /// 0-based absolute byte offset from the start of input
    pub offset: usize,
}

impl Position {
    /// Compute the line/column of a byte offset into `input`.
    pub fn locate(input: &str, offset: usize) -> Self {
        let consumed = input.get(..offset).unwrap_or(input);
        let line_start = consumed.rfind('\n').map(|i| i + 1).unwrap_or(0);
        Position {
            line: consumed.matches('\n').count() + 1,
            column: consumed[line_start..].chars().count() + 1,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// What the parser saw where it expected something else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Found {
    Char(char),
    EndOfInput,
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Found::Char(c) if c.is_control() => write!(f, "{:?}", c),
            Found::Char(c) => write!(f, "'{c}'"),
            Found::EndOfInput => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: &'static str, found: Found },
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated container, missing '{delimiter}'")]
    UnterminatedContainer { delimiter: char },
    #[error("trailing data after the document")]
    TrailingData,
}

/// The document is not well-formed; no tree was produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {position}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: Position,
}

/// Every failure the library surfaces to its callers.
#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
}
