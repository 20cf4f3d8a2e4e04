//! Errors raised while turning model text into a geometry buffer

use std::io;

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("line {line}: malformed number `{field}`")]
    MalformedNumber { line: usize, field: String },
    #[error("line {line}: `{record}` record needs {expected} values, found {found}")]
    MissingField {
        line: usize,
        record: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: face has {corners} corners, at least 3 are required")]
    DegenerateFace { line: usize, corners: usize },
    #[error("line {line}: index {index} is out of range")]
    IndexOutOfRange { line: usize, index: i64 },
    #[error("Failed to read model source")]
    UnreadableSource(#[from] io::Error),
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ColorParseError {
    #[error("expected 3 or 4 color components, found {0}")]
    ComponentCount(usize),
    #[error("invalid color component `{0}`")]
    InvalidComponent(String),
}

impl ParseError {
    /// 1-based source line the error was raised on, if it came from the text itself
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::MalformedNumber { line, .. }
            | ParseError::MissingField { line, .. }
            | ParseError::DegenerateFace { line, .. }
            | ParseError::IndexOutOfRange { line, .. } => Some(*line),
            ParseError::UnreadableSource(_) => None,
        }
    }
}
