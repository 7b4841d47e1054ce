//! Error types for the opinion protocol.
//!
//! Encoding and engine initialization errors are fatal for the document or
//! handle they concern. Reply parse errors are collected as diagnostics and
//! never abort a decode.

use std::fmt;

use thiserror::Error;

use crate::engine::Payload;

pub use layered_opinion_document::{OutOfRangeError, OutOfRangeReason};

/// A sentence could not be turned into an engine message block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// The sentence has zero tokens.
    #[error("sentence {sentence} has no tokens")]
    EmptySentence { sentence: usize },

    /// A token, POS tag or lemma is empty or contains whitespace, which would
    /// break the one-space-per-gap layout of its line.
    #[error("sentence {sentence}: {layer} item {position} is not a single word: {item:?}")]
    UnsplittableItem {
        sentence: usize,
        layer: &'static str,
        position: usize,
        item: String,
    },

    /// A parse rendering is empty.
    #[error("sentence {sentence} has an empty {layer} rendering")]
    MissingParse {
        sentence: usize,
        layer: &'static str,
    },
}

/// The engine could not be brought up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineInitError {
    /// A model bundle payload was never supplied, or is empty.
    #[error("model bundle is missing the {payload} payload")]
    MissingPayload { payload: Payload },

    /// The backend's initialization call reported failure.
    #[error("opinion engine rejected its model bundle")]
    Rejected,
}

/// What went wrong with a reply record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The record did not split into five comma-separated parts.
    Arity { found: usize },
    /// An index part is not an integer.
    InvalidInteger { name: &'static str, value: String },
    /// The score part is not a finite number.
    InvalidScore { value: String },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::Arity { found } => {
                write!(f, "expected 5 comma-separated parts, found {}", found)
            }
            ParseErrorKind::InvalidInteger { name, value } => {
                write!(f, "{} is not an integer: {:?}", name, value)
            }
            ParseErrorKind::InvalidScore { value } => {
                write!(f, "score is not a finite number: {:?}", value)
            }
        }
    }
}

/// How the decoder recovered from a [`ProtocolParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// The whole reply line was dropped.
    LineSkipped,
    /// Only one argument field was dropped; the line still produced a frame.
    FieldSkipped,
}

impl fmt::Display for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recovery::LineSkipped => f.write_str("line skipped"),
            Recovery::FieldSkipped => f.write_str("field skipped"),
        }
    }
}

/// A recovered problem in one reply line.
///
/// `line` is 1-based; `field` is the 0-based tab-separated field, where 0 is
/// the expression (or the whole record for flat replies).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("reply line {line}, field {field}: {kind} ({recovery})")]
pub struct ProtocolParseError {
    pub line: usize,
    pub field: usize,
    pub kind: ParseErrorKind,
    pub recovery: Recovery,
}

/// Errors surfaced by an annotation call.
#[derive(Debug, Error)]
pub enum OpinionError {
    #[error(transparent)]
    OutOfRange(#[from] OutOfRangeError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    EngineInit(#[from] EngineInitError),

    /// The backend produced no reply, or its handle is unusable.
    #[error("opinion engine call failed: {0}")]
    EngineCall(String),
}

/// Result type for annotation calls.
pub type OpinionResult<T> = Result<T, OpinionError>;
