//! Engine reply decoding.
//!
//! A reply holds one record per line. Two grammars exist and a handle uses
//! exactly one of them, picked by configuration:
//!
//! - [`ResponseGrammar::ExpressionWithArguments`]: tab-separated fields, the
//!   first an expression record, the rest holder/target argument records.
//! - [`ResponseGrammar::FlatRecord`]: a single record per line whose tag is
//!   the final label.
//!
//! Malformed lines are skipped and reported as [`ProtocolParseError`]
//! diagnostics. A span that parses but does not fit the document aborts the
//! decode with an [`OutOfRangeError`].

mod expression;
mod flat;
pub(crate) mod record;

use std::fmt;
use std::str::FromStr;

use layered_opinion_document::Document;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{OutOfRangeError, ParseErrorKind, ProtocolParseError, Recovery};
use crate::frame::OpinionFrame;

/// Reply grammar spoken by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseGrammar {
    /// `s,start,end,type,score` followed by tab-separated `s,start,end,role,score` arguments.
    #[default]
    ExpressionWithArguments,
    /// One `s,start,end,label,score` record per line.
    FlatRecord,
}

impl ResponseGrammar {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseGrammar::ExpressionWithArguments => "expression-with-arguments",
            ResponseGrammar::FlatRecord => "flat-record",
        }
    }
}

impl fmt::Display for ResponseGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown reply grammar: {0:?}")]
pub struct UnknownGrammar(pub String);

impl FromStr for ResponseGrammar {
    type Err = UnknownGrammar;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "expression-with-arguments" => Ok(ResponseGrammar::ExpressionWithArguments),
            "flat-record" => Ok(ResponseGrammar::FlatRecord),
            other => Err(UnknownGrammar(other.to_string())),
        }
    }
}

/// Frames decoded from one reply, plus everything that was skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeOutcome<'d> {
    /// Frames in reply order.
    pub frames: Vec<OpinionFrame<'d>>,
    pub diagnostics: Vec<ProtocolParseError>,
}

impl DecodeOutcome<'_> {
    /// 1-based numbers of the lines that produced no frame because of an error.
    pub fn skipped_lines(&self) -> Vec<usize> {
        self.diagnostics
            .iter()
            .filter(|d| d.recovery == Recovery::LineSkipped)
            .map(|d| d.line)
            .collect()
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Why a single line produced no frame.
#[derive(Debug)]
pub(crate) enum LineError {
    Skip(ProtocolParseError),
    OutOfRange(OutOfRangeError),
}

impl LineError {
    pub(crate) fn skip(line: usize, field: usize, kind: ParseErrorKind) -> Self {
        LineError::Skip(ProtocolParseError {
            line,
            field,
            kind,
            recovery: Recovery::LineSkipped,
        })
    }
}

impl From<OutOfRangeError> for LineError {
    fn from(err: OutOfRangeError) -> Self {
        LineError::OutOfRange(err)
    }
}

/// Decode an engine reply against the document that was sent.
///
/// Blank lines are ignored. An empty or entirely malformed reply gives an
/// empty frame list.
pub fn decode_reply<'d>(
    reply: &str,
    document: &'d Document,
    grammar: ResponseGrammar,
) -> Result<DecodeOutcome<'d>, OutOfRangeError> {
    let mut outcome = DecodeOutcome::default();

    for (idx, line) in reply.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_number = idx + 1;

        let decoded = match grammar {
            ResponseGrammar::ExpressionWithArguments => {
                expression::decode_line(line, line_number, document, &mut outcome.diagnostics)
            }
            ResponseGrammar::FlatRecord => flat::decode_line(line, line_number, document),
        };

        match decoded {
            Ok(frame) => outcome.frames.push(frame),
            Err(LineError::Skip(diagnostic)) => {
                warn!(%diagnostic, "skipping opinion reply line");
                outcome.diagnostics.push(diagnostic);
            }
            Err(LineError::OutOfRange(err)) => return Err(err),
        }
    }

    debug!(
        grammar = grammar.as_str(),
        frames = outcome.frames.len(),
        diagnostics = outcome.diagnostics.len(),
        "decoded opinion engine reply"
    );
    Ok(outcome)
}
