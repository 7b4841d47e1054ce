//! Expression-with-arguments reply lines.

use layered_opinion_document::{Document, TokenSpan};
use tracing::{debug, warn};

use super::record::Record;
use super::LineError;
use crate::error::{ProtocolParseError, Recovery};
use crate::frame::{OpinionFrame, OpinionRole};

/// Decode `expr\targ\targ...`.
///
/// Argument fields with the wrong arity are dropped and reported in
/// `diagnostics` once the line has produced its frame; if the line is
/// skipped after all, only the line-level error is reported. Arguments with
/// an unknown role are dropped without a report and without looking at their
/// numbers.
pub(super) fn decode_line<'d>(
    line: &str,
    line_number: usize,
    document: &'d Document,
    diagnostics: &mut Vec<ProtocolParseError>,
) -> Result<OpinionFrame<'d>, LineError> {
    let mut fields = line.split('\t');
    let head = fields.next().unwrap_or_default();

    let head = Record::split(head).map_err(|kind| LineError::skip(line_number, 0, kind))?;
    let (sentence, start, end) = head
        .indices()
        .map_err(|kind| LineError::skip(line_number, 0, kind))?;
    let confidence = head
        .score()
        .map_err(|kind| LineError::skip(line_number, 0, kind))?;
    let expression = TokenSpan::from_signed(document, sentence, start, end)?;

    let mut frame = OpinionFrame::expression(expression, head.tag, confidence);
    let mut skipped_fields = Vec::new();

    for (field, raw) in fields.enumerate().map(|(i, raw)| (i + 1, raw)) {
        if raw.trim().is_empty() {
            continue;
        }

        let record = match Record::split(raw) {
            Ok(record) => record,
            Err(kind) => {
                skipped_fields.push(ProtocolParseError {
                    line: line_number,
                    field,
                    kind,
                    recovery: Recovery::FieldSkipped,
                });
                continue;
            }
        };

        let Some(role) = OpinionRole::from_reply_tag(record.tag) else {
            debug!(line = line_number, field, tag = record.tag, "ignoring unknown argument role");
            continue;
        };

        let (sentence, start, end) = record
            .indices()
            .map_err(|kind| LineError::skip(line_number, field, kind))?;
        frame.push_argument(role, TokenSpan::from_signed(document, sentence, start, end)?);
    }

    for diagnostic in skipped_fields {
        warn!(%diagnostic, "skipping opinion argument");
        diagnostics.push(diagnostic);
    }
    Ok(frame)
}
