//! Flat reply lines: one record, label taken verbatim.

use layered_opinion_document::{Document, TokenSpan};

use super::record::Record;
use super::LineError;
use crate::frame::OpinionFrame;

pub(super) fn decode_line<'d>(
    line: &str,
    line_number: usize,
    document: &'d Document,
) -> Result<OpinionFrame<'d>, LineError> {
    let skip = |kind| LineError::skip(line_number, 0, kind);

    let record = Record::split(line).map_err(skip)?;
    let (sentence, start, end) = record.indices().map_err(skip)?;
    let confidence = record.score().map_err(skip)?;
    let expression = TokenSpan::from_signed(document, sentence, start, end)?;

    Ok(OpinionFrame::flat(expression, record.tag, confidence))
}
