//! The five-part comma-separated record shared by both reply grammars.

use crate::error::ParseErrorKind;

pub(crate) const RECORD_ARITY: usize = 5;

/// `sentenceIndex,tokenStart,tokenEnd,tag,score`, still unparsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Record<'a> {
    pub sentence: &'a str,
    pub start: &'a str,
    pub end: &'a str,
    /// Opinion type, flat label or role tag, depending on where the record sits.
    pub tag: &'a str,
    pub score: &'a str,
}

impl<'a> Record<'a> {
    /// Split a field into its five parts.
    pub fn split(field: &'a str) -> Result<Self, ParseErrorKind> {
        let parts: Vec<&str> = field.split(',').collect();
        if parts.len() != RECORD_ARITY {
            return Err(ParseErrorKind::Arity { found: parts.len() });
        }
        Ok(Record {
            sentence: parts[0],
            start: parts[1],
            end: parts[2],
            tag: parts[3],
            score: parts[4],
        })
    }

    /// Signed `(sentence, start, end)`; range checks happen when the span is built.
    pub fn indices(&self) -> Result<(i64, i64, i64), ParseErrorKind> {
        Ok((
            parse_index("sentence index", self.sentence)?,
            parse_index("token start", self.start)?,
            parse_index("token end", self.end)?,
        ))
    }

    pub fn score(&self) -> Result<f64, ParseErrorKind> {
        let invalid = || ParseErrorKind::InvalidScore {
            value: self.score.to_string(),
        };
        let score: f64 = self.score.trim().parse().map_err(|_| invalid())?;
        if score.is_finite() {
            Ok(score)
        } else {
            Err(invalid())
        }
    }
}

fn parse_index(name: &'static str, raw: &str) -> Result<i64, ParseErrorKind> {
    raw.trim().parse().map_err(|_| ParseErrorKind::InvalidInteger {
        name,
        value: raw.to_string(),
    })
}
