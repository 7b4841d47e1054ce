//! Token spans anchored to a borrowed document.

use std::fmt;
use std::hash::{Hash, Hasher};

use thiserror::Error;

use crate::Document;

/// Why a span's indices were rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfRangeReason {
    /// One of the indices was below zero.
    NegativeIndex,
    /// The sentence index is not smaller than the sentence count.
    UnknownSentence { sentence_count: usize },
    /// `start >= end`.
    EmptyOrReversed,
    /// `end` goes past the last token of the sentence.
    PastSentenceEnd { sentence_len: usize },
}

impl fmt::Display for OutOfRangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutOfRangeReason::NegativeIndex => f.write_str("negative index"),
            OutOfRangeReason::UnknownSentence { sentence_count } => {
                write!(f, "document has {} sentences", sentence_count)
            }
            OutOfRangeReason::EmptyOrReversed => f.write_str("start must be before end"),
            OutOfRangeReason::PastSentenceEnd { sentence_len } => {
                write!(f, "sentence has {} tokens", sentence_len)
            }
        }
    }
}

/// Span indices that are inconsistent with the document they refer to.
///
/// This is a caller bug, not a data problem, so it is reported as soon as a
/// span is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("token span s{sentence}[{start}..{end}) is out of range: {reason}")]
pub struct OutOfRangeError {
    pub sentence: i64,
    pub start: i64,
    pub end: i64,
    pub reason: OutOfRangeReason,
}

/// A `[start, end)` token range inside one sentence of a document.
///
/// Two spans are equal when they point into the same document (by identity)
/// and cover the same sentence and token range.
#[derive(Clone, Copy)]
pub struct TokenSpan<'d> {
    document: &'d Document,
    sentence: usize,
    start: usize,
    end: usize,
}

impl<'d> TokenSpan<'d> {
    /// Create a span, checking it against the document.
    pub fn new(
        document: &'d Document,
        sentence: usize,
        start: usize,
        end: usize,
    ) -> Result<Self, OutOfRangeError> {
        check_bounds(document, sentence, start, end).map_err(|reason| OutOfRangeError {
            sentence: saturating_i64(sentence),
            start: saturating_i64(start),
            end: saturating_i64(end),
            reason,
        })?;

        Ok(Self {
            document,
            sentence,
            start,
            end,
        })
    }

    /// Create a span from signed indices, as they arrive in engine replies.
    pub fn from_signed(
        document: &'d Document,
        sentence: i64,
        start: i64,
        end: i64,
    ) -> Result<Self, OutOfRangeError> {
        if sentence < 0 || start < 0 || end < 0 {
            return Err(OutOfRangeError {
                sentence,
                start,
                end,
                reason: OutOfRangeReason::NegativeIndex,
            });
        }

        // Values beyond usize are clamped so the regular bound checks reject them.
        let to_usize = |v: i64| usize::try_from(v).unwrap_or(usize::MAX);
        Self::new(document, to_usize(sentence), to_usize(start), to_usize(end)).map_err(|mut e| {
            e.sentence = sentence;
            e.start = start;
            e.end = end;
            e
        })
    }

    pub fn document(&self) -> &'d Document {
        self.document
    }

    pub fn sentence(&self) -> usize {
        self.sentence
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of tokens covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false: empty spans are rejected at construction.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The covered token strings.
    pub fn tokens(&self) -> &'d [String] {
        self.document
            .tokens(self.sentence)
            .and_then(|tokens| tokens.get(self.start..self.end))
            .unwrap_or(&[])
    }

    /// The covered tokens joined by single spaces.
    ///
    /// Used as the span fragment inside opinion labels.
    pub fn text(&self) -> String {
        self.tokens().join(" ")
    }

    /// Returns true if `other` lies inside this span.
    pub fn contains(&self, other: &TokenSpan<'_>) -> bool {
        std::ptr::eq(self.document, other.document)
            && self.sentence == other.sentence
            && self.start <= other.start
            && other.end <= self.end
    }
}

fn check_bounds(
    document: &Document,
    sentence: usize,
    start: usize,
    end: usize,
) -> Result<(), OutOfRangeReason> {
    let sentence_len = document
        .sentence_len(sentence)
        .ok_or(OutOfRangeReason::UnknownSentence {
            sentence_count: document.sentence_count(),
        })?;
    if start >= end {
        return Err(OutOfRangeReason::EmptyOrReversed);
    }
    if end > sentence_len {
        return Err(OutOfRangeReason::PastSentenceEnd { sentence_len });
    }
    Ok(())
}

fn saturating_i64(v: usize) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

impl PartialEq for TokenSpan<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.document, other.document)
            && self.sentence == other.sentence
            && self.start == other.start
            && self.end == other.end
    }
}

impl Eq for TokenSpan<'_> {}

impl Hash for TokenSpan<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.document, state);
        self.sentence.hash(state);
        self.start.hash(state);
        self.end.hash(state);
    }
}

impl fmt::Debug for TokenSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSpan")
            .field("sentence", &self.sentence)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("text", &self.text())
            .finish()
    }
}

/// Coordinate key: `s{sentence}[{start}..{end})`.
impl fmt::Display for TokenSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}[{}..{})", self.sentence, self.start, self.end)
    }
}
