//! RON snapshots of an annotation run.
//!
//! A snapshot holds plain coordinates and text instead of borrowed spans, so
//! it can be stored next to a test and compared later without the document.

use layered_opinion_document::{Document, SpanLink, TokenSpan};
use serde::{Deserialize, Serialize};

use crate::decode::ResponseGrammar;
use crate::engine::AnnotationRun;
use crate::frame::{OpinionFrame, OpinionRole};

/// A span position with its surface text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSpan {
    pub sentence: usize,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl From<&TokenSpan<'_>> for SnapshotSpan {
    fn from(span: &TokenSpan<'_>) -> Self {
        SnapshotSpan {
            sentence: span.sentence(),
            start: span.start(),
            end: span.end(),
            text: span.text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameData {
    pub expression: SnapshotSpan,
    pub opinion_type: String,
    pub confidence: f64,
    /// The label handed to the pipeline
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<SpanLink<OpinionRole, SnapshotSpan>>,
}

impl From<&OpinionFrame<'_>> for FrameData {
    fn from(frame: &OpinionFrame<'_>) -> Self {
        FrameData {
            expression: SnapshotSpan::from(&frame.expression),
            opinion_type: frame.opinion_type.clone(),
            confidence: frame.confidence,
            label: frame.label(),
            arguments: frame
                .arguments
                .iter()
                .map(|link| SpanLink::new(link.role, SnapshotSpan::from(&link.target)))
                .collect(),
        }
    }
}

/// Serializable record of one annotation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    /// Schema version for forward compatibility
    pub version: u32,
    pub grammar: ResponseGrammar,
    /// Sentence token strings, space-joined.
    pub sentences: Vec<String>,
    pub frames: Vec<FrameData>,
    /// Rendered diagnostics, in reply order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

impl RunSnapshot {
    pub fn from_run(document: &Document, grammar: ResponseGrammar, run: &AnnotationRun<'_>) -> Self {
        RunSnapshot {
            version: 1,
            grammar,
            sentences: document
                .sentences_enumerated()
                .map(|(_, sentence)| sentence.tokens().join(" "))
                .collect(),
            frames: run.frames.iter().map(FrameData::from).collect(),
            diagnostics: run.diagnostics.iter().map(ToString::to_string).collect(),
        }
    }

    /// Serialize to a RON string.
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        let config = ron::ser::PrettyConfig::new()
            .depth_limit(6)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, config)
    }

    /// Deserialize from a RON string.
    pub fn from_ron_string(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    pub fn frames_in_sentence(&self, sentence: usize) -> impl Iterator<Item = &FrameData> + '_ {
        self.frames
            .iter()
            .filter(move |frame| frame.expression.sentence == sentence)
    }
}
