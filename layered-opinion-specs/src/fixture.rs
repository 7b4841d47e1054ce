//! Core types for parsed `.opinion` fixture files.

use std::fmt;

use layered_opinion::{Document, ResponseGrammar, Sentence};
use serde::{Deserialize, Serialize};

use crate::errors::{SpecError, SpecResult};

/// A parsed `.opinion` fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpinionFixture {
    /// Optional title from `# Title` header
    pub title: Option<String>,
    /// Grammar the scripted engine replies in
    pub grammar: ResponseGrammar,
    /// Sentences from `## sentence` blocks, in order
    pub sentences: Vec<SentenceSpec>,
    /// Raw reply text from `## reply`, tabs preserved
    pub reply: String,
    /// Expected annotations from `> ` lines
    pub expectations: Vec<Expectation>,
    /// Expected `(line, field)` diagnostics from `! diagnostic` lines
    pub diagnostics: Vec<(usize, usize)>,
    /// Set by `! out-of-range`: the reply must abort the call
    pub expect_out_of_range: bool,
}

/// One `## sentence` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceSpec {
    /// Whitespace-separated tokens
    pub tokens: String,
    pub pos: String,
    pub lemmas: String,
    pub constituency: String,
    pub dependency: String,
    /// Line of the `## sentence` header
    pub source_line: usize,
}

/// An expected `(span, label, confidence)` annotation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expectation {
    pub sentence: usize,
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
    pub label: String,
    /// Source line number for error reporting
    pub source_line: usize,
}

impl OpinionFixture {
    /// Create an empty fixture (for testing/building).
    pub fn empty() -> Self {
        Self {
            title: None,
            grammar: ResponseGrammar::default(),
            sentences: Vec::new(),
            reply: String::new(),
            expectations: Vec::new(),
            diagnostics: Vec::new(),
            expect_out_of_range: false,
        }
    }

    /// Build the annotated document the fixture describes.
    pub fn build_document(&self) -> SpecResult<Document> {
        let sentences = self
            .sentences
            .iter()
            .map(|spec| {
                Sentence::from_whitespace(
                    &spec.tokens,
                    &spec.pos,
                    &spec.lemmas,
                    spec.constituency.clone(),
                    spec.dependency.clone(),
                )
                .map_err(|e| SpecError::Document {
                    message: format!("sentence at line {}: {}", spec.source_line, e),
                })
            })
            .collect::<SpecResult<Vec<_>>>()?;
        Ok(Document::new(sentences))
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "s{}[{}..{}) {} {}",
            self.sentence, self.start, self.end, self.confidence, self.label
        )
    }
}
