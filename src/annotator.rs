//! Pipeline-facing opinion annotator.

use std::fmt;

use layered_opinion_document::Document;
use serde::{Deserialize, Serialize};

use crate::config::OpinionConfig;
use crate::engine::{AnnotationRun, EngineConfig, ModelBundle, OpinionBackend, OpinionEngine};
use crate::error::{EngineInitError, OpinionResult};
use crate::frame::SpanAnnotation;

pub const DEFAULT_ANNOTATOR_NAME: &str = "cmunell_opinion-0.0.1";

/// Annotation layers known to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationLayer {
    Token,
    Sentence,
    PartOfSpeech,
    Lemma,
    DependencyParse,
    ConstituencyParse,
    /// Output of this crate.
    OpinionFrame,
}

impl AnnotationLayer {
    /// Identifier used by the pipeline's layer registry.
    pub fn tag(self) -> &'static str {
        match self {
            AnnotationLayer::Token => "token",
            AnnotationLayer::Sentence => "sentence",
            AnnotationLayer::PartOfSpeech => "pos",
            AnnotationLayer::Lemma => "lemma",
            AnnotationLayer::DependencyParse => "dependency-parse",
            AnnotationLayer::ConstituencyParse => "constituency-parse",
            AnnotationLayer::OpinionFrame => "nell-opinion",
        }
    }
}

impl fmt::Display for AnnotationLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Layers a document must carry before opinion annotation.
pub const REQUIRED_LAYERS: [AnnotationLayer; 6] = [
    AnnotationLayer::Token,
    AnnotationLayer::Sentence,
    AnnotationLayer::PartOfSpeech,
    AnnotationLayer::Lemma,
    AnnotationLayer::DependencyParse,
    AnnotationLayer::ConstituencyParse,
];

/// An annotator that labels token spans.
pub trait TokenSpanAnnotator {
    fn name(&self) -> &str;

    /// The layer this annotator adds.
    fn produces(&self) -> AnnotationLayer;

    /// Layers that must be present before [`annotate`](Self::annotate) runs.
    fn requires(&self) -> &[AnnotationLayer];

    /// Whether the confidence in each annotation means anything.
    fn measures_confidence(&self) -> bool;

    fn annotate<'d>(&self, document: &'d Document) -> OpinionResult<Vec<SpanAnnotation<'d>>>;
}

/// Opinion frame annotator backed by an initialized engine.
#[derive(Debug)]
pub struct OpinionAnnotator<B> {
    name: String,
    engine: OpinionEngine<B>,
}

impl<B: OpinionBackend> OpinionAnnotator<B> {
    pub fn new(engine: OpinionEngine<B>) -> Self {
        Self {
            name: DEFAULT_ANNOTATOR_NAME.to_string(),
            engine,
        }
    }

    /// Initialize the backend with the configured grammar and name.
    pub fn from_config(
        backend: B,
        bundle: ModelBundle,
        config: &OpinionConfig,
    ) -> Result<Self, EngineInitError> {
        let engine = EngineConfig::new(backend, bundle)
            .with_grammar(config.grammar)
            .open()?;
        Ok(Self::new(engine).with_name(config.annotator_name.clone()))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn engine(&self) -> &OpinionEngine<B> {
        &self.engine
    }

    /// Annotate and keep frames and diagnostics, not just the triples.
    pub fn annotate_run<'d>(&self, document: &'d Document) -> OpinionResult<AnnotationRun<'d>> {
        self.engine.annotate(document)
    }

    pub fn into_engine(self) -> OpinionEngine<B> {
        self.engine
    }
}

impl<B: OpinionBackend> TokenSpanAnnotator for OpinionAnnotator<B> {
    fn name(&self) -> &str {
        &self.name
    }

    fn produces(&self) -> AnnotationLayer {
        AnnotationLayer::OpinionFrame
    }

    fn requires(&self) -> &[AnnotationLayer] {
        &REQUIRED_LAYERS
    }

    fn measures_confidence(&self) -> bool {
        true
    }

    fn annotate<'d>(&self, document: &'d Document) -> OpinionResult<Vec<SpanAnnotation<'d>>> {
        Ok(self.engine.annotate(document)?.annotations)
    }
}
