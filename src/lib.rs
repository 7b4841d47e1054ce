#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Opinion frame annotation over tokenized, parsed documents.
//!
//! A document is encoded into the opinion engine's line protocol, the engine
//! replies with one record per detected expression, and the reply is decoded
//! into [`OpinionFrame`]s whose token spans point back into the document.
//! Frames are finally flattened into labeled [`SpanAnnotation`]s for the
//! pipeline.
//!
//! ```text
//! Document ──encode──▶ message ──engine──▶ reply ──decode──▶ frames ──assemble──▶ annotations
//! ```
//!
//! ## Modules
//!
//! - [`encode`] - Sentence and document message encoding
//! - [`decode`] - Reply grammars and line-level recovery
//! - [`frame`] - Opinion frames, roles and label assembly
//! - [`engine`] - Engine lifecycle and the backend seam
//! - [`annotator`] - Pipeline-facing annotator
//! - [`display`] - Box-drawing display of frames under a sentence
//! - [`snapshot`] - RON snapshots of annotation runs

pub mod annotator;
pub mod config;
pub mod decode;
pub mod display;
pub mod encode;
pub mod engine;
pub mod error;
pub mod frame;
pub mod reply;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use layered_opinion_document::{Document, DocumentError, Sentence, SpanLink, TokenSpan, TokenSpanLink};

pub use annotator::{
    AnnotationLayer, OpinionAnnotator, TokenSpanAnnotator, DEFAULT_ANNOTATOR_NAME, REQUIRED_LAYERS,
};
pub use config::{ConfigError, OpinionConfig};
pub use decode::{decode_reply, DecodeOutcome, ResponseGrammar, UnknownGrammar};
pub use display::FrameDisplay;
pub use encode::{encode_document, encode_sentence};
pub use engine::{
    AnnotationRun, EngineConfig, ModelBundle, OpinionBackend, OpinionEngine, Payload, ScriptedBackend,
};
pub use error::{
    EncodingError, EngineInitError, OpinionError, OpinionResult, OutOfRangeError, OutOfRangeReason,
    ParseErrorKind, ProtocolParseError, Recovery,
};
pub use frame::{assemble, FrameKind, OpinionArgument, OpinionFrame, OpinionRole, SpanAnnotation};
pub use reply::render_reply;
pub use snapshot::{FrameData, RunSnapshot, SnapshotSpan};
