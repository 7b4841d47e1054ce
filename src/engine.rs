//! Engine handle around the external opinion tagger.
//!
//! The tagger is reached through [`OpinionBackend`]. Its expensive model
//! state is loaded exactly once, when an [`EngineConfig`] is opened into an
//! [`OpinionEngine`]; annotation calls never reload it.
//!
//! ```
//! use layered_opinion::{EngineConfig, ModelBundle, ResponseGrammar, ScriptedBackend};
//! use layered_opinion_document::{Document, Sentence};
//!
//! let backend = ScriptedBackend::new().with_reply("0,1,2,ESE,0.6\n");
//! let engine = EngineConfig::new(backend, ModelBundle::placeholder())
//!     .with_grammar(ResponseGrammar::FlatRecord)
//!     .open()
//!     .unwrap();
//!
//! let doc = Document::new(vec![Sentence::from_whitespace(
//!     "What a mess", "WP DT NN", "what a mess", "(ROOT)", "root(ROOT-0, mess-3)",
//! )
//! .unwrap()]);
//! let run = engine.annotate(&doc).unwrap();
//! assert_eq!(run.annotations[0].label, "ESE");
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

use layered_opinion_document::Document;
use tracing::{debug, info};

use crate::decode::{decode_reply, ResponseGrammar};
use crate::encode::encode_document;
use crate::error::{EngineInitError, OpinionError, OpinionResult, ProtocolParseError};
use crate::frame::{assemble, OpinionFrame, SpanAnnotation};

/// The five model payloads the engine is initialized with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Payload {
    /// Feature dictionary resource.
    FeatureDictionary,
    /// Pretrained word embeddings.
    WordVectors,
    /// Agent / DSE / target argument model.
    ArgumentModel,
    /// DSE / ESE expression model.
    ExpressionModel,
    PolarityModel,
}

impl Payload {
    pub const ALL: [Payload; 5] = [
        Payload::FeatureDictionary,
        Payload::WordVectors,
        Payload::ArgumentModel,
        Payload::ExpressionModel,
        Payload::PolarityModel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Payload::FeatureDictionary => "feature dictionary",
            Payload::WordVectors => "word vectors",
            Payload::ArgumentModel => "argument model",
            Payload::ExpressionModel => "expression model",
            Payload::PolarityModel => "polarity model",
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque model data handed to the backend at initialization.
///
/// Where the payloads come from (files, resources, a blob store) is the
/// caller's business.
#[derive(Clone, Default)]
pub struct ModelBundle {
    payloads: [Option<String>; 5],
}

impl ModelBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bundle with a short non-empty stand-in for every payload.
    ///
    /// Useful with backends that ignore their models, such as [`ScriptedBackend`].
    pub fn placeholder() -> Self {
        Payload::ALL
            .iter()
            .fold(Self::new(), |bundle, payload| bundle.with(*payload, payload.as_str()))
    }

    pub fn with(mut self, payload: Payload, data: impl Into<String>) -> Self {
        self.set(payload, data);
        self
    }

    pub fn set(&mut self, payload: Payload, data: impl Into<String>) {
        self.payloads[slot(payload)] = Some(data.into());
    }

    pub fn get(&self, payload: Payload) -> Option<&str> {
        self.payloads[slot(payload)].as_deref()
    }

    /// Check that every payload is present and non-empty.
    pub fn validate(&self) -> Result<(), EngineInitError> {
        match Payload::ALL
            .iter()
            .find(|payload| self.get(**payload).map_or(true, str::is_empty))
        {
            Some(payload) => Err(EngineInitError::MissingPayload { payload: *payload }),
            None => Ok(()),
        }
    }
}

fn slot(payload: Payload) -> usize {
    match payload {
        Payload::FeatureDictionary => 0,
        Payload::WordVectors => 1,
        Payload::ArgumentModel => 2,
        Payload::ExpressionModel => 3,
        Payload::PolarityModel => 4,
    }
}

// Payloads can be hundreds of megabytes; only show their sizes.
impl fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for payload in Payload::ALL {
            map.entry(&payload.as_str(), &self.get(payload).map(str::len));
        }
        map.finish()
    }
}

/// The native opinion tagger, seen as a blocking black box.
pub trait OpinionBackend {
    /// Load model state. Returns false if the engine could not use the bundle.
    fn initialize(&mut self, bundle: &ModelBundle) -> bool;

    /// Tag one encoded message. `None` means the engine produced no reply.
    fn annotate(&mut self, input: &str) -> Option<String>;
}

impl<B: OpinionBackend + ?Sized> OpinionBackend for Box<B> {
    fn initialize(&mut self, bundle: &ModelBundle) -> bool {
        (**self).initialize(bundle)
    }

    fn annotate(&mut self, input: &str) -> Option<String> {
        (**self).annotate(input)
    }
}

/// An engine that has not been initialized yet.
#[derive(Debug)]
pub struct EngineConfig<B> {
    backend: B,
    bundle: ModelBundle,
    grammar: ResponseGrammar,
}

impl<B: OpinionBackend> EngineConfig<B> {
    pub fn new(backend: B, bundle: ModelBundle) -> Self {
        Self {
            backend,
            bundle,
            grammar: ResponseGrammar::default(),
        }
    }

    /// Select the reply grammar the backend speaks.
    pub fn with_grammar(mut self, grammar: ResponseGrammar) -> Self {
        self.grammar = grammar;
        self
    }

    /// Initialize the backend once and hand out the usable engine.
    ///
    /// The bundle is checked before the backend is touched and dropped once
    /// the backend has loaded it.
    pub fn open(self) -> Result<OpinionEngine<B>, EngineInitError> {
        let EngineConfig {
            mut backend,
            bundle,
            grammar,
        } = self;

        bundle.validate()?;
        if !backend.initialize(&bundle) {
            return Err(EngineInitError::Rejected);
        }

        info!(grammar = grammar.as_str(), "opinion engine initialized");
        Ok(OpinionEngine {
            backend: Mutex::new(backend),
            grammar,
        })
    }
}

/// Everything produced by one annotation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationRun<'d> {
    pub frames: Vec<OpinionFrame<'d>>,
    /// One annotation per frame, same order.
    pub annotations: Vec<SpanAnnotation<'d>>,
    /// Reply lines and fields that were skipped.
    pub diagnostics: Vec<ProtocolParseError>,
}

/// An initialized engine.
///
/// Calls are serialized: only one message is in flight at a time.
pub struct OpinionEngine<B> {
    backend: Mutex<B>,
    grammar: ResponseGrammar,
}

impl<B> fmt::Debug for OpinionEngine<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpinionEngine")
            .field("grammar", &self.grammar)
            .finish_non_exhaustive()
    }
}

impl<B: OpinionBackend> OpinionEngine<B> {
    pub fn grammar(&self) -> ResponseGrammar {
        self.grammar
    }

    /// Encode the document, run the engine on it and decode the reply.
    ///
    /// Encoding errors abort before the engine is called. A document with no
    /// sentences is answered without calling the engine.
    pub fn annotate<'d>(&self, document: &'d Document) -> OpinionResult<AnnotationRun<'d>> {
        let message = encode_document(document)?;
        if document.sentence_count() == 0 {
            debug!("empty document, skipping opinion engine call");
            return Ok(AnnotationRun::default());
        }

        let reply = self.call(&message)?;
        let outcome = decode_reply(&reply, document, self.grammar)?;

        Ok(AnnotationRun {
            annotations: assemble(&outcome.frames),
            frames: outcome.frames,
            diagnostics: outcome.diagnostics,
        })
    }

    fn call(&self, message: &str) -> OpinionResult<String> {
        let mut backend = self
            .backend
            .lock()
            .map_err(|_| OpinionError::EngineCall("backend lock poisoned".into()))?;
        backend
            .annotate(message)
            .ok_or_else(|| OpinionError::EngineCall("backend returned no reply".into()))
    }

    /// Shut the engine down and get the backend back.
    pub fn close(self) -> B {
        info!("opinion engine closed");
        self.backend
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// In-process backend that answers with canned replies.
///
/// Replies queued with [`with_reply`](Self::with_reply) are used once each,
/// in order; after that the [`repeat`](Self::repeat) reply, if any, answers
/// every call.
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    accept_init: bool,
    replies: VecDeque<String>,
    fallback: Option<String>,
    init_count: usize,
    received: Vec<String>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            accept_init: true,
            replies: VecDeque::new(),
            fallback: None,
            init_count: 0,
            received: Vec::new(),
        }
    }

    /// Refuse initialization, like an engine that cannot read its models.
    pub fn rejecting() -> Self {
        Self {
            accept_init: false,
            ..Self::new()
        }
    }

    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.replies.push_back(reply.into());
        self
    }

    pub fn repeat(mut self, reply: impl Into<String>) -> Self {
        self.fallback = Some(reply.into());
        self
    }

    /// How many times `initialize` was called.
    pub fn init_count(&self) -> usize {
        self.init_count
    }

    /// Messages received so far, oldest first.
    pub fn received(&self) -> &[String] {
        &self.received
    }
}

impl OpinionBackend for ScriptedBackend {
    fn initialize(&mut self, _bundle: &ModelBundle) -> bool {
        self.init_count += 1;
        self.accept_init
    }

    fn annotate(&mut self, input: &str) -> Option<String> {
        self.received.push(input.to_string());
        self.replies.pop_front().or_else(|| self.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EncodingError;
    use layered_opinion_document::Sentence;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn doc() -> Document {
        Document::new(vec![Sentence::from_whitespace(
            "Critics adored the finale",
            "NNS VBD DT NN",
            "critic adore the finale",
            "(ROOT (S (NP (NNS Critics)) (VP (VBD adored) (NP (DT the) (NN finale)))))",
            "nsubj(adored-2, Critics-1)\ndet(finale-4, the-3)\ndobj(adored-2, finale-4)",
        )
        .unwrap()])
    }

    #[test]
    fn test_bundle_validation() {
        assert!(ModelBundle::placeholder().validate().is_ok());

        let bundle = ModelBundle::placeholder().with(Payload::WordVectors, "");
        assert_eq!(
            bundle.validate().unwrap_err(),
            EngineInitError::MissingPayload {
                payload: Payload::WordVectors,
            }
        );

        assert_eq!(
            ModelBundle::new().validate().unwrap_err(),
            EngineInitError::MissingPayload {
                payload: Payload::FeatureDictionary,
            }
        );
    }

    #[test]
    fn test_bundle_debug_hides_payloads() {
        let bundle = ModelBundle::new().with(Payload::PolarityModel, "w1 0.5\nw2 -0.3\n");
        let debug = format!("{:?}", bundle);
        assert!(debug.contains("\"polarity model\": Some(15)"));
        assert!(!debug.contains("w1"));
    }

    #[test]
    fn test_missing_payload_never_reaches_backend() {
        let err = EngineConfig::new(ScriptedBackend::new(), ModelBundle::new())
            .open()
            .unwrap_err();
        assert!(matches!(err, EngineInitError::MissingPayload { .. }));
    }

    #[test]
    fn test_rejected_initialization() {
        let err = EngineConfig::new(ScriptedBackend::rejecting(), ModelBundle::placeholder())
            .open()
            .unwrap_err();
        assert_eq!(err, EngineInitError::Rejected);
    }

    #[test]
    fn test_initializes_once_across_calls() {
        let engine = EngineConfig::new(ScriptedBackend::new().repeat("0,1,2,DSE,0.8"), ModelBundle::placeholder())
            .open()
            .unwrap();
        let doc = doc();

        for _ in 0..3 {
            let run = engine.annotate(&doc).unwrap();
            assert_eq!(run.annotations[0].label, "DSE=adored");
        }

        let backend = engine.close();
        assert_eq!(backend.init_count(), 1);
        assert_eq!(backend.received().len(), 3);
        assert!(backend.received()[0].starts_with("#begin sentence\nSent: Critics adored the finale\n"));
    }

    /// Wraps a scripted backend and counts calls that overlap in time.
    struct ExclusiveBackend {
        inner: ScriptedBackend,
        in_flight: Arc<AtomicUsize>,
        overlaps: Arc<AtomicUsize>,
    }

    impl OpinionBackend for ExclusiveBackend {
        fn initialize(&mut self, bundle: &ModelBundle) -> bool {
            self.inner.initialize(bundle)
        }

        fn annotate(&mut self, input: &str) -> Option<String> {
            if self.in_flight.fetch_add(1, Ordering::SeqCst) != 0 {
                self.overlaps.fetch_add(1, Ordering::SeqCst);
            }
            thread::sleep(Duration::from_millis(5));
            let reply = self.inner.annotate(input);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            reply
        }
    }

    fn assert_sync<T: Sync>() {}

    #[test]
    fn test_concurrent_calls_are_serialized() {
        assert_sync::<OpinionEngine<ScriptedBackend>>();

        let in_flight = Arc::new(AtomicUsize::new(0));
        let overlaps = Arc::new(AtomicUsize::new(0));
        let backend = ExclusiveBackend {
            inner: ScriptedBackend::new().repeat("0,1,2,DSE,0.8"),
            in_flight: Arc::clone(&in_flight),
            overlaps: Arc::clone(&overlaps),
        };
        let engine = EngineConfig::new(backend, ModelBundle::placeholder()).open().unwrap();
        let doc = doc();

        thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| engine.annotate(&doc).unwrap().annotations.len()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), 1);
            }
        });

        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
        let backend = engine.close();
        assert_eq!(backend.inner.init_count(), 1);
        assert_eq!(backend.inner.received().len(), 4);
    }

    #[test]
    fn test_annotate_collects_diagnostics() {
        let reply = "0,1,2,DSE,0.8\t0,0,1,HolderOf,0.0\t0,2,4,TargetOf,0.0\nnot a record\n";
        let engine = EngineConfig::new(ScriptedBackend::new().with_reply(reply), ModelBundle::placeholder())
            .open()
            .unwrap();
        let doc = doc();

        let run = engine.annotate(&doc).unwrap();
        assert_eq!(run.frames.len(), 1);
        assert_eq!(run.annotations[0].label, "DSE=adored; Holder=Critics; Target=the finale");
        assert_eq!(run.diagnostics.len(), 1);
        assert_eq!(run.diagnostics[0].line, 2);
    }

    #[test]
    fn test_missing_reply_is_engine_call_error() {
        let engine = EngineConfig::new(ScriptedBackend::new(), ModelBundle::placeholder())
            .open()
            .unwrap();
        let err = engine.annotate(&doc()).unwrap_err();
        assert!(matches!(err, OpinionError::EngineCall(_)));
    }

    #[test]
    fn test_encoding_error_skips_engine_call() {
        let engine = EngineConfig::new(ScriptedBackend::new().repeat(""), ModelBundle::placeholder())
            .open()
            .unwrap();
        let empty = Sentence::new(Vec::new(), Vec::new(), Vec::new(), "(ROOT)", "root").unwrap();
        let doc = Document::new(vec![empty]);

        let err = engine.annotate(&doc).unwrap_err();
        assert!(matches!(
            err,
            OpinionError::Encoding(EncodingError::EmptySentence { sentence: 0 })
        ));
        assert!(engine.close().received().is_empty());
    }

    #[test]
    fn test_empty_document_skips_engine_call() {
        let engine = EngineConfig::new(ScriptedBackend::new(), ModelBundle::placeholder())
            .open()
            .unwrap();
        let doc = Document::default();
        let run = engine.annotate(&doc).unwrap();
        assert!(run.frames.is_empty());
        assert!(engine.close().received().is_empty());
    }

    #[test]
    fn test_out_of_range_reply_is_fatal() {
        let engine = EngineConfig::new(ScriptedBackend::new().with_reply("0,3,9,DSE,0.5"), ModelBundle::placeholder())
            .open()
            .unwrap();
        let err = engine.annotate(&doc()).unwrap_err();
        assert!(matches!(err, OpinionError::OutOfRange(_)));
    }

    #[test]
    fn test_boxed_backend() {
        let backend: Box<dyn OpinionBackend + Send> = Box::new(ScriptedBackend::new().repeat("0,0,1,ESE,0.1"));
        let engine = EngineConfig::new(backend, ModelBundle::placeholder())
            .with_grammar(ResponseGrammar::FlatRecord)
            .open()
            .unwrap();
        assert_eq!(engine.grammar(), ResponseGrammar::FlatRecord);
        let doc = doc();
        let run = engine.annotate(&doc).unwrap();
        assert_eq!(run.annotations[0].label, "ESE");
    }
}
