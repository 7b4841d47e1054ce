use layered_opinion_document::{Document, TokenSpan};

use crate::annotator::{OpinionAnnotator, TokenSpanAnnotator};
use crate::config::OpinionConfig;
use crate::decode::ResponseGrammar;
use crate::display::FrameDisplay;
use crate::encode::encode_document;
use crate::engine::{EngineConfig, ModelBundle, ScriptedBackend};
use crate::error::OpinionError;

use super::review_document;

const REPLY: &str = "0,2,3,DSE,0.81\t0,0,2,HolderOf,0.0\t0,3,6,TargetOf,0.0\n\
                     1,0,1,ESE,0.6\n\
                     2,1,2,DSE,0.4\t2,0,1,HolderOf,0.0\t2,2,5,Opinion,0.0\n";

#[test]
fn test_end_to_end_annotations() {
    let doc = review_document();
    let annotator = OpinionAnnotator::from_config(
        ScriptedBackend::new().with_reply(REPLY),
        ModelBundle::placeholder(),
        &OpinionConfig::default(),
    )
    .unwrap();

    let annotations = annotator.annotate(&doc).unwrap();
    let labels: Vec<&str> = annotations.iter().map(|a| a.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "DSE=loved; Holder=The critics; Target=the new film",
            "ESE=Boring",
            "DSE=think; Holder=I",
        ]
    );
    assert_eq!(annotations[1].span, TokenSpan::new(&doc, 1, 0, 1).unwrap());
    assert_eq!(annotations[2].confidence, 0.4);
}

#[test]
fn test_engine_receives_encoded_document() {
    let doc = review_document();
    let engine = EngineConfig::new(ScriptedBackend::new().with_reply(REPLY), ModelBundle::placeholder())
        .open()
        .unwrap();

    engine.annotate(&doc).unwrap();
    let backend = engine.close();

    assert_eq!(backend.init_count(), 1);
    assert_eq!(backend.received(), &[encode_document(&doc).unwrap()]);
}

#[test]
fn test_empty_document_is_not_sent() {
    let doc = Document::new(Vec::new());
    let engine = EngineConfig::new(ScriptedBackend::new(), ModelBundle::placeholder())
        .open()
        .unwrap();

    let run = engine.annotate(&doc).unwrap();
    assert!(run.frames.is_empty());
    assert!(engine.close().received().is_empty());
}

#[test]
fn test_out_of_range_reply_fails_the_call() {
    let doc = review_document();
    let engine = EngineConfig::new(
        ScriptedBackend::new().with_reply("1,0,2,ESE,0.5\n"),
        ModelBundle::placeholder(),
    )
    .open()
    .unwrap();

    let err = engine.annotate(&doc).unwrap_err();
    assert!(matches!(err, OpinionError::OutOfRange(_)));
}

#[test]
fn test_flat_grammar_end_to_end() {
    let doc = review_document();
    let engine = EngineConfig::new(
        ScriptedBackend::new().with_reply("0,2,3,positive,0.9\n0,2,3\n"),
        ModelBundle::placeholder(),
    )
    .with_grammar(ResponseGrammar::FlatRecord)
    .open()
    .unwrap();

    let run = engine.annotate(&doc).unwrap();
    assert_eq!(run.annotations.len(), 1);
    assert_eq!(run.annotations[0].label, "positive");
    assert_eq!(run.diagnostics.len(), 1);
    assert_eq!(run.diagnostics[0].line, 2);
}

#[test]
fn test_display_of_a_run() {
    let doc = review_document();
    let engine = EngineConfig::new(ScriptedBackend::new().with_reply(REPLY), ModelBundle::placeholder())
        .open()
        .unwrap();
    let run = engine.annotate(&doc).unwrap();

    let display = FrameDisplay::new(&doc, 0).with_frames(&run.frames);
    insta::assert_snapshot!(display, @r###"
    The  critics  loved  the  new  film
                  ╰───╯DSE 0.81
    ╰──────────╯Holder(DSE)
                         ╰────────────╯Target(DSE)
    "###);
}
