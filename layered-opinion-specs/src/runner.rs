//! Runs fixtures through a scripted opinion engine and checks the results.
//!
//! Each fixture becomes a list of checks, each with a reference that
//! `expected-failures.toml` can name:
//!
//! - `E{n}`: the n-th `> ` expectation (1-based) was produced
//! - `D{line}:{field}`: an expected `! diagnostic` was reported
//! - `U{n}`: the n-th produced annotation (0-based) was not expected
//! - `X{line}:{field}`: a reported diagnostic was not expected
//! - `R`: the call aborted on an out-of-range span exactly when expected

use layered_opinion::{
    EngineConfig, FrameDisplay, ModelBundle, OpinionError, OpinionFrame, ScriptedBackend,
    SpanAnnotation,
};
use layered_opinion_document::Document;

use crate::errors::{SpecError, SpecResult};
use crate::failures::{ExpectedFailures, HarnessResult};
use crate::fixture::{Expectation, OpinionFixture};

const CONFIDENCE_TOLERANCE: f64 = 1e-9;

/// An annotation produced by the engine, detached from its document.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundAnnotation {
    pub sentence: usize,
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
    pub label: String,
}

impl FoundAnnotation {
    pub fn matches(&self, expected: &Expectation) -> bool {
        self.sentence == expected.sentence
            && self.start == expected.start
            && self.end == expected.end
            && self.label == expected.label
            && (self.confidence - expected.confidence).abs() <= CONFIDENCE_TOLERANCE
    }
}

impl From<&SpanAnnotation<'_>> for FoundAnnotation {
    fn from(annotation: &SpanAnnotation<'_>) -> Self {
        FoundAnnotation {
            sentence: annotation.span.sentence(),
            start: annotation.span.start(),
            end: annotation.span.end(),
            confidence: annotation.confidence,
            label: annotation.label.clone(),
        }
    }
}

impl std::fmt::Display for FoundAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "s{}[{}..{}) {} {}",
            self.sentence, self.start, self.end, self.confidence, self.label
        )
    }
}

/// Result of running one fixture.
#[derive(Debug, Clone, Default)]
pub struct FixtureRun {
    pub annotations: Vec<FoundAnnotation>,
    /// `(line, field)` of every reported diagnostic, in reply order.
    pub diagnostics: Vec<(usize, usize)>,
    /// Set when the call aborted on an out-of-range span.
    pub out_of_range: Option<String>,
    /// Frame display of every sentence, for failure reports.
    pub display: String,
}

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub reference: String,
    pub passed: bool,
    pub detail: String,
}

impl CheckOutcome {
    fn new(reference: String, passed: bool, detail: String) -> Self {
        Self {
            reference,
            passed,
            detail,
        }
    }
}

/// Run a fixture: build its document, serve its reply from a scripted
/// backend and collect what the engine handle produced.
pub fn run_fixture(fixture: &OpinionFixture) -> SpecResult<FixtureRun> {
    let document = fixture.build_document()?;
    let backend = ScriptedBackend::new().repeat(fixture.reply.clone());
    let engine = EngineConfig::new(backend, ModelBundle::placeholder())
        .with_grammar(fixture.grammar)
        .open()
        .map_err(|e| SpecError::Engine {
            message: e.to_string(),
        })?;

    let mut run = FixtureRun::default();
    match engine.annotate(&document) {
        Ok(result) => {
            run.annotations = result.annotations.iter().map(FoundAnnotation::from).collect();
            run.diagnostics = result.diagnostics.iter().map(|d| (d.line, d.field)).collect();
            run.display = display_frames(&document, &result.frames);
        }
        Err(OpinionError::OutOfRange(err)) => run.out_of_range = Some(err.to_string()),
        Err(err) => {
            return Err(SpecError::Engine {
                message: err.to_string(),
            })
        }
    }
    Ok(run)
}

fn display_frames(document: &Document, frames: &[OpinionFrame<'_>]) -> String {
    (0..document.sentence_count())
        .map(|sentence| FrameDisplay::new(document, sentence).with_frames(frames).to_string())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Compare a run against the fixture's expectations.
pub fn check_fixture(fixture: &OpinionFixture, run: &FixtureRun) -> Vec<CheckOutcome> {
    let mut outcomes = Vec::new();
    let mut used = vec![false; run.annotations.len()];

    for (idx, expected) in fixture.expectations.iter().enumerate() {
        let found = run
            .annotations
            .iter()
            .enumerate()
            .position(|(i, annotation)| !used[i] && annotation.matches(expected));
        if let Some(i) = found {
            used[i] = true;
        }
        outcomes.push(CheckOutcome::new(
            format!("E{}", idx + 1),
            found.is_some(),
            format!(
                "line {}: expected `{}`\n{}",
                expected.source_line, expected, run.display
            ),
        ));
    }

    for &(line, field) in &fixture.diagnostics {
        outcomes.push(CheckOutcome::new(
            format!("D{}:{}", line, field),
            run.diagnostics.contains(&(line, field)),
            format!("expected a diagnostic at reply line {}, field {}", line, field),
        ));
    }

    for (i, annotation) in run.annotations.iter().enumerate() {
        if !used[i] {
            outcomes.push(CheckOutcome::new(
                format!("U{}", i),
                false,
                format!("unexpected `{}`\n{}", annotation, run.display),
            ));
        }
    }

    for &(line, field) in &run.diagnostics {
        if !fixture.diagnostics.contains(&(line, field)) {
            outcomes.push(CheckOutcome::new(
                format!("X{}:{}", line, field),
                false,
                format!("unexpected diagnostic at reply line {}, field {}", line, field),
            ));
        }
    }

    if fixture.expect_out_of_range || run.out_of_range.is_some() {
        let detail = match &run.out_of_range {
            Some(message) => format!("call aborted: {}", message),
            None => "expected the call to abort on an out-of-range span".to_string(),
        };
        outcomes.push(CheckOutcome::new(
            "R".to_string(),
            fixture.expect_out_of_range == run.out_of_range.is_some(),
            detail,
        ));
    }

    outcomes
}

/// Run every fixture and tally the checks against the expected failures.
///
/// A fixture that cannot be run at all counts as one failed `load` check.
pub fn run_harness(fixtures: &[(String, OpinionFixture)], failures: &ExpectedFailures) -> HarnessResult {
    let mut result = HarnessResult::new();

    for (name, fixture) in fixtures {
        let run = match run_fixture(fixture) {
            Ok(run) => run,
            Err(err) => {
                result.record_failure(failures.is_expected(name, "load"), || format!("{}: {}", name, err));
                continue;
            }
        };

        for outcome in check_fixture(fixture, &run) {
            if outcome.passed {
                result.record_pass();
            } else {
                let state = failures.is_expected(name, &outcome.reference);
                result.record_failure(state, || {
                    format!("{} {}: {}", name, outcome.reference, outcome.detail)
                });
            }
        }
    }

    result
}
