#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Fixture-driven testing for the layered-opinion reply protocol.
//!
//! Test cases are `.opinion` files: a small annotated document, the raw reply
//! a scripted engine sends back, and the annotations and diagnostics that
//! reply must produce.
//!
//! ## Modules
//!
//! - [`parser`] - Parses `.opinion` fixture files
//! - [`fixture`] - Fixture types and document construction
//! - [`loader`] - Fixture file loading
//! - [`runner`] - Runs fixtures through a scripted engine and checks them
//! - [`errors`] - Error types for the harness
//! - [`failures`] - Expected failures tracking via TOML

pub mod errors;
pub mod failures;
pub mod fixture;
pub mod loader;
pub mod parser;
pub mod runner;

pub use errors::{SpecError, SpecResult};
pub use failures::{ExpectedFailures, FailureEntry, FailureState, HarnessResult};
pub use fixture::{Expectation, OpinionFixture, SentenceSpec};
pub use loader::{load_all_fixtures, load_fixture};
pub use parser::parse_fixture;
pub use runner::{check_fixture, run_fixture, run_harness, CheckOutcome, FixtureRun, FoundAnnotation};
