//! Expected failures tracking via TOML file.
//!
//! ```toml
//! [[pending]]
//! fixture = "holder-and-target.opinion"
//! check = "E2"
//! reason = "engine splits compound holders"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::{SpecError, SpecResult};

/// Loaded expected failures configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpectedFailures {
    /// Known failures (won't fix soon).
    #[serde(default)]
    pub known: Vec<FailureEntry>,
    /// Pending failures (awaiting fix).
    #[serde(default)]
    pub pending: Vec<FailureEntry>,
}

/// A single expected failure entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureEntry {
    /// Fixture path relative to the fixtures directory.
    pub fixture: String,
    /// Check reference, e.g. "E2" for the second expectation.
    pub check: String,
    /// Human-readable reason.
    #[serde(default)]
    pub reason: Option<String>,
    /// Date added (YYYY-MM-DD).
    #[serde(default)]
    pub added: Option<String>,
}

/// Failure lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureState {
    /// Known limitation, won't fix soon.
    Known,
    /// Awaiting fix, not blocking.
    Pending,
    /// Expected to pass - failure is a regression.
    Regression,
}

impl ExpectedFailures {
    /// Load from a TOML file. A missing file means no expected failures.
    pub fn load(path: &Path) -> SpecResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SpecError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| SpecError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Check if a failure is expected.
    pub fn is_expected(&self, fixture: &str, check: &str) -> FailureState {
        let matches = |entry: &FailureEntry| entry.fixture == fixture && entry.check == check;

        if self.known.iter().any(|e| matches(e)) {
            FailureState::Known
        } else if self.pending.iter().any(|e| matches(e)) {
            FailureState::Pending
        } else {
            FailureState::Regression
        }
    }

    /// Get all expected failure fixtures.
    pub fn all_fixtures(&self) -> Vec<&str> {
        let mut fixtures: Vec<_> = self
            .known
            .iter()
            .chain(self.pending.iter())
            .map(|e| e.fixture.as_str())
            .collect();
        fixtures.sort();
        fixtures.dedup();
        fixtures
    }

    /// Count total expected failures.
    pub fn count(&self) -> usize {
        self.known.len() + self.pending.len()
    }
}

/// Result of running the harness.
#[derive(Debug, Clone, Default)]
pub struct HarnessResult {
    /// Total checks run.
    pub total: usize,
    /// Passed checks.
    pub passed: usize,
    /// Expected failures (known + pending).
    pub expected_failures: usize,
    /// Regressions (unexpected failures).
    pub regressions: usize,
    /// One report per regression.
    pub regression_reports: Vec<String>,
}

impl HarnessResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the exit code (0 = pass, 1 = regressions).
    pub fn exit_code(&self) -> i32 {
        if self.regressions > 0 {
            1
        } else {
            0
        }
    }

    /// Check if all tests passed (no regressions).
    pub fn success(&self) -> bool {
        self.regressions == 0
    }

    pub fn record_pass(&mut self) {
        self.total += 1;
        self.passed += 1;
    }

    /// Record a failed check with its state.
    pub fn record_failure(&mut self, state: FailureState, report: impl FnOnce() -> String) {
        self.total += 1;
        match state {
            FailureState::Known | FailureState::Pending => {
                self.expected_failures += 1;
            }
            FailureState::Regression => {
                self.regressions += 1;
                self.regression_reports.push(report());
            }
        }
    }
}
