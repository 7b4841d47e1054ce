//! Opinion annotator configuration, read from TOML.
//!
//! ```toml
//! grammar = "flat-record"
//! annotator_name = "cmunell_opinion-0.0.1"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::annotator::DEFAULT_ANNOTATOR_NAME;
use crate::decode::ResponseGrammar;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings chosen once per engine handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpinionConfig {
    /// Reply grammar the engine speaks.
    pub grammar: ResponseGrammar,
    /// Name the annotator reports to the pipeline.
    pub annotator_name: String,
}

impl Default for OpinionConfig {
    fn default() -> Self {
        Self {
            grammar: ResponseGrammar::default(),
            annotator_name: DEFAULT_ANNOTATOR_NAME.to_string(),
        }
    }
}

impl OpinionConfig {
    /// Load from a TOML file. A missing file gives the default configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })
    }
}
