//! Compiler configuration.
//!
//! The only tunable is the backend's per-query terms limit, which can be set
//! directly or read from the index settings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};

/// Index settings key holding the backend's per-query terms limit.
pub const MAX_TERMS_COUNT_KEY: &str = "max_terms_count";

/// The backend's default `index.max_terms_count`.
pub const DEFAULT_MAX_TERMS_COUNT: usize = 65_536;

fn default_max_terms_count() -> usize {
    DEFAULT_MAX_TERMS_COUNT
}

/// Configuration for the query compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Maximum number of values a single `terms` leaf may carry. Larger value
    /// sets are split into several leaves.
    #[serde(default = "default_max_terms_count")]
    pub max_terms_count: usize,
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self {
            max_terms_count: default_max_terms_count(),
        }
    }

    pub fn with_max_terms_count(mut self, max_terms_count: usize) -> Self {
        self.max_terms_count = max_terms_count;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_terms_count == 0 {
            return Err(QueryError::invalid_config(
                "max_terms_count must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Read the configuration from an index settings map.
    ///
    /// `max_terms_count` may be a number or a numeric string; when absent the
    /// backend default applies.
    pub fn from_settings(settings: &HashMap<String, serde_json::Value>) -> Result<Self> {
        let max_terms_count = match settings.get(MAX_TERMS_COUNT_KEY) {
            None | Some(serde_json::Value::Null) => default_max_terms_count(),
            Some(serde_json::Value::Number(n)) => n
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| {
                    QueryError::invalid_config(format!("Invalid {MAX_TERMS_COUNT_KEY}: {n}"))
                })?,
            Some(serde_json::Value::String(s)) => s.trim().parse().map_err(|_| {
                QueryError::invalid_config(format!("Invalid {MAX_TERMS_COUNT_KEY}: '{s}'"))
            })?,
            Some(other) => {
                return Err(QueryError::invalid_config(format!(
                    "Invalid {MAX_TERMS_COUNT_KEY}: {other}"
                )));
            }
        };

        let config = Self { max_terms_count };
        config.validate()?;
        Ok(config)
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self::new()
    }
}
