//! Generator configuration from environment variables or JSON.

use crate::error::{GeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Runtime configuration for the PoA generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Our position in the setup's aggregator list
    pub aggregator_index: u16,

    /// Seconds between indexer polls
    pub poll_interval_secs: u64,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            aggregator_index: 0,
            poll_interval_secs: 3,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl GeneratorConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `POA_AGGREGATOR_INDEX`: Own aggregator index (default: 0)
    /// - `POA_POLL_INTERVAL_SECS`: Poll interval (default: 3)
    /// - `POA_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `POA_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            aggregator_index: env::var("POA_AGGREGATOR_INDEX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.aggregator_index),

            poll_interval_secs: env::var("POA_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.poll_interval_secs),

            log_level: env::var("POA_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            json_logs: env::var("POA_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),
        }
    }

    /// Parse a JSON configuration file's contents. Missing fields take
    /// their defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| GeneratorError::Config(e.to_string()))
    }

    /// Reject settings the generator cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            let reason = "poll_interval_secs must be positive";
            return Err(GeneratorError::Config(reason.to_string()));
        }
        Ok(())
    }
}
