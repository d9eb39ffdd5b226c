//! Runtime configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables for a [`Runtime`](crate::reactive::Runtime).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Sweep dead identity pairs after this many registrations.
    /// Zero disables automatic sweeping.
    pub sweep_interval: usize,

    /// Emit a trace event from the read trap.
    pub trace_reads: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            sweep_interval: 64,
            trace_reads: false,
        }
    }
}

impl RuntimeConfig {
    /// Parse a configuration from a JSON string. Missing fields take their
    /// default values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
