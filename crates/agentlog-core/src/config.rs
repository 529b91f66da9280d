//! TOML configuration for the pipeline and its collaborators.
//!
//! One file configures everything; every section and field has a default,
//! so an empty document is a valid configuration.
//!
//! ```toml
//! [pipeline]
//! verify_before_submit = false
//! event_capacity = 256
//!
//! [proof]
//! enable_privacy = true
//! chain_id = "agentlog-testnet-1"
//!
//! [ledger]
//! chain_id = "agentlog-testnet-1"
//! endpoint = "memory://local"
//! latency_ms = 0
//! timeout_ms = 5000
//! ```

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::info;

use agentlog_contracts::error::{AgentLogError, AgentLogResult};

pub const DEFAULT_CHAIN_ID: &str = "agentlog-testnet-1";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentLogConfig {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub proof: ProofConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

impl AgentLogConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `AgentLogError::Config` if the document is malformed or does
    /// not match the expected shape.
    pub fn from_toml_str(s: &str) -> AgentLogResult<Self> {
        toml::from_str(s).map_err(|e| AgentLogError::Config {
            reason: format!("failed to parse config TOML: {}", e),
        })
    }

    /// Read and parse the TOML file at `path`.
    pub fn from_file(path: &Path) -> AgentLogResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AgentLogError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Run a local binding check on each proof before submitting it.
    ///
    /// Off by default: proofs are submitted unconditionally and verification
    /// is a separate, later operation.
    pub verify_before_submit: bool,
    /// How many recent events the pipeline keeps for `recent_events`.
    pub event_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            verify_before_submit: false,
            event_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProofConfig {
    /// Publish hashes of sensitive fields instead of raw values.
    pub enable_privacy: bool,
    pub chain_id: String,
}

impl Default for ProofConfig {
    fn default() -> Self {
        Self {
            enable_privacy: true,
            chain_id: DEFAULT_CHAIN_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub chain_id: String,
    pub endpoint: String,
    /// Simulated round-trip time for each ledger call.
    pub latency_ms: u64,
    /// Transport timeout applied to every ledger call.
    pub timeout_ms: u64,
}

impl LedgerConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID.to_string(),
            endpoint: "memory://local".to_string(),
            latency_ms: 0,
            timeout_ms: 5_000,
        }
    }
}
