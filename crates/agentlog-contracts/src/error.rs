//! Error types for the AGENTLOG action pipeline.
//!
//! All fallible operations return `AgentLogResult<T>`. Every variant maps to
//! the pipeline stage that produced it, so callers can decide whether to
//! retry, edit the input, or give up.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::ActionStatus;

/// The unified error type for the AGENTLOG pipeline.
#[derive(Debug, Error)]
pub enum AgentLogError {
    /// A required field was missing or blank when the action was created.
    ///
    /// Raised before anything is recorded; never reaches the ledger.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// Metadata required by the action's type is absent
    /// (e.g. no location on a `location_visit`).
    #[error("invalid input for proof generation: {reason}")]
    InvalidInput { reason: String },

    /// The proving primitive failed or produced an unusable artifact.
    #[error("proof generation failed: {reason}")]
    ProofGeneration { reason: String },

    /// The ledger rejected the submission or could not be reached.
    #[error("ledger submission failed: {reason}")]
    Submission { reason: String },

    /// No authenticated wallet or ledger session is available.
    #[error("not connected: {reason}")]
    NotConnected { reason: String },

    /// A ledger query could not be answered because the backing store is down.
    #[error("ledger unreachable: {reason}")]
    LedgerUnreachable { reason: String },

    /// An attempt was made to move an action out of a terminal status.
    #[error("illegal status transition: {from} -> {to}")]
    InvalidTransition { from: ActionStatus, to: ActionStatus },

    /// A configuration value is missing or malformed.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// The pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Connection,
    Creation,
    Proof,
    Submission,
    Query,
    Internal,
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureStage::Connection => "connection",
            FailureStage::Creation => "creation",
            FailureStage::Proof => "proof",
            FailureStage::Submission => "submission",
            FailureStage::Query => "query",
            FailureStage::Internal => "internal",
        };
        f.write_str(s)
    }
}

impl AgentLogError {
    /// Which stage of the pipeline produced this error.
    pub fn stage(&self) -> FailureStage {
        match self {
            AgentLogError::NotConnected { .. } => FailureStage::Connection,
            AgentLogError::Validation { .. } => FailureStage::Creation,
            AgentLogError::InvalidInput { .. } | AgentLogError::ProofGeneration { .. } => {
                FailureStage::Proof
            }
            AgentLogError::Submission { .. } => FailureStage::Submission,
            AgentLogError::LedgerUnreachable { .. } => FailureStage::Query,
            AgentLogError::InvalidTransition { .. } | AgentLogError::Config { .. } => {
                FailureStage::Internal
            }
        }
    }
}

/// Convenience alias used throughout the AGENTLOG crates.
pub type AgentLogResult<T> = Result<T, AgentLogError>;
