//! Ledger-facing types: references, submission records, status and queries.
//!
//! The ledger itself lives behind the `LedgerClient` trait in agentlog-core.
//! These are only the values that cross that boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{action::Action, proof::Proof};

/// Opaque transaction identifier returned by the ledger on success.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerReference(pub String);

impl LedgerReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LedgerReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything sent to the ledger in one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub action: Action,
    pub proof: Proof,
    /// On-chain address of the submitting account.
    pub submitted_by: String,
    /// See `Action::idempotency_key`.
    pub idempotency_key: String,
    pub submitted_at: DateTime<Utc>,
}

/// How the ledger answered a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionResult {
    Accepted { reference: LedgerReference },
    Rejected { reason: String },
}

/// One submission attempt and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionAttempt {
    pub record: SubmissionRecord,
    pub result: SubmissionResult,
}

/// Connection and size snapshot of a ledger client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStatus {
    pub connected: bool,
    pub reachable: bool,
    pub chain_id: String,
    pub endpoint: String,
    pub entry_count: usize,
}

/// Result of asking the ledger for an agent's actions.
///
/// An unreachable store is not an error for display purposes (it yields no
/// actions) but stays distinguishable for callers that want to retry.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerQuery {
    /// Actions in submission order, oldest first. Empty for unknown agents.
    Found(Vec<Action>),
    Unreachable { reason: String },
}

impl LedgerQuery {
    /// The actions found, or an empty slice if the ledger was unreachable.
    pub fn actions(&self) -> &[Action] {
        match self {
            LedgerQuery::Found(actions) => actions,
            LedgerQuery::Unreachable { .. } => &[],
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, LedgerQuery::Unreachable { .. })
    }
}
