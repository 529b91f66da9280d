//! Agent action types and their lifecycle.
//!
//! An `Action` is created `Pending` and moves exactly once to `Completed` or
//! `Failed`. There is no status setter: the only way to change status is
//! through `complete()` and `fail()`, both of which refuse to leave a
//! terminal state.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    error::{AgentLogError, AgentLogResult},
    ledger::LedgerReference,
    proof::Proof,
};

/// Opaque identifier of the agent performing actions.
///
/// Example: AgentId("agent_1")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identifier of one action: `"{agent_id}:{timestamp}"`.
///
/// Unique within a process because timestamps come from a monotonic clock.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(pub String);

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed set of things an agent can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    TaskCompletion,
    LocationVisit,
    FormSubmit,
    Verification,
}

impl ActionType {
    /// The snake_case wire name, also used as a proof input.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::TaskCompletion => "task_completion",
            ActionType::LocationVisit => "location_visit",
            ActionType::FormSubmit => "form_submit",
            ActionType::Verification => "verification",
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionType {
    type Err = AgentLogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task_completion" => Ok(ActionType::TaskCompletion),
            "location_visit" => Ok(ActionType::LocationVisit),
            "form_submit" => Ok(ActionType::FormSubmit),
            "verification" => Ok(ActionType::Verification),
            other => Err(AgentLogError::Validation {
                reason: format!("unknown action type '{other}'"),
            }),
        }
    }
}

/// A geographic point attached to a `location_visit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// User-entered payload describing an action.
///
/// Only `description` is always required. Which of the optional fields must
/// be present depends on the action type and is enforced by the proof
/// generator, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionMetadata {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_data: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_hash: Option<String>,
}

impl ActionMetadata {
    /// Metadata with only a description set.
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_form_data(mut self, form_data: serde_json::Map<String, serde_json::Value>) -> Self {
        self.form_data = Some(form_data);
        self
    }
}

/// Lifecycle state of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    Completed,
    Failed,
}

impl ActionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ActionStatus::Pending)
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActionStatus::Pending => "pending",
            ActionStatus::Completed => "completed",
            ActionStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

static LAST_TIMESTAMP_MS: AtomicU64 = AtomicU64::new(0);

/// Milliseconds since the epoch, strictly increasing across calls in this
/// process.
pub fn next_timestamp_ms() -> u64 {
    let now = Utc::now().timestamp_millis().max(0) as u64;
    let mut last = LAST_TIMESTAMP_MS.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_TIMESTAMP_MS.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}

/// A single recorded activity by an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub agent_id: AgentId,
    /// Creation instant in milliseconds since the epoch.
    pub timestamp: u64,
    pub action_type: ActionType,
    pub metadata: ActionMetadata,
    #[serde(default)]
    proof: Option<Proof>,
    #[serde(default)]
    ledger_reference: Option<LedgerReference>,
    status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    failure_reason: Option<String>,
}

impl Action {
    /// Validate input and build a new `Pending` action stamped with the
    /// current time.
    ///
    /// Fails with `Validation` when the agent id or the description is blank.
    pub fn create(
        agent_id: AgentId,
        action_type: ActionType,
        metadata: ActionMetadata,
    ) -> AgentLogResult<Self> {
        if agent_id.0.trim().is_empty() {
            return Err(AgentLogError::Validation {
                reason: "agent id must not be empty".to_string(),
            });
        }
        if metadata.description.trim().is_empty() {
            return Err(AgentLogError::Validation {
                reason: "metadata.description must not be empty".to_string(),
            });
        }

        Ok(Self {
            agent_id,
            timestamp: next_timestamp_ms(),
            action_type,
            metadata,
            proof: None,
            ledger_reference: None,
            status: ActionStatus::Pending,
            failure_reason: None,
        })
    }

    pub fn id(&self) -> ActionId {
        ActionId(format!("{}:{}", self.agent_id, self.timestamp))
    }

    pub fn status(&self) -> ActionStatus {
        self.status
    }

    pub fn proof(&self) -> Option<&Proof> {
        self.proof.as_ref()
    }

    pub fn ledger_reference(&self) -> Option<&LedgerReference> {
        self.ledger_reference.as_ref()
    }

    /// Why the action failed, if it did.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Attach a generated proof. Only legal while the action is pending.
    pub fn attach_proof(&mut self, proof: Proof) -> AgentLogResult<()> {
        if self.status.is_terminal() {
            return Err(AgentLogError::InvalidTransition {
                from: self.status,
                to: self.status,
            });
        }
        self.proof = Some(proof);
        Ok(())
    }

    /// `Pending -> Completed`, recording the ledger reference.
    pub fn complete(&mut self, reference: LedgerReference) -> AgentLogResult<()> {
        self.transition(ActionStatus::Completed)?;
        self.ledger_reference = Some(reference);
        Ok(())
    }

    /// `Pending -> Failed`, recording why.
    pub fn fail(&mut self, reason: impl Into<String>) -> AgentLogResult<()> {
        self.transition(ActionStatus::Failed)?;
        self.failure_reason = Some(reason.into());
        Ok(())
    }

    fn transition(&mut self, to: ActionStatus) -> AgentLogResult<()> {
        if self.status != ActionStatus::Pending || to == ActionStatus::Pending {
            return Err(AgentLogError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Hex SHA-256 over the fields that identify this action's content.
    ///
    /// Two submissions of the same action carry the same key; a caller
    /// retry creates a new action with a new timestamp and therefore a new
    /// key.
    pub fn idempotency_key(&self) -> String {
        let metadata_json = serde_json::to_vec(&self.metadata).unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(self.agent_id.0.as_bytes());
        hasher.update(self.timestamp.to_le_bytes());
        hasher.update(self.action_type.as_str().as_bytes());
        hasher.update(&metadata_json);

        hex::encode(hasher.finalize())
    }
}
