//! Pipeline events: a bounded recent-event log plus a broadcast feed.
//!
//! Publishing never blocks and never fails. With no subscribers the event
//! is only kept in the log. Slow subscribers see `RecvError::Lagged`.

use std::{
    collections::VecDeque,
    sync::Mutex,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use agentlog_contracts::{
    action::{Action, ActionId, AgentId},
    error::FailureStage,
    ledger::LedgerReference,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ActionLogged,
    ActionFailed,
    ActionVerified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEvent {
    pub kind: EventKind,
    pub agent_id: AgentId,
    pub action_id: ActionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<LedgerReference>,
    /// Outcome of a re-verification; only set on `ActionVerified`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    /// Stage that failed; only set on `ActionFailed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<FailureStage>,
    pub at: DateTime<Utc>,
}

impl PipelineEvent {
    pub fn logged(action: &Action) -> Self {
        Self::base(EventKind::ActionLogged, action)
    }

    pub fn failed(action: &Action, stage: FailureStage) -> Self {
        Self {
            stage: Some(stage),
            ..Self::base(EventKind::ActionFailed, action)
        }
    }

    pub fn verified(action: &Action, verified: bool) -> Self {
        Self {
            verified: Some(verified),
            ..Self::base(EventKind::ActionVerified, action)
        }
    }

    fn base(kind: EventKind, action: &Action) -> Self {
        Self {
            kind,
            agent_id: action.agent_id.clone(),
            action_id: action.id(),
            reference: action.ledger_reference().cloned(),
            verified: None,
            stage: None,
            at: Utc::now(),
        }
    }
}

pub struct EventLog {
    capacity: usize,
    recent: Mutex<VecDeque<PipelineEvent>>,
    sender: broadcast::Sender<PipelineEvent>,
}

impl EventLog {
    /// A log retaining at most `capacity` events (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            capacity,
            recent: Mutex::new(VecDeque::with_capacity(capacity)),
            sender,
        }
    }

    pub fn publish(&self, event: PipelineEvent) {
        {
            let mut recent = self.recent.lock().unwrap_or_else(|p| p.into_inner());
            if recent.len() == self.capacity {
                recent.pop_front();
            }
            recent.push_back(event.clone());
        }
        // Err only means nobody is listening.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.sender.subscribe()
    }

    /// Up to `limit` events, newest first.
    pub fn recent(&self, limit: usize) -> Vec<PipelineEvent> {
        let recent = self.recent.lock().unwrap_or_else(|p| p.into_inner());
        recent.iter().rev().take(limit).cloned().collect()
    }
}
