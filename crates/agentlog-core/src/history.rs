//! Per-agent, in-memory action history.
//!
//! The pipeline is the only writer: `record` and `update` are crate-private.
//! Readers get clones, so nothing outside the pipeline can alter a stored
//! action's status.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use serde::{Deserialize, Serialize};

use agentlog_contracts::{
    action::{Action, ActionId, ActionStatus, AgentId},
    ledger::LedgerReference,
};

#[derive(Default)]
struct HistoryState {
    /// Every action, in creation order.
    actions: Vec<Action>,
    /// Positions in `actions`, per agent, in creation order.
    by_agent: HashMap<AgentId, Vec<usize>>,
    by_id: HashMap<ActionId, usize>,
}

/// Counts of an agent's actions by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Lock-guarded, append-only store of actions created in this process.
#[derive(Default)]
pub struct ActionHistory {
    state: Mutex<HistoryState>,
}

impl ActionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    // The lock only guards plain data, so a panic elsewhere cannot leave it
    // half-updated; recover the guard instead of propagating poison.
    fn lock(&self) -> MutexGuard<'_, HistoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a newly created action.
    pub(crate) fn record(&self, action: Action) {
        let mut state = self.lock();
        let position = state.actions.len();
        state.by_id.insert(action.id(), position);
        state
            .by_agent
            .entry(action.agent_id.clone())
            .or_default()
            .push(position);
        state.actions.push(action);
    }

    /// Replace the stored copy of `action` (matched by id), or append it if
    /// it was never recorded.
    pub(crate) fn update(&self, action: &Action) {
        let mut state = self.lock();
        if let Some(&position) = state.by_id.get(&action.id()) {
            state.actions[position] = action.clone();
            return;
        }
        drop(state);
        self.record(action.clone());
    }

    /// All actions for `agent_id`, any status, in creation order.
    pub fn for_agent(&self, agent_id: &AgentId) -> Vec<Action> {
        let state = self.lock();
        state
            .by_agent
            .get(agent_id)
            .map(|positions| positions.iter().map(|&p| state.actions[p].clone()).collect())
            .unwrap_or_default()
    }

    /// Every action still pending, across all agents, in creation order.
    pub fn pending(&self) -> Vec<Action> {
        self.lock()
            .actions
            .iter()
            .filter(|a| a.status() == ActionStatus::Pending)
            .cloned()
            .collect()
    }

    pub fn by_reference(&self, reference: &LedgerReference) -> Option<Action> {
        self.lock()
            .actions
            .iter()
            .find(|a| a.ledger_reference() == Some(reference))
            .cloned()
    }

    pub fn summary(&self, agent_id: &AgentId) -> HistorySummary {
        let mut summary = HistorySummary::default();
        for action in self.for_agent(agent_id) {
            summary.total += 1;
            match action.status() {
                ActionStatus::Pending => summary.pending += 1,
                ActionStatus::Completed => summary.completed += 1,
                ActionStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }

    pub fn len(&self) -> usize {
        self.lock().actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
