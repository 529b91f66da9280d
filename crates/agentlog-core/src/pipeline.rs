//! The AGENTLOG action pipeline: the only owner of action status.
//!
//! Every call to `log_action` runs the same strictly sequential pipeline:
//!
//!   Connection → Create → Proof → [Binding check] → Submit → Reconcile
//!
//! Once an action has been created it is always recorded in history,
//! whatever the outcome. It ends `Completed` only if the ledger accepted it,
//! and `Failed` otherwise. Errors are never swallowed or retried here.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use agentlog_contracts::{
    action::{Action, ActionMetadata, ActionStatus, ActionType, AgentId},
    error::{AgentLogError, AgentLogResult},
    ledger::{LedgerQuery, LedgerReference, LedgerStatus},
};

use crate::{
    config::PipelineConfig,
    events::{EventLog, PipelineEvent},
    history::{ActionHistory, HistorySummary},
    traits::{LedgerClient, ProofGenerator},
};

/// Orchestrates proof generation and ledger submission for agent actions.
///
/// Build one per process or session in the composition root and share it
/// as `Arc<ActionPipeline>`. Concurrent `log_action` calls are safe; the
/// history lock is never held across an await.
pub struct ActionPipeline {
    prover: Arc<dyn ProofGenerator>,
    ledger: Arc<dyn LedgerClient>,
    config: PipelineConfig,
    history: ActionHistory,
    events: EventLog,
}

impl ActionPipeline {
    pub fn new(
        prover: Arc<dyn ProofGenerator>,
        ledger: Arc<dyn LedgerClient>,
        config: PipelineConfig,
    ) -> Self {
        let events = EventLog::new(config.event_capacity);
        Self {
            prover,
            ledger,
            config,
            history: ActionHistory::new(),
            events,
        }
    }

    /// Create, prove, and submit one action.
    ///
    /// # Pipeline
    ///
    /// 1. Refuse with `NotConnected` if there is no submitter address or the
    ///    ledger has no session. Nothing is created.
    /// 2. `Action::create`; a `Validation` error is returned and nothing is
    ///    recorded.
    /// 3. Record the pending action, then generate its proof. On error the
    ///    action is failed and `InvalidInput` / `ProofGeneration` returned.
    /// 4. If `verify_before_submit` is set, check locally that the proof is
    ///    sealed correctly and attests this action.
    /// 5. Submit. On success the action is completed with the returned
    ///    reference; on failure it is failed and `Submission` returned.
    pub async fn log_action(
        &self,
        agent_id: AgentId,
        action_type: ActionType,
        metadata: ActionMetadata,
        submitter: &str,
    ) -> AgentLogResult<LedgerReference> {
        // ── Step 1: Connection precondition ──────────────────────────────────
        if submitter.trim().is_empty() {
            warn!(agent_id = %agent_id, "no submitter address, wallet not connected");
            return Err(AgentLogError::NotConnected {
                reason: "no submitter address available".to_string(),
            });
        }
        if !self.ledger.is_connected() {
            warn!(agent_id = %agent_id, "ledger session not connected");
            return Err(AgentLogError::NotConnected {
                reason: "ledger client has no authenticated session".to_string(),
            });
        }

        // ── Step 2: Create ───────────────────────────────────────────────────
        let mut action = Action::create(agent_id, action_type, metadata)?;
        let action_id = action.id();

        debug!(
            action_id = %action_id,
            action_type = %action.action_type,
            "action created"
        );
        self.history.record(action.clone());

        // ── Step 3: Proof generation ─────────────────────────────────────────
        let proof = match self.prover.generate(&action).await {
            Ok(proof) => proof,
            Err(e) => return Err(self.fail(action, e)),
        };
        action.attach_proof(proof.clone())?;
        self.history.update(&action);

        // ── Step 4: Optional local binding check ─────────────────────────────
        if self.config.verify_before_submit && !self.prover.attests(&proof, &action) {
            let err = AgentLogError::ProofGeneration {
                reason: format!("{} proof failed local binding check", proof.scheme_id),
            };
            return Err(self.fail(action, err));
        }

        // ── Step 5: Submit and reconcile ─────────────────────────────────────
        match self.ledger.submit(&action, &proof, submitter).await {
            Ok(reference) => {
                action.complete(reference.clone())?;
                self.history.update(&action);
                self.events.publish(PipelineEvent::logged(&action));
                info!(
                    action_id = %action_id,
                    reference = %reference,
                    scheme = %proof.scheme_id,
                    "action logged to ledger"
                );
                Ok(reference)
            }
            Err(e) => {
                let err = match e {
                    AgentLogError::Submission { .. } => e,
                    other => AgentLogError::Submission {
                        reason: other.to_string(),
                    },
                };
                Err(self.fail(action, err))
            }
        }
    }

    /// Mark `action` failed, record it, and hand back `err` for propagation.
    fn fail(&self, mut action: Action, err: AgentLogError) -> AgentLogError {
        if let Err(transition) = action.fail(err.to_string()) {
            warn!(action_id = %action.id(), error = %transition, "could not mark action failed");
        }
        self.history.update(&action);
        self.events.publish(PipelineEvent::failed(&action, err.stage()));
        warn!(
            action_id = %action.id(),
            stage = %err.stage(),
            error = %err,
            "action failed"
        );
        err
    }

    /// Re-verify a previously logged action's proof against the ledger.
    ///
    /// Advisory only: the action's status is never changed, even when a
    /// completed action no longer verifies. Ledger errors count as `false`.
    pub async fn verify_action(&self, action: &Action) -> AgentLogResult<bool> {
        let verified = match action.proof() {
            Some(proof) => self.ledger.verify(proof).await,
            None => {
                debug!(action_id = %action.id(), "action has no proof to verify");
                false
            }
        };

        if !verified && action.status() == ActionStatus::Completed {
            warn!(
                action_id = %action.id(),
                "completed action failed re-verification; status left unchanged"
            );
        }
        self.events.publish(PipelineEvent::verified(action, verified));
        Ok(verified)
    }

    /// Every action created for `agent_id` in this process, in creation order.
    pub fn get_history(&self, agent_id: &AgentId) -> Vec<Action> {
        self.history.for_agent(agent_id)
    }

    /// Actions whose submission has not returned yet.
    pub fn get_pending(&self) -> Vec<Action> {
        self.history.pending()
    }

    pub fn get_by_reference(&self, reference: &LedgerReference) -> Option<Action> {
        self.history.by_reference(reference)
    }

    pub fn summary(&self, agent_id: &AgentId) -> HistorySummary {
        self.history.summary(agent_id)
    }

    /// What the ledger itself has on record for `agent_id`.
    pub async fn query_ledger(&self, agent_id: &AgentId) -> LedgerQuery {
        self.ledger.query(agent_id.as_str()).await
    }

    pub async fn ledger_status(&self) -> LedgerStatus {
        self.ledger.status().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    /// Up to `limit` recent events, newest first.
    pub fn recent_events(&self, limit: usize) -> Vec<PipelineEvent> {
        self.events.recent(limit)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
