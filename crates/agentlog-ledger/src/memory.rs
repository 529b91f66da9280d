//! In-memory implementation of `LedgerClient`.
//!
//! `InMemoryLedger` is the reference ledger. It keeps every accepted
//! submission in a SHA-256 hash chain behind a `Mutex`, simulates transport
//! latency and timeouts with tokio, and exposes fault-injection hooks
//! (`set_connected`, `set_reachable`, `remove_entry`, `corrupt_entry`) so the
//! pipeline's failure paths can be exercised end to end.
//!
//! Use `export_log()` to snapshot the chain and `verify_integrity()` to
//! confirm it has not been tampered with.

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use agentlog_contracts::{
    action::{Action, ActionStatus},
    error::{AgentLogError, AgentLogResult},
    ledger::{
        LedgerQuery, LedgerReference, LedgerStatus, SubmissionAttempt, SubmissionRecord,
        SubmissionResult,
    },
    proof::Proof,
};
use agentlog_core::{
    config::LedgerConfig,
    traits::{LedgerClient, ProofGenerator},
};

use crate::{
    chain::{hash_entry, verify_chain, verify_entry},
    entry::{LedgerEntry, LedgerLog},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct LedgerState {
    /// Accepted entries, in append order.
    pub(crate) entries: Vec<LedgerEntry>,

    /// The next sequence number to assign (starts at 0).
    pub(crate) sequence: u64,

    /// `this_hash` of the last appended entry, or `GENESIS_HASH`.
    pub(crate) last_hash: String,

    /// Idempotency keys of every accepted submission.
    pub(crate) accepted_keys: HashSet<String>,

    /// Every submission that got past the transport, accepted or not.
    pub(crate) attempts: Vec<SubmissionAttempt>,
}

// ── Public ledger ─────────────────────────────────────────────────────────────

/// An in-memory, append-only ledger backed by a SHA-256 hash chain.
///
/// # Thread safety
///
/// All state lives behind one `Mutex` that is never held across an await
/// point, so the ledger can be shared as `Arc<dyn LedgerClient>` between
/// concurrently running pipeline calls.
pub struct InMemoryLedger {
    config: LedgerConfig,
    /// Recomputes public inputs to tie each proof to its action.
    attestor: Arc<dyn ProofGenerator>,
    connected: AtomicBool,
    reachable: AtomicBool,
    pub(crate) state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedger {
    /// Create a connected, reachable, empty ledger.
    ///
    /// `attestor` must derive public inputs the same way as the generator
    /// that produces the proofs submitted here.
    pub fn new(config: LedgerConfig, attestor: Arc<dyn ProofGenerator>) -> Self {
        let state = LedgerState {
            entries: Vec::new(),
            sequence: 0,
            last_hash: LedgerEntry::GENESIS_HASH.to_string(),
            accepted_keys: HashSet::new(),
            attempts: Vec::new(),
        };
        info!(
            chain_id = %config.chain_id,
            endpoint = %config.endpoint,
            "in-memory ledger opened"
        );
        Self {
            config,
            attestor,
            connected: AtomicBool::new(true),
            reachable: AtomicBool::new(true),
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Drop or restore the authenticated session.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
        info!(connected, "ledger session changed");
    }

    /// Make the endpoint reachable or unreachable.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
        info!(reachable, "ledger reachability changed");
    }

    /// Delete the entry recorded under `reference`.
    ///
    /// Fault injection: the chain is left broken on purpose. Returns whether
    /// an entry was removed.
    pub fn remove_entry(&self, reference: &LedgerReference) -> bool {
        let mut state = self.lock();
        let before = state.entries.len();
        state.entries.retain(|e| &e.reference != reference);
        let removed = state.entries.len() != before;
        if removed {
            warn!(reference = %reference, "ledger entry removed");
        }
        removed
    }

    /// Edit the stored record under `reference` in place without rehashing.
    ///
    /// Fault injection: any effective edit makes the entry fail integrity
    /// checks. Returns whether an entry was found.
    pub fn corrupt_entry(
        &self,
        reference: &LedgerReference,
        edit: impl FnOnce(&mut SubmissionRecord),
    ) -> bool {
        let mut state = self.lock();
        match state.entries.iter_mut().find(|e| &e.reference == reference) {
            Some(entry) => {
                edit(&mut entry.record);
                warn!(reference = %reference, "ledger entry corrupted");
                true
            }
            None => false,
        }
    }

    /// Verify that the chain has not been tampered with.
    pub fn verify_integrity(&self) -> bool {
        let state = self.lock();
        verify_chain(&self.config.chain_id, &state.entries)
    }

    /// Snapshot every entry.
    ///
    /// The `terminal_hash` is the `this_hash` of the last entry, or an empty
    /// string for an empty ledger.
    pub fn export_log(&self) -> LedgerLog {
        let state = self.lock();
        let terminal_hash = state
            .entries
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        LedgerLog {
            chain_id: self.config.chain_id.clone(),
            entries: state.entries.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        }
    }

    /// Every submission that reached the ledger, in arrival order.
    pub fn attempts(&self) -> Vec<SubmissionAttempt> {
        self.lock().attempts.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── Transport ─────────────────────────────────────────────────────────────

    /// Simulate one network round trip: latency bounded by the configured
    /// timeout, then a reachability check.
    async fn round_trip(&self, op: &str) -> Result<(), String> {
        let latency = self.config.latency();
        if tokio::time::timeout(self.config.timeout(), tokio::time::sleep(latency))
            .await
            .is_err()
        {
            return Err(format!(
                "{op} timed out after {}ms",
                self.config.timeout_ms
            ));
        }
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(format!("ledger endpoint {} is unreachable", self.config.endpoint));
        }
        Ok(())
    }

    /// Record a rejected attempt and build the error returned to the caller.
    fn reject(&self, record: SubmissionRecord, reason: String) -> AgentLogError {
        warn!(
            idempotency_key = %record.idempotency_key,
            reason = %reason,
            "submission rejected"
        );
        self.lock().attempts.push(SubmissionAttempt {
            record,
            result: SubmissionResult::Rejected {
                reason: reason.clone(),
            },
        });
        AgentLogError::Submission { reason }
    }
}

/// The action as the ledger sees it: completed under its reference.
fn recorded_action(entry: &LedgerEntry) -> Action {
    let mut action = entry.record.action.clone();
    if action.status() == ActionStatus::Pending {
        if let Err(e) = action.complete(entry.reference.clone()) {
            debug!(reference = %entry.reference, error = %e, "stored action left as-is");
        }
    }
    action
}

// ── LedgerClient impl ─────────────────────────────────────────────────────────

#[async_trait]
impl LedgerClient for InMemoryLedger {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Append one submission to the hash chain.
    ///
    /// Rejects submissions without a session, from a blank submitter, with a
    /// proof whose artifact does not match its inputs, for another chain, not
    /// derived from the submitted action, or whose idempotency key was
    /// already accepted.
    async fn submit(
        &self,
        action: &Action,
        proof: &Proof,
        submitter: &str,
    ) -> AgentLogResult<LedgerReference> {
        if !self.is_connected() {
            return Err(AgentLogError::Submission {
                reason: "ledger session is not authenticated".to_string(),
            });
        }
        self.round_trip("submit")
            .await
            .map_err(|reason| AgentLogError::Submission { reason })?;

        let record = SubmissionRecord {
            action: action.clone(),
            proof: proof.clone(),
            submitted_by: submitter.to_string(),
            idempotency_key: action.idempotency_key(),
            submitted_at: Utc::now(),
        };

        if submitter.trim().is_empty() {
            return Err(self.reject(record, "submitter address is empty".to_string()));
        }
        if !self.attestor.verify_binding(proof) {
            return Err(self.reject(
                record,
                format!("{} proof artifact does not match its public inputs", proof.scheme_id),
            ));
        }
        if proof.chain_id != self.config.chain_id {
            let reason = format!(
                "proof targets chain {} but ledger is {}",
                proof.chain_id, self.config.chain_id
            );
            return Err(self.reject(record, reason));
        }
        if !self.attestor.attests(proof, action) {
            let reason = format!(
                "{} proof was not generated for action {}",
                proof.scheme_id,
                action.id()
            );
            return Err(self.reject(record, reason));
        }

        let mut state = self.lock();
        if state.accepted_keys.contains(&record.idempotency_key) {
            drop(state);
            let reason = format!("duplicate submission {}", record.idempotency_key);
            return Err(self.reject(record, reason));
        }

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;
        let this_hash = hash_entry(&self.config.chain_id, sequence, &record, &prev_hash);
        let reference = LedgerEntry::reference_for(&this_hash);

        state.accepted_keys.insert(record.idempotency_key.clone());
        state.attempts.push(SubmissionAttempt {
            record: record.clone(),
            result: SubmissionResult::Accepted {
                reference: reference.clone(),
            },
        });
        state.entries.push(LedgerEntry {
            sequence,
            reference: reference.clone(),
            record,
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.sequence += 1;
        state.last_hash = this_hash;

        debug!(sequence, reference = %reference, "ledger entry appended");
        Ok(reference)
    }

    /// A proof is valid when its binding holds, an entry carries exactly this
    /// proof for an action it was derived from, and that entry's hash and
    /// link to its predecessor are intact.
    async fn check(&self, proof: &Proof) -> AgentLogResult<bool> {
        self.round_trip("check")
            .await
            .map_err(|reason| AgentLogError::LedgerUnreachable { reason })?;

        if !self.attestor.verify_binding(proof) {
            return Ok(false);
        }

        let state = self.lock();
        let valid = state
            .entries
            .iter()
            .position(|e| &e.record.proof == proof)
            .map(|index| {
                self.attestor.attests(proof, &state.entries[index].record.action)
                    && verify_entry(&self.config.chain_id, &state.entries, index)
            })
            .unwrap_or(false);
        Ok(valid)
    }

    async fn query(&self, agent_id: &str) -> LedgerQuery {
        if let Err(reason) = self.round_trip("query").await {
            warn!(agent_id, reason = %reason, "ledger query failed");
            return LedgerQuery::Unreachable { reason };
        }

        let state = self.lock();
        LedgerQuery::Found(
            state
                .entries
                .iter()
                .filter(|e| e.record.action.agent_id.as_str() == agent_id)
                .map(recorded_action)
                .collect(),
        )
    }

    async fn find(&self, reference: &LedgerReference) -> AgentLogResult<Option<Action>> {
        self.round_trip("find")
            .await
            .map_err(|reason| AgentLogError::LedgerUnreachable { reason })?;

        let state = self.lock();
        Ok(state
            .entries
            .iter()
            .find(|e| &e.reference == reference)
            .map(recorded_action))
    }

    async fn status(&self) -> LedgerStatus {
        LedgerStatus {
            connected: self.is_connected(),
            reachable: self.reachable.load(Ordering::SeqCst),
            chain_id: self.config.chain_id.clone(),
            endpoint: self.config.endpoint.clone(),
            entry_count: self.len(),
        }
    }
}
