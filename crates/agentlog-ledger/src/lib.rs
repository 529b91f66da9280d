//! # agentlog-ledger
//!
//! Append-only, SHA-256 hash-chained ledger for AGENTLOG.
//!
//! ## Overview
//!
//! Every accepted submission is wrapped in a `LedgerEntry` that links to the
//! previous entry via its hash. The entry's reference (`tx_<hash>`) is what
//! the pipeline hands back to callers. Editing or removing an entry breaks
//! the chain, so proofs recorded under it stop verifying.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use agentlog_ledger::InMemoryLedger;
//! use agentlog_core::{config::LedgerConfig, traits::LedgerClient};
//!
//! // The ledger re-derives public inputs with the same generator.
//! let ledger = Arc::new(InMemoryLedger::new(LedgerConfig::default(), prover.clone()));
//! let reference = ledger.submit(&action, &proof, "addr_1").await?;
//! assert!(ledger.verify(&proof).await);
//! assert!(ledger.verify_integrity());
//! ```

pub mod chain;
pub mod entry;
pub mod memory;

pub use chain::{hash_entry, verify_chain};
pub use entry::{LedgerEntry, LedgerLog};
pub use memory::InMemoryLedger;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use agentlog_contracts::{
        action::{Action, ActionMetadata, ActionStatus, ActionType, AgentId, Location},
        error::AgentLogError,
        ledger::SubmissionResult,
        proof::Proof,
    };
    use agentlog_core::{
        config::{LedgerConfig, ProofConfig},
        traits::{LedgerClient, ProofGenerator},
    };
    use agentlog_proof::HashProofGenerator;

    use super::{InMemoryLedger, LedgerEntry};

    // ── Helpers ───────────────────────────────────────────────────────────────

    async fn proved(agent: &str, description: &str) -> (Action, Proof) {
        let mut action = Action::create(
            AgentId::new(agent),
            ActionType::TaskCompletion,
            ActionMetadata::described(description),
        )
        .unwrap();
        let proof = HashProofGenerator::new(ProofConfig::default())
            .generate(&action)
            .await
            .unwrap();
        action.attach_proof(proof.clone()).unwrap();
        (action, proof)
    }

    fn attestor() -> Arc<dyn ProofGenerator> {
        Arc::new(HashProofGenerator::new(ProofConfig::default()))
    }

    fn ledger() -> InMemoryLedger {
        InMemoryLedger::new(LedgerConfig::default(), attestor())
    }

    // ── Submission ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_submit_returns_hash_reference() {
        let ledger = ledger();
        let (action, proof) = proved("agent_1", "first").await;

        let reference = ledger.submit(&action, &proof, "addr_1").await.unwrap();

        let log = ledger.export_log();
        assert_eq!(log.entries.len(), 1);
        assert_eq!(reference.as_str(), format!("tx_{}", log.entries[0].this_hash));
        assert_eq!(log.terminal_hash, log.entries[0].this_hash);
        assert_eq!(log.entries[0].record.submitted_by, "addr_1");
        assert_eq!(log.entries[0].record.idempotency_key, action.idempotency_key());
    }

    #[tokio::test]
    async fn test_first_entry_links_to_genesis() {
        let ledger = ledger();
        let (a, pa) = proved("agent_1", "a").await;
        let (b, pb) = proved("agent_1", "b").await;
        ledger.submit(&a, &pa, "addr_1").await.unwrap();
        ledger.submit(&b, &pb, "addr_1").await.unwrap();

        let log = ledger.export_log();
        assert_eq!(log.entries[0].prev_hash, LedgerEntry::GENESIS_HASH);
        assert_eq!(log.entries[1].prev_hash, log.entries[0].this_hash);
        assert_eq!(log.entries[1].sequence, 1);
        assert!(ledger.verify_integrity());
    }

    #[tokio::test]
    async fn test_duplicate_submission_rejected() {
        let ledger = ledger();
        let (action, proof) = proved("agent_1", "once").await;

        ledger.submit(&action, &proof, "addr_1").await.unwrap();
        let second = ledger.submit(&action, &proof, "addr_1").await;

        match second {
            Err(AgentLogError::Submission { reason }) => assert!(reason.contains("duplicate")),
            other => panic!("expected Submission, got {:?}", other),
        }
        assert_eq!(ledger.len(), 1);

        let attempts = ledger.attempts();
        assert_eq!(attempts.len(), 2);
        assert!(matches!(attempts[0].result, SubmissionResult::Accepted { .. }));
        assert!(matches!(attempts[1].result, SubmissionResult::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_submission_rejects_tampered_proof_and_blank_submitter() {
        let ledger = ledger();
        let (action, mut proof) = proved("agent_1", "tampered").await;

        assert!(matches!(
            ledger.submit(&action, &proof, "  ").await,
            Err(AgentLogError::Submission { .. })
        ));

        proof.nonce = "forged".to_string();
        assert!(matches!(
            ledger.submit(&action, &proof, "addr_1").await,
            Err(AgentLogError::Submission { .. })
        ));
        assert!(ledger.is_empty());
        assert_eq!(ledger.attempts().len(), 2);
    }

    #[tokio::test]
    async fn test_submission_rejects_foreign_chain() {
        let ledger = InMemoryLedger::new(
            LedgerConfig {
                chain_id: "agentlog-mainnet".to_string(),
                ..LedgerConfig::default()
            },
            attestor(),
        );
        let (action, proof) = proved("agent_1", "wrong chain").await;

        match ledger.submit(&action, &proof, "addr_1").await {
            Err(AgentLogError::Submission { reason }) => assert!(reason.contains("chain")),
            other => panic!("expected Submission, got {:?}", other),
        }
    }

    /// A valid proof for one action cannot be replayed with another.
    #[tokio::test]
    async fn test_proof_for_another_action_rejected() {
        let ledger = ledger();
        let mut visit = Action::create(
            AgentId::new("agent_1"),
            ActionType::LocationVisit,
            ActionMetadata::described("Site visit").with_location(Location {
                latitude: 37.7749,
                longitude: -122.4194,
                address: None,
            }),
        )
        .unwrap();
        let visit_proof = HashProofGenerator::new(ProofConfig::default())
            .generate(&visit)
            .await
            .unwrap();
        visit.attach_proof(visit_proof.clone()).unwrap();
        let (task, task_proof) = proved("agent_2", "Closed ticket").await;

        match ledger.submit(&task, &visit_proof, "addr_2").await {
            Err(AgentLogError::Submission { reason }) => {
                assert!(reason.contains("not generated for action"))
            }
            other => panic!("expected Submission, got {:?}", other),
        }
        assert!(ledger.is_empty());
        assert!(!ledger.verify(&visit_proof).await);

        let mut edited = task.clone();
        edited.metadata.description = "Closed every ticket".to_string();
        assert!(matches!(
            ledger.submit(&edited, &task_proof, "addr_2").await,
            Err(AgentLogError::Submission { .. })
        ));

        ledger.submit(&task, &task_proof, "addr_2").await.unwrap();
        ledger.submit(&visit, &visit_proof, "addr_1").await.unwrap();
        assert!(ledger.verify(&task_proof).await);
        assert!(ledger.verify(&visit_proof).await);
    }

    /// An entry whose stored action no longer matches its proof stops
    /// verifying even if the chain were rehashed around it.
    #[tokio::test]
    async fn test_check_rederives_inputs_from_stored_action() {
        let ledger = ledger();
        let (action, proof) = proved("agent_1", "Sent email").await;
        let reference = ledger.submit(&action, &proof, "addr_1").await.unwrap();

        ledger.corrupt_entry(&reference, |record| {
            record.action.agent_id = AgentId::new("agent_9");
        });
        {
            let mut state = ledger.state.lock().unwrap();
            let entry = &mut state.entries[0];
            entry.this_hash = crate::hash_entry(
                &ledger.config().chain_id,
                entry.sequence,
                &entry.record,
                &entry.prev_hash,
            );
            entry.reference = LedgerEntry::reference_for(&entry.this_hash);
        }
        assert!(ledger.verify_integrity(), "chain was rehashed consistently");
        assert!(!ledger.check(&proof).await.unwrap());
    }

    #[tokio::test]
    async fn test_disconnected_ledger_refuses_submissions() {
        let ledger = ledger();
        ledger.set_connected(false);
        let (action, proof) = proved("agent_1", "offline").await;

        assert!(!ledger.is_connected());
        assert!(matches!(
            ledger.submit(&action, &proof, "addr_1").await,
            Err(AgentLogError::Submission { .. })
        ));
        assert!(ledger.attempts().is_empty(), "nothing reached the ledger");

        ledger.set_connected(true);
        assert!(ledger.submit(&action, &proof, "addr_1").await.is_ok());
    }

    #[tokio::test]
    async fn test_slow_transport_times_out() {
        let ledger = InMemoryLedger::new(
            LedgerConfig {
                latency_ms: 200,
                timeout_ms: 10,
                ..LedgerConfig::default()
            },
            attestor(),
        );
        let (action, proof) = proved("agent_1", "slow").await;

        match ledger.submit(&action, &proof, "addr_1").await {
            Err(AgentLogError::Submission { reason }) => assert!(reason.contains("timed out")),
            other => panic!("expected Submission, got {:?}", other),
        }
        assert!(matches!(
            ledger.check(&proof).await,
            Err(AgentLogError::LedgerUnreachable { .. })
        ));
        assert!(!ledger.verify(&proof).await);
    }

    // ── Verification ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_accepted_proof_verifies() {
        let ledger = ledger();
        let (action, proof) = proved("agent_1", "verify me").await;
        ledger.submit(&action, &proof, "addr_1").await.unwrap();

        assert!(ledger.check(&proof).await.unwrap());
        assert!(ledger.verify(&proof).await);
    }

    #[tokio::test]
    async fn test_unknown_proof_does_not_verify() {
        let ledger = ledger();
        let (_, proof) = proved("agent_1", "never submitted").await;

        assert!(!ledger.check(&proof).await.unwrap());
    }

    #[tokio::test]
    async fn test_removed_entry_fails_verification() {
        let ledger = ledger();
        let (a, pa) = proved("agent_1", "a").await;
        let (b, pb) = proved("agent_1", "b").await;
        let ra = ledger.submit(&a, &pa, "addr_1").await.unwrap();
        ledger.submit(&b, &pb, "addr_1").await.unwrap();

        assert!(ledger.remove_entry(&ra));
        assert!(!ledger.verify(&pa).await, "removed proof must not verify");
        assert!(!ledger.verify(&pb).await, "successor's link is broken");
        assert!(!ledger.verify_integrity());
    }

    #[tokio::test]
    async fn test_corrupted_entry_fails_verification() {
        let ledger = ledger();
        let (action, proof) = proved("agent_1", "original").await;
        let reference = ledger.submit(&action, &proof, "addr_1").await.unwrap();

        assert!(ledger.corrupt_entry(&reference, |record| {
            record.submitted_by = "addr_mallory".to_string();
        }));

        assert!(!ledger.verify(&proof).await);
        assert!(!ledger.verify_integrity());
    }

    #[tokio::test]
    async fn test_unreachable_ledger_check_is_an_error() {
        let ledger = ledger();
        let (action, proof) = proved("agent_1", "reachability").await;
        ledger.submit(&action, &proof, "addr_1").await.unwrap();

        ledger.set_reachable(false);
        assert!(matches!(
            ledger.check(&proof).await,
            Err(AgentLogError::LedgerUnreachable { .. })
        ));
        assert!(!ledger.verify(&proof).await, "verify fails closed");
        assert!(ledger.query("agent_1").await.is_unreachable());

        ledger.set_reachable(true);
        assert!(ledger.verify(&proof).await);
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_query_returns_agent_actions_in_submission_order() {
        let ledger = ledger();
        for (agent, description) in [("agent_1", "one"), ("agent_2", "other"), ("agent_1", "two")] {
            let (action, proof) = proved(agent, description).await;
            ledger.submit(&action, &proof, "addr_1").await.unwrap();
        }

        let found = ledger.query("agent_1").await;
        let actions = found.actions();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].metadata.description, "one");
        assert_eq!(actions[1].metadata.description, "two");
        assert!(actions.iter().all(|a| a.status() == ActionStatus::Completed));
        assert!(actions.iter().all(|a| a.ledger_reference().is_some()));

        assert!(ledger.query("nobody").await.actions().is_empty());
        assert!(!ledger.query("nobody").await.is_unreachable());
    }

    #[tokio::test]
    async fn test_find_by_reference() {
        let ledger = ledger();
        let (action, proof) = proved("agent_1", "findable").await;
        let reference = ledger.submit(&action, &proof, "addr_1").await.unwrap();

        let found = ledger.find(&reference).await.unwrap().unwrap();
        assert_eq!(found.id(), action.id());
        assert_eq!(found.ledger_reference(), Some(&reference));

        ledger.remove_entry(&reference);
        assert!(ledger.find(&reference).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_reports_flags_and_size() {
        let ledger = ledger();
        let (action, proof) = proved("agent_1", "counted").await;
        ledger.submit(&action, &proof, "addr_1").await.unwrap();
        ledger.set_reachable(false);

        let status = ledger.status().await;
        assert!(status.connected);
        assert!(!status.reachable);
        assert_eq!(status.entry_count, 1);
        assert_eq!(status.endpoint, "memory://local");
    }

    #[test]
    fn test_empty_ledger_is_valid() {
        let ledger = ledger();
        assert!(ledger.verify_integrity());
        assert!(ledger.export_log().terminal_hash.is_empty());
    }
}
