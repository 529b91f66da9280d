//! # agentlog-contracts
//!
//! Shared types for the AGENTLOG action pipeline.
//!
//! All crates in the workspace import from here. Apart from the action
//! lifecycle rules, no business logic lives in this crate. It holds only
//! data definitions and error types.

pub mod action;
pub mod error;
pub mod ledger;
pub mod proof;

#[cfg(test)]
mod tests {
    use super::*;
    use action::{
        next_timestamp_ms, Action, ActionMetadata, ActionStatus, ActionType, AgentId, Location,
    };
    use error::{AgentLogError, FailureStage};
    use ledger::{LedgerQuery, LedgerReference};

    fn task(agent: &str, description: &str) -> error::AgentLogResult<Action> {
        Action::create(
            AgentId::new(agent),
            ActionType::TaskCompletion,
            ActionMetadata::described(description),
        )
    }

    // ── Action::create ───────────────────────────────────────────────────────

    #[test]
    fn create_starts_pending_without_proof_or_reference() {
        let action = task("agent_1", "Sent email").unwrap();

        assert_eq!(action.status(), ActionStatus::Pending);
        assert!(action.proof().is_none());
        assert!(action.ledger_reference().is_none());
        assert!(action.failure_reason().is_none());
        assert!(action.timestamp > 0);
    }

    #[test]
    fn create_rejects_blank_description() {
        for description in ["", "   ", "\n\t"] {
            match task("agent_1", description) {
                Err(AgentLogError::Validation { reason }) => {
                    assert!(reason.contains("description"), "unexpected reason: {reason}");
                }
                other => panic!("expected Validation, got {:?}", other),
            }
        }
    }

    #[test]
    fn create_rejects_blank_agent_id() {
        match task("  ", "Sent email") {
            Err(AgentLogError::Validation { reason }) => {
                assert!(reason.contains("agent id"), "unexpected reason: {reason}");
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn create_does_not_require_type_specific_fields() {
        // Missing location is the proof generator's concern, not the model's.
        let action = Action::create(
            AgentId::new("agent_1"),
            ActionType::LocationVisit,
            ActionMetadata::described("Visit"),
        )
        .unwrap();
        assert!(action.metadata.location.is_none());
    }

    // ── Status transitions ───────────────────────────────────────────────────

    #[test]
    fn complete_sets_reference_and_is_final() {
        let mut action = task("agent_1", "Sent email").unwrap();
        action.complete(LedgerReference("tx_1".to_string())).unwrap();

        assert_eq!(action.status(), ActionStatus::Completed);
        assert_eq!(action.ledger_reference().unwrap().as_str(), "tx_1");

        // Neither terminal transition is allowed afterwards.
        assert!(matches!(
            action.fail("late failure"),
            Err(AgentLogError::InvalidTransition {
                from: ActionStatus::Completed,
                to: ActionStatus::Failed
            })
        ));
        assert!(action.complete(LedgerReference("tx_2".to_string())).is_err());

        assert_eq!(action.status(), ActionStatus::Completed);
        assert_eq!(action.ledger_reference().unwrap().as_str(), "tx_1");
    }

    #[test]
    fn fail_records_reason_and_is_final() {
        let mut action = task("agent_1", "Sent email").unwrap();
        action.fail("ledger rejected").unwrap();

        assert_eq!(action.status(), ActionStatus::Failed);
        assert_eq!(action.failure_reason(), Some("ledger rejected"));

        assert!(action.complete(LedgerReference("tx_1".to_string())).is_err());
        assert!(action.fail("again").is_err());
        assert_eq!(action.status(), ActionStatus::Failed);
        assert!(action.ledger_reference().is_none());
    }

    // ── Clock and identity ───────────────────────────────────────────────────

    #[test]
    fn timestamps_strictly_increase() {
        let stamps: Vec<u64> = (0..1_000).map(|_| next_timestamp_ms()).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn action_ids_are_unique_for_same_agent() {
        let a = task("agent_2", "same").unwrap();
        let b = task("agent_2", "same").unwrap();
        assert_ne!(a.id(), b.id());
        assert_ne!(a.idempotency_key(), b.idempotency_key());
        assert!(a.id().0.starts_with("agent_2:"));
    }

    #[test]
    fn idempotency_key_is_stable_for_one_action() {
        let action = task("agent_1", "Sent email").unwrap();
        let copy = action.clone();
        assert_eq!(action.idempotency_key(), copy.idempotency_key());
        assert_eq!(action.idempotency_key().len(), 64);
    }

    // ── Serde shape ──────────────────────────────────────────────────────────

    #[test]
    fn action_type_uses_snake_case() {
        let json = serde_json::to_string(&ActionType::LocationVisit).unwrap();
        assert_eq!(json, "\"location_visit\"");
        assert_eq!(
            "form_submit".parse::<ActionType>().unwrap(),
            ActionType::FormSubmit
        );
        assert!("teleport".parse::<ActionType>().is_err());
    }

    #[test]
    fn metadata_omits_absent_optional_fields() {
        let metadata = ActionMetadata::described("Visit").with_location(Location {
            latitude: 37.7749,
            longitude: -122.4194,
            address: None,
        });
        let json = serde_json::to_value(&metadata).unwrap();

        assert_eq!(json["description"], "Visit");
        assert!(json.get("task_id").is_none());
        assert!(json["location"].get("address").is_none());
    }

    // ── LedgerQuery ──────────────────────────────────────────────────────────

    #[test]
    fn unreachable_query_yields_no_actions_but_is_flagged() {
        let query = LedgerQuery::Unreachable { reason: "timeout".to_string() };
        assert!(query.actions().is_empty());
        assert!(query.is_unreachable());

        let empty = LedgerQuery::Found(vec![]);
        assert!(empty.actions().is_empty());
        assert!(!empty.is_unreachable());
    }

    // ── AgentLogError ────────────────────────────────────────────────────────

    #[test]
    fn errors_report_their_stage() {
        let cases = [
            (AgentLogError::NotConnected { reason: "x".into() }, FailureStage::Connection),
            (AgentLogError::Validation { reason: "x".into() }, FailureStage::Creation),
            (AgentLogError::InvalidInput { reason: "x".into() }, FailureStage::Proof),
            (AgentLogError::ProofGeneration { reason: "x".into() }, FailureStage::Proof),
            (AgentLogError::Submission { reason: "x".into() }, FailureStage::Submission),
            (AgentLogError::LedgerUnreachable { reason: "x".into() }, FailureStage::Query),
            (AgentLogError::Config { reason: "x".into() }, FailureStage::Internal),
        ];
        for (err, stage) in cases {
            assert_eq!(err.stage(), stage, "wrong stage for {err}");
        }
    }

    #[test]
    fn error_display_messages() {
        let err = AgentLogError::Submission { reason: "insufficient funds".to_string() };
        let msg = err.to_string();
        assert!(msg.contains("ledger submission failed"));
        assert!(msg.contains("insufficient funds"));

        let err = AgentLogError::InvalidTransition {
            from: ActionStatus::Completed,
            to: ActionStatus::Failed,
        };
        assert_eq!(err.to_string(), "illegal status transition: completed -> failed");
    }
}
