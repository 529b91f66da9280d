//! Hash-commitment proof generator.
//!
//! `HashProofGenerator` implements the `ProofGenerator` trait from
//! agentlog-core. It dispatches on the action type:
//!
//! | action type                       | scheme        | required metadata |
//! |-----------------------------------|---------------|-------------------|
//! | task_completion, verification     | `action-v1`   | none              |
//! | location_visit                    | `location-v1` | `location`        |
//! | form_submit                       | `form-v1`     | `form_data`       |
//!
//! With privacy enabled every public input is a name-tagged SHA-256 of the
//! raw field (see `field_digest`) and its name carries a `_hash` suffix.
//! The digests are unsalted so that anyone holding the action can recompute
//! them; they hide values only as well as those values resist guessing.
//! With privacy disabled the raw values are published, which is only meant
//! for debugging.
//!
//! `action-v1` also commits to `task_id` when present and to the canonical
//! JSON of the whole metadata block.

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use agentlog_contracts::{
    action::{Action, ActionType, Location},
    error::{AgentLogError, AgentLogResult},
    proof::{Proof, PublicInputs, SchemeId},
};
use agentlog_core::{config::ProofConfig, traits::ProofGenerator};

use crate::binding::{field_digest, seal, verify_binding};

/// Marker committed by every form proof.
const FORM_COMPLETION_MARKER: &str = "completed";

pub struct HashProofGenerator {
    config: ProofConfig,
}

impl HashProofGenerator {
    pub fn new(config: ProofConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProofConfig {
        &self.config
    }

    fn reveal(&self, inputs: &mut PublicInputs, name: &str, raw: &str) {
        if self.config.enable_privacy {
            inputs.insert(format!("{name}_hash"), field_digest(name, raw));
        } else {
            inputs.insert(name.to_string(), raw.to_string());
        }
    }

    fn identity_inputs(&self, action: &Action) -> PublicInputs {
        let mut inputs = PublicInputs::new();
        self.reveal(&mut inputs, "agent_id", action.agent_id.as_str());
        self.reveal(&mut inputs, "timestamp", &action.timestamp.to_string());
        inputs
    }

    fn action_inputs(&self, action: &Action) -> AgentLogResult<PublicInputs> {
        let metadata_json =
            serde_json::to_string(&action.metadata).map_err(|e| AgentLogError::ProofGeneration {
                reason: format!("metadata could not be serialized: {e}"),
            })?;
        let mut inputs = self.identity_inputs(action);
        self.reveal(&mut inputs, "action_type", action.action_type.as_str());
        self.reveal(&mut inputs, "chain_id", &self.config.chain_id);
        if let Some(task_id) = &action.metadata.task_id {
            self.reveal(&mut inputs, "task_id", task_id);
        }
        self.reveal(&mut inputs, "metadata", &metadata_json);
        Ok(inputs)
    }

    fn location_inputs(&self, action: &Action, location: &Location) -> AgentLogResult<PublicInputs> {
        if !location.latitude.is_finite() || !location.longitude.is_finite() {
            return Err(AgentLogError::ProofGeneration {
                reason: "location coordinates must be finite numbers".to_string(),
            });
        }
        let mut inputs = self.identity_inputs(action);
        self.reveal(&mut inputs, "latitude", &location.latitude.to_string());
        self.reveal(&mut inputs, "longitude", &location.longitude.to_string());
        Ok(inputs)
    }

    fn form_inputs(
        &self,
        action: &Action,
        form: &serde_json::Map<String, serde_json::Value>,
    ) -> AgentLogResult<PublicInputs> {
        let form_json = serde_json::to_string(form).map_err(|e| AgentLogError::ProofGeneration {
            reason: format!("form data could not be serialized: {e}"),
        })?;
        let mut inputs = self.identity_inputs(action);
        self.reveal(&mut inputs, "form", &form_json);
        self.reveal(&mut inputs, "completion", FORM_COMPLETION_MARKER);
        Ok(inputs)
    }
}

#[async_trait]
impl ProofGenerator for HashProofGenerator {
    async fn generate(&self, action: &Action) -> AgentLogResult<Proof> {
        let (scheme_id, public_inputs) = self.public_inputs(action)?;
        let nonce = Uuid::new_v4().to_string();
        let artifact = seal(scheme_id, &self.config.chain_id, &public_inputs, &nonce);

        debug!(
            action_id = %action.id(),
            scheme = %scheme_id,
            privacy = self.config.enable_privacy,
            "proof generated"
        );

        Ok(Proof {
            artifact,
            nonce,
            public_inputs,
            scheme_id,
            chain_id: self.config.chain_id.clone(),
            generated_at: Utc::now(),
        })
    }

    fn public_inputs(&self, action: &Action) -> AgentLogResult<(SchemeId, PublicInputs)> {
        match action.action_type {
            ActionType::LocationVisit => {
                let location = action.metadata.location.as_ref().ok_or_else(|| {
                    AgentLogError::InvalidInput {
                        reason: "location_visit requires metadata.location".to_string(),
                    }
                })?;
                Ok((SchemeId::LocationV1, self.location_inputs(action, location)?))
            }
            ActionType::FormSubmit => {
                let form = action.metadata.form_data.as_ref().ok_or_else(|| {
                    AgentLogError::InvalidInput {
                        reason: "form_submit requires metadata.form_data".to_string(),
                    }
                })?;
                Ok((SchemeId::FormV1, self.form_inputs(action, form)?))
            }
            ActionType::TaskCompletion | ActionType::Verification => {
                Ok((SchemeId::ActionV1, self.action_inputs(action)?))
            }
        }
    }

    fn verify_binding(&self, proof: &Proof) -> bool {
        verify_binding(proof)
    }
}
