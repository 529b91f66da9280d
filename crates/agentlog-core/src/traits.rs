//! Collaborator contracts for the AGENTLOG pipeline.
//!
//! The pipeline talks to the outside world through exactly two traits:
//!
//! - `ProofGenerator` — produces an attestation for an action
//! - `LedgerClient`   — submits to and queries the tamper-evident log
//!
//! Both are async because real implementations are network- or
//! compute-bound. The pipeline owns them behind `Arc<dyn _>` and never
//! reaches the chain by any other path.

use async_trait::async_trait;
use tracing::{debug, warn};

use agentlog_contracts::{
    action::Action,
    error::AgentLogResult,
    ledger::{LedgerQuery, LedgerReference, LedgerStatus},
    proof::{Proof, PublicInputs, SchemeId},
};

/// Produces a proof bound to an action's content.
///
/// Implementations must derive `public_inputs` deterministically from the
/// action's identity and metadata. The artifact itself may vary between
/// calls.
#[async_trait]
pub trait ProofGenerator: Send + Sync {
    /// Generate a proof for `action`, dispatching on its type.
    ///
    /// Fails with `InvalidInput` when the type's required metadata is
    /// missing, or `ProofGeneration` when the proving primitive fails.
    async fn generate(&self, action: &Action) -> AgentLogResult<Proof>;

    /// The scheme and public inputs `action` must be proven under.
    ///
    /// Deterministic: no nonce, no clock. Fails like `generate` when the
    /// type's required metadata is missing.
    fn public_inputs(&self, action: &Action) -> AgentLogResult<(SchemeId, PublicInputs)>;

    /// Local check that the artifact is consistent with its public inputs.
    ///
    /// Does not consult the ledger.
    fn verify_binding(&self, proof: &Proof) -> bool;

    /// True when `proof` is sealed correctly and was derived from `action`.
    fn attests(&self, proof: &Proof, action: &Action) -> bool {
        if !self.verify_binding(proof) {
            return false;
        }
        match self.public_inputs(action) {
            Ok((scheme_id, inputs)) => scheme_id == proof.scheme_id && inputs == proof.public_inputs,
            Err(e) => {
                debug!(action_id = %action.id(), error = %e, "cannot derive public inputs");
                false
            }
        }
    }
}

/// The tamper-evident log actions are submitted to.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// True when an authenticated session is available for submissions.
    fn is_connected(&self) -> bool;

    /// Submit an action with its proof on behalf of `submitter`.
    ///
    /// Never retries. Any rejection, timeout or transport failure is
    /// returned as `Submission`.
    async fn submit(
        &self,
        action: &Action,
        proof: &Proof,
        submitter: &str,
    ) -> AgentLogResult<LedgerReference>;

    /// Ask the ledger whether it recognizes `proof` as valid.
    ///
    /// `Ok(false)` means the ledger answered "not valid". `Err` means the
    /// question could not be answered.
    async fn check(&self, proof: &Proof) -> AgentLogResult<bool>;

    /// Fail-closed wrapper around `check`: any error is reported as `false`.
    async fn verify(&self, proof: &Proof) -> bool {
        match self.check(proof).await {
            Ok(valid) => valid,
            Err(e) => {
                warn!(error = %e, scheme = %proof.scheme_id, "proof check failed, treating as unverified");
                false
            }
        }
    }

    /// Actions previously submitted for `agent_id`, oldest first.
    async fn query(&self, agent_id: &str) -> LedgerQuery;

    /// Look up the action recorded under `reference`.
    async fn find(&self, reference: &LedgerReference) -> AgentLogResult<Option<Action>>;

    /// Connection and size snapshot.
    async fn status(&self) -> LedgerStatus;
}
