//! Proof artifacts attached to actions before submission.
//!
//! A `Proof` binds an action's content to an artifact a verifier can check
//! against `public_inputs`. The format of `artifact` belongs to the scheme
//! named by `scheme_id`; nothing in this crate interprets it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Revealed values a verifier checks the artifact against, keyed by name.
///
/// A `BTreeMap` so that iteration and serialization order are stable.
pub type PublicInputs = BTreeMap<String, String>;

/// Which verification procedure applies to a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeId {
    /// Generic action proof (task completions and verifications).
    #[serde(rename = "action-v1")]
    ActionV1,
    /// Location visit proof over hashed coordinates.
    #[serde(rename = "location-v1")]
    LocationV1,
    /// Form submission proof over the hashed form body.
    #[serde(rename = "form-v1")]
    FormV1,
}

impl SchemeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeId::ActionV1 => "action-v1",
            SchemeId::LocationV1 => "location-v1",
            SchemeId::FormV1 => "form-v1",
        }
    }
}

impl std::fmt::Display for SchemeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An attestation binding an action's content to a verifiable artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Scheme-specific payload (hex for the hash scheme).
    pub artifact: String,
    /// Per-generation randomness mixed into the artifact.
    pub nonce: String,
    /// Deterministic values derived from the action's identity and metadata.
    pub public_inputs: PublicInputs,
    pub scheme_id: SchemeId,
    /// The ledger network the proof was generated for.
    pub chain_id: String,
    pub generated_at: DateTime<Utc>,
}
