//! Commitment primitives: field hashing and artifact sealing.
//!
//! Artifact input layout (bytes, in order):
//!   1. scheme id as UTF-8 bytes (e.g. "location-v1")
//!   2. chain id as UTF-8 bytes
//!   3. canonical JSON of public inputs (BTreeMap, so keys are sorted)
//!   4. nonce as UTF-8 bytes
//!
//! The nonce changes on every generation, so identical public inputs seal to
//! different artifacts while remaining checkable.

use sha2::{Digest, Sha256};

use agentlog_contracts::proof::{Proof, PublicInputs, SchemeId};

/// Lowercase 64-character hex SHA-256 of `bytes`.
pub fn hash_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(bytes.as_ref()))
}

/// Field separator between a public input's name and its raw value.
const FIELD_SEPARATOR: u8 = 0x1f;

/// Hex SHA-256 of one private field, tagged with the field's name.
///
/// The tag keeps equal raw values in different fields (a latitude equal to
/// a longitude, say) from producing equal digests. It is not a secret: a
/// low-entropy value such as a coordinate can still be recovered by hashing
/// candidates under the same tag.
pub fn field_digest(name: &str, raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update([FIELD_SEPARATOR]);
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compute the artifact committing to a proof's scheme, chain, inputs and nonce.
pub fn seal(scheme: SchemeId, chain_id: &str, inputs: &PublicInputs, nonce: &str) -> String {
    // A map of strings always serializes; an empty vec would simply never
    // match a real artifact.
    let inputs_json = serde_json::to_vec(inputs).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(scheme.as_str().as_bytes());
    hasher.update(chain_id.as_bytes());
    hasher.update(&inputs_json);
    hasher.update(nonce.as_bytes());

    hex::encode(hasher.finalize())
}

/// True when `proof.artifact` is exactly what its own fields seal to.
///
/// Any edit to the public inputs, scheme, chain id or nonce after
/// generation makes this return false.
pub fn verify_binding(proof: &Proof) -> bool {
    seal(proof.scheme_id, &proof.chain_id, &proof.public_inputs, &proof.nonce) == proof.artifact
}
