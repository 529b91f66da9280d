//! # agentlog-proof
//!
//! Proof generation for AGENTLOG.
//!
//! This crate provides [`HashProofGenerator`], which implements the
//! [`ProofGenerator`](agentlog_core::traits::ProofGenerator) trait with a
//! SHA-256 commitment scheme:
//!
//! 1. **Public inputs** are hashes of the attested fields (agent id,
//!    timestamp, coordinates, form body). They are fully deterministic.
//! 2. **Artifact** is a commitment over the scheme, chain id, public
//!    inputs, and a fresh random nonce. It differs on every generation.
//!
//! The scheme stands in for a succinct proving system. Anything
//! implementing the same trait can replace it without touching the
//! pipeline.

pub mod binding;
pub mod generator;

pub use binding::{field_digest, hash_hex, seal, verify_binding};
pub use generator::HashProofGenerator;

// ── Tests ─────────────────────────────────────────────────────────────────────
