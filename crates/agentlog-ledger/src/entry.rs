//! Ledger entry and export types.
//!
//! `LedgerEntry` is a single accepted submission in the hash chain. It wraps
//! a `SubmissionRecord` with a sequence number and the SHA-256 hashes that
//! make tampering detectable. `LedgerLog` is a snapshot of the whole chain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agentlog_contracts::ledger::{LedgerReference, SubmissionRecord};

/// One accepted submission in the ledger's hash chain.
///
/// Each entry commits to the previous one via `prev_hash`. Modifying any
/// field of the embedded `record` invalidates `this_hash`, and removing an
/// entry breaks the `prev_hash` link of its successor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    /// `tx_` followed by `this_hash`; handed back to the submitter.
    pub reference: LedgerReference,

    /// The submission exactly as it was accepted.
    pub record: SubmissionRecord,

    /// `this_hash` of the previous entry, or `GENESIS_HASH` for the first.
    pub prev_hash: String,

    /// SHA-256 (hex) over (chain_id, sequence, prev_hash, record).
    pub this_hash: String,
}

impl LedgerEntry {
    /// The sentinel `prev_hash` of the first entry in every chain.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";

    pub fn reference_for(hash: &str) -> LedgerReference {
        LedgerReference(format!("tx_{hash}"))
    }
}

/// A snapshot of every entry in a ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerLog {
    pub chain_id: String,

    /// All entries in chain order (sequence 0 first).
    pub entries: Vec<LedgerEntry>,

    pub exported_at: DateTime<Utc>,

    /// `this_hash` of the last entry; empty if the ledger is empty.
    pub terminal_hash: String,
}
