//! Hash-chain primitives: entry hashing and integrity verification.
//!
//! Hash input layout (bytes, in order):
//!   1. chain_id as UTF-8 bytes
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. canonical JSON of the submission record

use sha2::{Digest, Sha256};

use agentlog_contracts::ledger::SubmissionRecord;

use crate::entry::LedgerEntry;

/// Compute the SHA-256 hash of one ledger entry.
///
/// Returns a lowercase 64-character hex string.
pub fn hash_entry(
    chain_id: &str,
    sequence: u64,
    record: &SubmissionRecord,
    prev_hash: &str,
) -> String {
    // Records only contain string-keyed maps; serialization cannot fail in
    // practice, and an empty body still yields a deterministic hash.
    let record_json = serde_json::to_vec(record).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(chain_id.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&record_json);

    hex::encode(hasher.finalize())
}

/// Verify the entry at `index`: its hash recomputes and it links to its
/// predecessor (or to genesis).
pub fn verify_entry(chain_id: &str, entries: &[LedgerEntry], index: usize) -> bool {
    let Some(entry) = entries.get(index) else {
        return false;
    };

    let expected_prev = match index {
        0 => LedgerEntry::GENESIS_HASH,
        i => entries[i - 1].this_hash.as_str(),
    };
    if entry.prev_hash != expected_prev {
        return false;
    }

    let recomputed = hash_entry(chain_id, entry.sequence, &entry.record, &entry.prev_hash);
    entry.this_hash == recomputed && entry.reference == LedgerEntry::reference_for(&recomputed)
}

/// Verify the integrity of an entire chain.
///
/// Returns `false` on the first broken link or mismatched hash. An empty
/// chain is valid.
pub fn verify_chain(chain_id: &str, entries: &[LedgerEntry]) -> bool {
    (0..entries.len()).all(|i| verify_entry(chain_id, entries, i))
}
