// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Deterministic Hashing and Verification.

use crate::config::OUTCOME_HASH_VERSION;
use crate::error::KernelResult;
use crate::outcome::CommitOutcome;
use crate::state::{StateKey, StateValue};

/// Computes the cryptographic hash of a commit outcome.
///
/// **Scope**: covers exactly what every replica must agree on:
/// - Hash format version
/// - Canonical log-entry bytes
/// - Write set (canonical key/value bytes, key order)
///
/// It explicitly **EXCLUDES** the out-of-time-bounds fallback. That entry
/// is replica-local until the replication layer picks it.
pub fn outcome_hash(outcome: &CommitOutcome) -> KernelResult<[u8; 32]> {
    let mut hasher = blake3::Hasher::new();

    hasher.update(&OUTCOME_HASH_VERSION.to_le_bytes());

    let entry = outcome.log_entry.encode()?;
    hasher.update(&(entry.len() as u32).to_le_bytes());
    hasher.update(&entry);

    hash_pairs(&mut hasher, outcome.writes.len(), outcome.writes.iter())?;

    Ok(*hasher.finalize().as_bytes())
}

/// Length-prefixed canonical key/value bytes. Callers pass pairs in key order.
pub(crate) fn hash_pairs<'a>(
    hasher: &mut blake3::Hasher,
    count: usize,
    pairs: impl Iterator<Item = (&'a StateKey, &'a StateValue)>,
) -> KernelResult<()> {
    hasher.update(&(count as u64).to_le_bytes());
    for (key, value) in pairs {
        let k = key.encode()?;
        let v = value.encode()?;
        hasher.update(&(k.len() as u32).to_le_bytes());
        hasher.update(&k);
        hasher.update(&(v.len() as u32).to_le_bytes());
        hasher.update(&v);
    }
    Ok(())
}

/// Hex rendering for logs and receipts.
pub fn hash_hex(hash: &[u8; 32]) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}
