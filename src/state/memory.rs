// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! In-memory ledger state.

use std::collections::BTreeMap;

use crate::error::KernelResult;
use crate::state::key::{StateKey, StateValue};
use crate::state::{LedgerState, WriteSet};
use crate::verify::hash_pairs;

/// BTreeMap-backed state. Used by tests, replay and verification tooling.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryLedgerState {
    entries: BTreeMap<StateKey, StateValue>,
}

impl MemoryLedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &StateValue)> {
        self.entries.iter()
    }

    /// BLAKE3 over every canonical key/value pair in key order.
    pub fn state_hash(&self) -> KernelResult<[u8; 32]> {
        let mut hasher = blake3::Hasher::new();
        hash_pairs(&mut hasher, self.entries.len(), self.entries.iter())?;
        Ok(*hasher.finalize().as_bytes())
    }
}

impl LedgerState for MemoryLedgerState {
    fn get(&self, key: &StateKey) -> KernelResult<Option<StateValue>> {
        Ok(self.entries.get(key).cloned())
    }

    fn apply(&mut self, writes: WriteSet) -> KernelResult<()> {
        self.entries.extend(writes);
        Ok(())
    }
}
