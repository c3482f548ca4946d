// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Ledger state contract and the per-submission commit context.

pub mod key;
pub mod memory;
pub mod context;

use std::collections::BTreeMap;

use crate::error::KernelResult;

pub use context::CommitContext;
pub use key::{StateKey, StateValue};
pub use memory::MemoryLedgerState;

/// Ordered write set. Key order fixes application order on every replica.
pub type WriteSet = BTreeMap<StateKey, StateValue>;

/// Key/value view over committed ledger state.
///
/// Implementations own whatever locking the physical store needs; the
/// pipeline only ever holds a shared borrow for the length of one run.
pub trait LedgerState {
    fn get(&self, key: &StateKey) -> KernelResult<Option<StateValue>>;

    /// Applies the whole write set or nothing.
    fn apply(&mut self, writes: WriteSet) -> KernelResult<()>;

    fn contains(&self, key: &StateKey) -> KernelResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
