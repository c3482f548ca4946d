// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Ledger-state adapters over host storage.

pub mod slots;

pub use slots::{MemorySlots, Slot, SlotLedgerState, SlotStorage};
