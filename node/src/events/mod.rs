// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Log-Entry Persistence and the Commit Barrier
//!
//! # Architecture
//! - Entry log = durable record of every pipeline outcome (append-only)
//! - Journal = runtime view (buffer + committed)
//! - Committer = the only path from a submission to ledger state
//!
//! # Guarantees
//! - Entries are fsync'd before writes are applied
//! - Rejections never touch state
//! - Outcome hashes are identical on every replica

pub mod entry_log;
pub mod entry_journal;
pub mod committer;

pub use committer::{CommitReceipt, Committer};
pub use entry_journal::EntryJournal;
pub use entry_log::{read_log_entries, EventLogError, LogEntryWriter};
