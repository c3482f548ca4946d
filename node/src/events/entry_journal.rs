// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Entry Journal - Runtime State Management
//!
//! Maintains the distinction between:
//! - **committed** = entries whose writes reached ledger state
//! - **buffer** = entry durably logged, writes not yet applied
//!
//! # Flow
//! 1. append_buffered() - entry is on disk
//! 2. state.apply() - writes land
//! 3. commit_buffer() - promote to truth
//! 4. rollback_buffer() - discard if apply failed

use upload_kernel::log_entry::LogEntry;

#[derive(Clone, Debug, Default)]
pub struct EntryJournal {
    committed: Vec<LogEntry>,
    buffer: Vec<LogEntry>,
}

impl EntryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Journal from entries already on disk (restart scenario)
    pub fn from_committed(entries: Vec<LogEntry>) -> Self {
        Self {
            committed: entries,
            buffer: Vec::new(),
        }
    }

    pub fn append_buffered(&mut self, entry: LogEntry) {
        self.buffer.push(entry);
    }

    pub fn commit_buffer(&mut self) {
        self.committed.append(&mut self.buffer);
    }

    pub fn rollback_buffer(&mut self) {
        self.buffer.clear();
    }

    pub fn committed(&self) -> &[LogEntry] {
        &self.committed
    }

    pub fn committed_height(&self) -> u64 {
        self.committed.len() as u64
    }

    pub fn has_pending_buffer(&self) -> bool {
        !self.buffer.is_empty()
    }
}
