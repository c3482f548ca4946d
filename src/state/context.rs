// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Commit Context
//!
//! One context per pipeline run. It is created at entry, threaded through
//! every step by `&mut`, and consumed by [`CommitContext::finish`]. Nothing
//! else holds it, so no step needs a lock.
//!
//! # Out-of-time-bounds slot
//! Only used in pre-execution mode (no record time). The final step stashes
//! the entry to fall back on if the speculative result has expired by the
//! time the replication layer commits it. Written at most once per run.

use crate::error::{KernelError, KernelResult};
use crate::log_entry::LogEntry;
use crate::outcome::CommitOutcome;
use crate::state::key::{StateKey, StateValue};
use crate::state::{LedgerState, WriteSet};
use crate::types::{ParticipantId, RecordTime};

pub struct CommitContext<'a> {
    participant_id: ParticipantId,
    record_time: Option<RecordTime>,
    reader: &'a dyn LedgerState,
    writes: WriteSet,
    out_of_time_bounds: Option<LogEntry>,
}

impl<'a> CommitContext<'a> {
    /// Context for a final commit at a known record time.
    pub fn new(
        participant_id: ParticipantId,
        record_time: RecordTime,
        reader: &'a dyn LedgerState,
    ) -> Self {
        Self::build(participant_id, Some(record_time), reader)
    }

    /// Context for speculative pre-execution (no record time yet).
    pub fn pre_execution(participant_id: ParticipantId, reader: &'a dyn LedgerState) -> Self {
        Self::build(participant_id, None, reader)
    }

    fn build(
        participant_id: ParticipantId,
        record_time: Option<RecordTime>,
        reader: &'a dyn LedgerState,
    ) -> Self {
        Self {
            participant_id,
            record_time,
            reader,
            writes: WriteSet::new(),
            out_of_time_bounds: None,
        }
    }

    /// Authenticated id of the node performing the commit.
    pub fn participant_id(&self) -> &ParticipantId {
        &self.participant_id
    }

    pub fn record_time(&self) -> Option<RecordTime> {
        self.record_time
    }

    pub fn is_pre_execution(&self) -> bool {
        self.record_time.is_none()
    }

    /// Reads through buffered writes first, then committed state.
    pub fn get(&self, key: &StateKey) -> KernelResult<Option<StateValue>> {
        match self.writes.get(key) {
            Some(value) => Ok(Some(value.clone())),
            None => self.reader.get(key),
        }
    }

    pub fn contains(&self, key: &StateKey) -> KernelResult<bool> {
        Ok(self.writes.contains_key(key) || self.reader.contains(key)?)
    }

    /// Buffers a write. Nothing reaches the ledger until the outcome is applied.
    pub fn set(&mut self, key: StateKey, value: StateValue) {
        self.writes.insert(key, value);
    }

    pub fn pending_writes(&self) -> &WriteSet {
        &self.writes
    }

    pub fn out_of_time_bounds(&self) -> Option<&LogEntry> {
        self.out_of_time_bounds.as_ref()
    }

    pub fn set_out_of_time_bounds(&mut self, entry: LogEntry) -> KernelResult<()> {
        if self.out_of_time_bounds.is_some() {
            return Err(KernelError::SlotAlreadySet);
        }
        self.out_of_time_bounds = Some(entry);
        Ok(())
    }

    /// Consumes the context. A rejection never carries writes.
    pub fn finish(self, log_entry: LogEntry) -> CommitOutcome {
        if log_entry.is_accepted() {
            CommitOutcome {
                log_entry,
                writes: self.writes,
                out_of_time_bounds: self.out_of_time_bounds,
            }
        } else {
            if !self.writes.is_empty() {
                tracing::warn!(
                    "Discarding {} buffered writes for rejected submission {}",
                    self.writes.len(),
                    log_entry.submission_id()
                );
            }
            CommitOutcome {
                log_entry,
                writes: WriteSet::new(),
                out_of_time_bounds: None,
            }
        }
    }
}
