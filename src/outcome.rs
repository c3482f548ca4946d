// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Result of one pipeline run, and reconciliation of pre-executed results.

use crate::log_entry::LogEntry;
use crate::state::{StateValue, WriteSet};
use crate::types::RecordTime;

/// Log entry plus the writes to apply atomically with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitOutcome {
    pub log_entry: LogEntry,
    /// Always empty for rejections.
    pub writes: WriteSet,
    /// Set only when an accepted entry was pre-executed.
    pub out_of_time_bounds: Option<LogEntry>,
}

impl CommitOutcome {
    /// True while the entry still waits for its record time.
    pub fn is_pre_executed(&self) -> bool {
        !self.log_entry.is_final()
    }

    /// Resolves a pre-executed outcome once the real record time is known.
    ///
    /// - `within_bounds`: stamp `record_time` into the entry and the dedup
    ///   marker, keep the writes.
    /// - otherwise: substitute the stashed out-of-time-bounds entry and drop
    ///   every write. A pre-executed rejection has no fallback and is only
    ///   stamped.
    ///
    /// Outcomes that are already final are returned unchanged.
    pub fn finalize(self, record_time: RecordTime, within_bounds: bool) -> CommitOutcome {
        if !self.is_pre_executed() {
            return self;
        }

        if !within_bounds {
            if let Some(fallback) = self.out_of_time_bounds {
                tracing::info!(
                    "Pre-executed submission {} expired; committing out-of-time-bounds entry",
                    fallback.submission_id()
                );
                return CommitOutcome {
                    log_entry: fallback,
                    writes: WriteSet::new(),
                    out_of_time_bounds: None,
                };
            }
        }

        let writes = self
            .writes
            .into_iter()
            .map(|(key, value)| match value {
                StateValue::SubmissionDedup { record_time: None } => (
                    key,
                    StateValue::SubmissionDedup {
                        record_time: Some(record_time),
                    },
                ),
                other => (key, other),
            })
            .collect();

        CommitOutcome {
            log_entry: self.log_entry.with_record_time(record_time),
            writes,
            out_of_time_bounds: None,
        }
    }
}
