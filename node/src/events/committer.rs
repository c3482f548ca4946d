// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Committer - The Safety Wall
//!
//! The only way a submission reaches ledger state:
//! 1. Deterministic pipeline produces entry + write set
//! 2. Entry persisted to the entry log (fsync)
//! 3. Entry buffered in the journal
//! 4. Write set applied atomically
//! 5. Journal commit boundary
//!
//! If the apply fails the buffer is rolled back and the error is returned;
//! the entry already on disk makes the inconsistency visible at restart.

use std::sync::Arc;

use serde::Serialize;
use upload_kernel::log_entry::LogEntry;
use upload_kernel::outcome::CommitOutcome;
use upload_kernel::pipeline::PackageCommitter;
use upload_kernel::state::{LedgerState, StateKey};
use upload_kernel::types::{ParticipantId, RecordTime, Submission};
use upload_kernel::verify::{hash_hex, outcome_hash};

use crate::config::NodeConfig;
use crate::engine::ExecutionEngine;
use crate::errors::{NodeError, NodeResult};
use crate::events::entry_journal::EntryJournal;
use crate::events::entry_log::LogEntryWriter;
use crate::preloader::{BackgroundPreloader, PreloadCounts};

/// What the caller gets back for one committed submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommitReceipt {
    pub submission_id: String,
    pub entry_type: &'static str,
    pub rejection_reason: Option<&'static str>,
    pub archives_written: usize,
    /// Hex BLAKE3 of entry + write set; equal on every replica.
    pub outcome_hash: String,
    /// Committed journal height after this entry.
    pub height: u64,
    #[serde(skip)]
    pub log_entry: LogEntry,
}

impl CommitReceipt {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

pub struct Committer<S: LedgerState> {
    pipeline: PackageCommitter,
    preloader: Arc<BackgroundPreloader>,
    state: S,
    entry_log: Option<LogEntryWriter>,
    journal: EntryJournal,
}

impl<S: LedgerState> Committer<S> {
    /// Spawns the preloader and opens the entry log named in `cfg`, if any.
    /// Entries already in the log seed the journal.
    ///
    /// `state` must already reflect the log: every accepted entry on disk
    /// needs its dedup marker in `state`, or the node refuses to start.
    pub fn new(state: S, engine: Arc<dyn ExecutionEngine>, cfg: &NodeConfig) -> NodeResult<Self> {
        let (entry_log, journal) = match &cfg.log_path {
            Some(path) => {
                let (writer, existing) = LogEntryWriter::recover(path)?;
                check_state_covers_log(&state, &existing)?;
                tracing::info!(
                    "Entry log at {:?} opened with {} existing entries",
                    path,
                    existing.len()
                );
                (Some(writer), EntryJournal::from_committed(existing))
            }
            None => (None, EntryJournal::new()),
        };

        let preloader = Arc::new(BackgroundPreloader::spawn(engine).map_err(NodeError::PreloaderSpawn)?);

        Ok(Self {
            pipeline: PackageCommitter::new(preloader.clone()),
            preloader,
            state,
            entry_log,
            journal,
        })
    }

    /// Runs and commits one submission at `record_time`.
    pub fn submit(
        &mut self,
        authenticated: &ParticipantId,
        submission: Submission,
        record_time: RecordTime,
    ) -> NodeResult<CommitReceipt> {
        let outcome = self.pipeline.commit(
            &self.state,
            authenticated.clone(),
            Some(record_time),
            submission,
        )?;
        self.commit_outcome(outcome)
    }

    /// Speculative run with no record time. State is untouched; the result
    /// goes back through [`Committer::commit_pre_executed`].
    pub fn pre_execute(
        &self,
        authenticated: &ParticipantId,
        submission: Submission,
    ) -> NodeResult<CommitOutcome> {
        Ok(self
            .pipeline
            .commit(&self.state, authenticated.clone(), None, submission)?)
    }

    /// Finalizes a pre-executed outcome and commits whichever entry wins.
    pub fn commit_pre_executed(
        &mut self,
        outcome: CommitOutcome,
        record_time: RecordTime,
        within_bounds: bool,
    ) -> NodeResult<CommitReceipt> {
        self.commit_outcome(outcome.finalize(record_time, within_bounds))
    }

    fn commit_outcome(&mut self, outcome: CommitOutcome) -> NodeResult<CommitReceipt> {
        let hash = outcome_hash(&outcome)?;
        let CommitOutcome {
            log_entry, writes, ..
        } = outcome;
        let archives_written = writes
            .keys()
            .filter(|k| matches!(k, StateKey::Archive(_)))
            .count();

        // Step 1: Persist FIRST
        if let Some(log) = self.entry_log.as_mut() {
            log.append(&log_entry)?;
        }

        // Step 2: Buffer
        self.journal.append_buffered(log_entry.clone());

        // Step 3: Apply writes
        if let Err(e) = self.state.apply(writes) {
            tracing::error!(
                "CRITICAL: entry for submission {} logged but state apply failed: {}",
                log_entry.submission_id(),
                e
            );
            self.journal.rollback_buffer();
            return Err(e.into());
        }

        // Step 4: COMMIT BOUNDARY
        self.journal.commit_buffer();

        let outcome_label = match log_entry.rejection_reason() {
            Some(reason) => reason.as_str(),
            None => log_entry.entry_type(),
        };
        metrics::counter!("upload_submissions_total", 1, "outcome" => outcome_label);
        metrics::counter!("upload_archives_written_total", archives_written as u64);
        tracing::info!(
            "Committed {} for submission {} ({} archives written)",
            outcome_label,
            log_entry.submission_id(),
            archives_written
        );

        Ok(CommitReceipt {
            submission_id: log_entry.submission_id().to_string(),
            entry_type: log_entry.entry_type(),
            rejection_reason: log_entry.rejection_reason().map(|r| r.as_str()),
            archives_written,
            outcome_hash: hash_hex(&hash),
            height: self.journal.committed_height(),
            log_entry,
        })
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Hands the ledger state back, e.g. to reopen the log against it.
    pub fn into_state(self) -> S {
        self.state
    }

    pub fn journal(&self) -> &EntryJournal {
        &self.journal
    }

    pub fn preloader_stats(&self) -> PreloadCounts {
        self.preloader.stats()
    }

    pub fn entry_log(&self) -> Option<&LogEntryWriter> {
        self.entry_log.as_ref()
    }
}

/// A log replayed against state that never saw it would forget which
/// submissions were already accepted.
fn check_state_covers_log<S: LedgerState>(state: &S, entries: &[LogEntry]) -> NodeResult<()> {
    for (index, entry) in entries.iter().enumerate() {
        if !entry.is_accepted() {
            continue;
        }
        let marker = StateKey::dedup(entry.participant_id(), entry.submission_id());
        if !state.contains(&marker)? {
            tracing::error!(
                "Entry #{} (submission {} of {}) is in the log but not in ledger state",
                index,
                entry.submission_id(),
                entry.participant_id()
            );
            return Err(NodeError::Config(format!(
                "ledger state does not match entry log: accepted submission {} of participant {} \
                 (entry #{} of {}) has no dedup marker; restore ledger state before reopening the log",
                entry.submission_id(),
                entry.participant_id(),
                index,
                entries.len()
            )));
        }
    }
    Ok(())
}
