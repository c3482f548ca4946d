// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Package Commit Pipeline
//!
//! # Protocol
//! ```text
//! Submission
//! ↓
//! 1. authorize_submission     (NotAuthorized)
//! ↓
//! 2. validate_entry           (InvalidPackage)
//! ↓
//! 3. deduplicate_submission   (DuplicateSubmission)
//! ↓
//! 4. enqueue_preload          (side channel, never stops)
//! ↓
//! 5. filter_duplicates        (drops already-known archives)
//! ↓
//! 6. build_log_entry          (writes + accepted entry)
//! ```
//!
//! The first `Stop` ends the run. Writes only happen in step 6, so a
//! rejection can never leave partial state behind.
//!
//! # Invariants
//! - Step order is fixed at construction and cannot be changed
//! - Same submission + same prior state => same log entry and write set
//! - `Err(KernelError)` is a contract violation and is never turned into a rejection

pub mod steps;
pub mod preload;

use std::sync::Arc;

use crate::error::{KernelError, KernelResult};
use crate::log_entry::LogEntry;
use crate::outcome::CommitOutcome;
use crate::state::{CommitContext, LedgerState};
use crate::types::{ParticipantId, RecordTime, Submission};

pub use preload::{NoopPreload, PreloadSink};
pub use steps::{
    AuthorizeSubmission, BuildLogEntry, DeduplicateSubmission, EnqueuePreload, FilterDuplicates,
    ValidateEntry,
};

/// Continue-or-stop control for one step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepResult<T> {
    /// Hand the (possibly transformed) value to the next step.
    Continue(T),
    /// Terminate the whole pipeline with this entry.
    Stop(LogEntry),
}

pub trait Step: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(
        &self,
        ctx: &mut CommitContext<'_>,
        submission: Submission,
    ) -> KernelResult<StepResult<Submission>>;
}

/// Runs the package upload steps in their fixed order.
pub struct PackageCommitter {
    steps: Vec<Box<dyn Step>>,
}

impl PackageCommitter {
    pub fn new(preload: Arc<dyn PreloadSink>) -> Self {
        Self {
            steps: vec![
                Box::new(AuthorizeSubmission),
                Box::new(ValidateEntry),
                Box::new(DeduplicateSubmission),
                Box::new(EnqueuePreload::new(preload)),
                Box::new(FilterDuplicates),
                Box::new(BuildLogEntry),
            ],
        }
    }

    /// Committer with no preloading, for replay and verification.
    pub fn without_preload() -> Self {
        Self::new(Arc::new(NoopPreload))
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Folds the submission through every step, stopping at the first `Stop`.
    pub fn run(
        &self,
        ctx: &mut CommitContext<'_>,
        submission: Submission,
    ) -> KernelResult<LogEntry> {
        let submission_id = submission.submission_id.clone();
        let mut current = submission;

        for step in &self.steps {
            tracing::debug!("Running step {} for submission {}", step.name(), submission_id);
            match step.run(ctx, current)? {
                StepResult::Continue(next) => current = next,
                StepResult::Stop(entry) => {
                    tracing::debug!(
                        "Submission {} stopped at {}: {}",
                        submission_id,
                        step.name(),
                        entry.entry_type()
                    );
                    return Ok(entry);
                }
            }
        }

        tracing::error!("CRITICAL: pipeline exhausted for submission {}", submission_id);
        Err(KernelError::NoLogEntry)
    }

    /// Runs one submission against `reader` and returns the entry plus the
    /// buffered writes. `record_time == None` selects pre-execution mode.
    /// Nothing is applied to `reader`.
    pub fn commit(
        &self,
        reader: &dyn LedgerState,
        participant_id: ParticipantId,
        record_time: Option<RecordTime>,
        submission: Submission,
    ) -> KernelResult<CommitOutcome> {
        let mut ctx = match record_time {
            Some(t) => CommitContext::new(participant_id, t, reader),
            None => CommitContext::pre_execution(participant_id, reader),
        };
        let entry = self.run(&mut ctx, submission)?;
        Ok(ctx.finish(entry))
    }
}
