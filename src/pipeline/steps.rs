// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! The six package upload steps.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::VALIDATION_SEPARATOR;
use crate::error::KernelResult;
use crate::log_entry::{build_accepted, build_out_of_time_bounds, build_rejection, RejectionReason};
use crate::pipeline::preload::PreloadSink;
use crate::pipeline::{Step, StepResult};
use crate::state::{CommitContext, StateKey, StateValue};
use crate::types::Submission;

fn reject(
    ctx: &CommitContext<'_>,
    submission: &Submission,
    reason: RejectionReason,
    details: String,
) -> StepResult<Submission> {
    StepResult::Stop(build_rejection(
        reason,
        &submission.submission_id,
        &submission.participant_id,
        details,
        ctx.record_time(),
    ))
}

/// Rejects unless the declared participant is the one committing.
pub struct AuthorizeSubmission;

impl Step for AuthorizeSubmission {
    fn name(&self) -> &'static str {
        "authorize_submission"
    }

    fn run(
        &self,
        ctx: &mut CommitContext<'_>,
        submission: Submission,
    ) -> KernelResult<StepResult<Submission>> {
        if submission.participant_id == *ctx.participant_id() {
            return Ok(StepResult::Continue(submission));
        }
        let details = format!(
            "Participant {} is not authorized to submit uploads as {}",
            ctx.participant_id(),
            submission.participant_id
        );
        Ok(reject(ctx, &submission, RejectionReason::NotAuthorized, details))
    }
}

/// Rejects empty submissions and archives missing a hash or payload.
/// Every bad archive is reported, not just the first.
pub struct ValidateEntry;

impl Step for ValidateEntry {
    fn name(&self) -> &'static str {
        "validate_entry"
    }

    fn run(
        &self,
        ctx: &mut CommitContext<'_>,
        submission: Submission,
    ) -> KernelResult<StepResult<Submission>> {
        if submission.archives.is_empty() {
            let details = "Submission contains no archives".to_string();
            return Ok(reject(ctx, &submission, RejectionReason::InvalidPackage, details));
        }

        let errors: Vec<String> = submission
            .archives
            .iter()
            .enumerate()
            .filter_map(|(index, archive)| {
                archive.validation_error().map(|problem| {
                    format!("archive #{} (hash '{}'): {}", index, archive.hash, problem)
                })
            })
            .collect();

        if errors.is_empty() {
            return Ok(StepResult::Continue(submission));
        }
        let details = format!("Invalid archives: {}", errors.join(VALIDATION_SEPARATOR));
        Ok(reject(ctx, &submission, RejectionReason::InvalidPackage, details))
    }
}

/// Rejects a submission id this participant has already used.
pub struct DeduplicateSubmission;

impl Step for DeduplicateSubmission {
    fn name(&self) -> &'static str {
        "deduplicate_submission"
    }

    fn run(
        &self,
        ctx: &mut CommitContext<'_>,
        submission: Submission,
    ) -> KernelResult<StepResult<Submission>> {
        let key = StateKey::dedup(&submission.participant_id, &submission.submission_id);
        if !ctx.contains(&key)? {
            return Ok(StepResult::Continue(submission));
        }
        let details = format!(
            "Duplicate submission {} from participant {}",
            submission.submission_id, submission.participant_id
        );
        Ok(reject(ctx, &submission, RejectionReason::DuplicateSubmission, details))
    }
}

/// Hands the archives to the background preloader and always continues.
///
/// Runs before `FilterDuplicates` on purpose: re-uploading a known archive
/// still refreshes the engine cache even though nothing is written.
pub struct EnqueuePreload {
    sink: Arc<dyn PreloadSink>,
}

impl EnqueuePreload {
    pub fn new(sink: Arc<dyn PreloadSink>) -> Self {
        Self { sink }
    }
}

impl Step for EnqueuePreload {
    fn name(&self) -> &'static str {
        "enqueue_preload"
    }

    fn run(
        &self,
        _ctx: &mut CommitContext<'_>,
        submission: Submission,
    ) -> KernelResult<StepResult<Submission>> {
        self.sink.enqueue(submission.archives.clone());
        Ok(StepResult::Continue(submission))
    }
}

/// Drops archives already present in state, and repeats within the
/// submission (first occurrence wins).
pub struct FilterDuplicates;

impl Step for FilterDuplicates {
    fn name(&self) -> &'static str {
        "filter_duplicates"
    }

    fn run(
        &self,
        ctx: &mut CommitContext<'_>,
        submission: Submission,
    ) -> KernelResult<StepResult<Submission>> {
        let total = submission.archives.len();
        let mut seen = BTreeSet::new();
        let mut fresh = Vec::with_capacity(total);

        for archive in submission.archives.iter() {
            if !seen.insert(archive.hash.clone()) {
                continue;
            }
            if ctx.contains(&StateKey::archive(&archive.hash))? {
                continue;
            }
            fresh.push(archive.clone());
        }

        if fresh.len() < total {
            tracing::debug!(
                "Submission {}: dropped {} of {} archives already known",
                submission.submission_id,
                total - fresh.len(),
                total
            );
        }
        Ok(StepResult::Continue(submission.with_archives(fresh)))
    }
}

/// Buffers the archive and dedup writes and stops with the accepted entry.
/// In pre-execution mode also stashes the out-of-time-bounds fallback.
pub struct BuildLogEntry;

impl Step for BuildLogEntry {
    fn name(&self) -> &'static str {
        "build_log_entry"
    }

    fn run(
        &self,
        ctx: &mut CommitContext<'_>,
        submission: Submission,
    ) -> KernelResult<StepResult<Submission>> {
        let Submission {
            submission_id,
            participant_id,
            archives,
        } = submission;
        let record_time = ctx.record_time();

        let mut hashes = Vec::with_capacity(archives.len());
        for archive in archives {
            hashes.push(archive.hash.clone());
            ctx.set(StateKey::archive(&archive.hash), StateValue::Archive(archive));
        }
        ctx.set(
            StateKey::dedup(&participant_id, &submission_id),
            StateValue::SubmissionDedup { record_time },
        );

        if ctx.is_pre_execution() {
            ctx.set_out_of_time_bounds(build_out_of_time_bounds(&submission_id, &participant_id))?;
        }

        let entry = build_accepted(&submission_id, &participant_id, hashes, record_time);
        Ok(StepResult::Stop(entry))
    }
}
