// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Log-entry construction.
//!
//! Pure functions of their arguments. A `None` record time yields a fully
//! formed entry that the caller stamps later with
//! [`LogEntry::with_record_time`](super::LogEntry::with_record_time).

use crate::config::OUT_OF_TIME_BOUNDS_DETAILS;
use crate::log_entry::{
    LogEntry, OutOfTimeBoundsEntry, PackageUploadAccepted, PackageUploadRejected,
    RejectionReason,
};
use crate::types::{ArchiveHash, ParticipantId, RecordTime, SubmissionId};

pub fn build_accepted(
    submission_id: &SubmissionId,
    participant_id: &ParticipantId,
    archive_hashes: Vec<ArchiveHash>,
    record_time: Option<RecordTime>,
) -> LogEntry {
    LogEntry::Accepted(PackageUploadAccepted {
        submission_id: submission_id.clone(),
        participant_id: participant_id.clone(),
        archive_hashes,
        record_time,
    })
}

pub fn build_rejection(
    reason: RejectionReason,
    submission_id: &SubmissionId,
    participant_id: &ParticipantId,
    details: String,
    record_time: Option<RecordTime>,
) -> LogEntry {
    tracing::debug!(
        "Rejecting submission {} from {}: {} ({})",
        submission_id,
        participant_id,
        reason.as_str(),
        details
    );
    LogEntry::Rejected(PackageUploadRejected {
        submission_id: submission_id.clone(),
        participant_id: participant_id.clone(),
        reason,
        details,
        record_time,
    })
}

pub fn build_out_of_time_bounds(
    submission_id: &SubmissionId,
    participant_id: &ParticipantId,
) -> LogEntry {
    LogEntry::OutOfTimeBounds(OutOfTimeBoundsEntry {
        submission_id: submission_id.clone(),
        participant_id: participant_id.clone(),
        details: OUT_OF_TIME_BOUNDS_DETAILS.to_string(),
    })
}
