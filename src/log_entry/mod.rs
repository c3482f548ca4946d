// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Log Entries as the Pipeline's Only Output
//!
//! Every pipeline run ends in exactly one `LogEntry`. It is built once,
//! never mutated, and appended to the ledger's log together with the
//! run's write set.
//!
//! # Determinism Guarantees
//! - No wall-clock reads: record time comes from the commit context
//! - Canonical bincode encoding: same entry => same bytes on every replica
//! - Rejection details are built from input data only

pub mod builder;

use serde::{Deserialize, Serialize};

use crate::error::KernelResult;
use crate::state::key::{decode, encode};
use crate::types::{ArchiveHash, ParticipantId, RecordTime, SubmissionId};

pub use builder::{build_accepted, build_out_of_time_bounds, build_rejection};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    NotAuthorized,
    InvalidPackage,
    DuplicateSubmission,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::NotAuthorized => "NotAuthorized",
            RejectionReason::InvalidPackage => "InvalidPackage",
            RejectionReason::DuplicateSubmission => "DuplicateSubmission",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageUploadAccepted {
    pub submission_id: SubmissionId,
    pub participant_id: ParticipantId,
    /// Hashes of the archives written by this submission, in submission order.
    pub archive_hashes: Vec<ArchiveHash>,
    pub record_time: Option<RecordTime>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageUploadRejected {
    pub submission_id: SubmissionId,
    pub participant_id: ParticipantId,
    pub reason: RejectionReason,
    pub details: String,
    pub record_time: Option<RecordTime>,
}

/// Fallback for a pre-executed submission whose result expired.
/// Never carries a record time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutOfTimeBoundsEntry {
    pub submission_id: SubmissionId,
    pub participant_id: ParticipantId,
    pub details: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogEntry {
    Accepted(PackageUploadAccepted),
    Rejected(PackageUploadRejected),
    OutOfTimeBounds(OutOfTimeBoundsEntry),
}

impl LogEntry {
    pub fn entry_type(&self) -> &'static str {
        match self {
            LogEntry::Accepted(_) => "PackageUploadAccepted",
            LogEntry::Rejected(_) => "PackageUploadRejected",
            LogEntry::OutOfTimeBounds(_) => "OutOfTimeBounds",
        }
    }

    pub fn submission_id(&self) -> &SubmissionId {
        match self {
            LogEntry::Accepted(e) => &e.submission_id,
            LogEntry::Rejected(e) => &e.submission_id,
            LogEntry::OutOfTimeBounds(e) => &e.submission_id,
        }
    }

    pub fn participant_id(&self) -> &ParticipantId {
        match self {
            LogEntry::Accepted(e) => &e.participant_id,
            LogEntry::Rejected(e) => &e.participant_id,
            LogEntry::OutOfTimeBounds(e) => &e.participant_id,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, LogEntry::Accepted(_))
    }

    pub fn rejection_reason(&self) -> Option<RejectionReason> {
        match self {
            LogEntry::Rejected(e) => Some(e.reason),
            _ => None,
        }
    }

    pub fn record_time(&self) -> Option<RecordTime> {
        match self {
            LogEntry::Accepted(e) => e.record_time,
            LogEntry::Rejected(e) => e.record_time,
            LogEntry::OutOfTimeBounds(_) => None,
        }
    }

    /// Supplies the real record time to an entry built during pre-execution.
    /// Out-of-time-bounds entries are returned unchanged.
    pub fn with_record_time(self, record_time: RecordTime) -> Self {
        match self {
            LogEntry::Accepted(e) => LogEntry::Accepted(PackageUploadAccepted {
                record_time: Some(record_time),
                ..e
            }),
            LogEntry::Rejected(e) => LogEntry::Rejected(PackageUploadRejected {
                record_time: Some(record_time),
                ..e
            }),
            other => other,
        }
    }

    /// An entry is final once it carries a record time. The out-of-time-bounds
    /// fallback is final as built.
    pub fn is_final(&self) -> bool {
        match self {
            LogEntry::OutOfTimeBounds(_) => true,
            _ => self.record_time().is_some(),
        }
    }

    pub fn encode(&self) -> KernelResult<Vec<u8>> {
        encode(self)
    }

    pub fn decode(bytes: &[u8]) -> KernelResult<Self> {
        decode(bytes)
    }

    /// BLAKE3 hash of the canonical encoding.
    pub fn entry_hash(&self) -> KernelResult<[u8; 32]> {
        Ok(*blake3::hash(&self.encode()?).as_bytes())
    }
}
