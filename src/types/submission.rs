// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Package upload submission.

use serde::{Deserialize, Serialize};

use crate::types::archive::Archive;
use crate::types::id::{ParticipantId, SubmissionId};

/// A request to upload one or more archives.
///
/// Steps receive the submission by value and hand a (possibly trimmed) copy
/// to the next step, so the caller's original is never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub submission_id: SubmissionId,
    pub participant_id: ParticipantId,
    pub archives: Vec<Archive>,
}

impl Submission {
    pub fn new(
        submission_id: impl Into<SubmissionId>,
        participant_id: impl Into<ParticipantId>,
        archives: Vec<Archive>,
    ) -> Self {
        Self {
            submission_id: submission_id.into(),
            participant_id: participant_id.into(),
            archives,
        }
    }

    pub fn with_archives(self, archives: Vec<Archive>) -> Self {
        Self { archives, ..self }
    }
}
