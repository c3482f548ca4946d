// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Submission data model.

pub mod id;
pub mod archive;
pub mod submission;

pub use archive::Archive;
pub use id::{ArchiveHash, ParticipantId, RecordTime, SubmissionId};
pub use submission::Submission;
