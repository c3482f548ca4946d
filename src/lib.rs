// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! upload-kernel: the deterministic commit pipeline for package uploads.
//!
//! Every replica that feeds the same submission and the same prior ledger
//! state through [`pipeline::PackageCommitter`] produces a byte-identical
//! [`log_entry::LogEntry`] and write set. The only non-deterministic seam is
//! [`pipeline::PreloadSink`], which is fire-and-forget and never feeds back.

pub mod config;
pub mod error;
pub mod types;
pub mod state;
pub mod log_entry;
pub mod pipeline;
pub mod outcome;
pub mod verify;

pub use error::{KernelError, KernelResult};
pub use log_entry::{LogEntry, RejectionReason};
pub use outcome::CommitOutcome;
pub use pipeline::{PackageCommitter, PreloadSink, StepResult};
pub use state::{CommitContext, LedgerState, MemoryLedgerState, StateKey, StateValue};
pub use types::{Archive, ArchiveHash, ParticipantId, RecordTime, Submission, SubmissionId};

#[cfg(test)]
pub mod tests;
