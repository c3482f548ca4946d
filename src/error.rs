// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.
//!
//! None of these are rejections. A rejection is a [`crate::LogEntry`]; a
//! `KernelError` means the pipeline contract itself was broken and the
//! replica must not emit anything for the submission.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// Canonical encoding of a key, value or entry failed.
    #[error("Encoding error: {0}")]
    Encoding(String),
    /// Bytes did not decode into the expected canonical type.
    #[error("Decoding error: {0}")]
    Decoding(String),
    /// The out-of-time-bounds slot was written twice in one run.
    #[error("Out-of-time-bounds entry already set for this commit")]
    SlotAlreadySet,
    /// Every step returned `Continue`; the final step must always stop.
    #[error("Pipeline finished without producing a log entry")]
    NoLogEntry,
}

pub type KernelResult<T> = core::result::Result<T, KernelError>;
