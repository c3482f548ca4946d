// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use thiserror::Error;
use upload_kernel::error::KernelError;

use crate::events::entry_log::EventLogError;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),
    #[error("Event log error: {0}")]
    EventLog(#[from] EventLogError),
    #[error("Preloader failed to start: {0}")]
    PreloaderSpawn(std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type NodeResult<T> = std::result::Result<T, NodeError>;

/// Failures inside the execution engine. Never leave the preloader.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Failed to decode archive: {0}")]
    Decode(String),
    #[error("Failed to preload package: {0}")]
    Preload(String),
}
