// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod config;
pub mod errors;
pub mod telemetry;
pub mod engine;
pub mod preloader;
pub mod events;
pub mod storage;

pub use events::{CommitReceipt, Committer};
