// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Seam between the deterministic pipeline and background preloading.

use crate::types::Archive;

/// Fire-and-forget destination for validated archives.
///
/// `enqueue` must not block and must not report failure back: whatever
/// happens to the archives afterwards is invisible to consensus.
pub trait PreloadSink: Send + Sync {
    fn enqueue(&self, archives: Vec<Archive>);
}

/// Drops everything. Used where no execution engine is attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopPreload;

impl PreloadSink for NoopPreload {
    fn enqueue(&self, _archives: Vec<Archive>) {}
}
