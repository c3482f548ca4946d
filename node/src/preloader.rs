// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Background Preloader
//!
//! Warms the execution engine's package cache off the commit path.
//!
//! # Semantics
//! - One dedicated OS thread per committer, fed by an unbounded queue
//! - `enqueue` never blocks and never reports failure to the caller
//! - Packages the engine already holds are skipped before decoding
//! - Decode/preload failures are logged and counted, then skipped
//! - The thread is detached: it never holds up process exit, and it
//!   exits on its own once every sender is dropped
//!
//! Nothing here is deterministic and nothing here is consensus state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedSender};
use upload_kernel::pipeline::PreloadSink;
use upload_kernel::types::Archive;

use crate::engine::{ExecutionEngine, PackageId};

pub const PRELOADER_THREAD_NAME: &str = "upload-preloader";

#[derive(Default)]
struct PreloaderStats {
    batches: AtomicU64,
    preloaded: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of the preloader counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreloadCounts {
    pub batches: u64,
    pub preloaded: u64,
    pub skipped: u64,
    pub failed: u64,
}

pub struct BackgroundPreloader {
    tx: UnboundedSender<Vec<Archive>>,
    stats: Arc<PreloaderStats>,
}

impl BackgroundPreloader {
    pub fn spawn(engine: Arc<dyn ExecutionEngine>) -> std::io::Result<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<Archive>>();
        let stats = Arc::new(PreloaderStats::default());
        let worker_stats = stats.clone();

        // JoinHandle dropped on purpose: the worker is detached.
        std::thread::Builder::new()
            .name(PRELOADER_THREAD_NAME.to_string())
            .spawn(move || {
                while let Some(batch) = rx.blocking_recv() {
                    preload_batch(engine.as_ref(), &batch, &worker_stats);
                }
                tracing::debug!("Preloader queue closed, worker exiting");
            })?;

        Ok(Self { tx, stats })
    }

    pub fn stats(&self) -> PreloadCounts {
        PreloadCounts {
            batches: self.stats.batches.load(Ordering::Acquire),
            preloaded: self.stats.preloaded.load(Ordering::Relaxed),
            skipped: self.stats.skipped.load(Ordering::Relaxed),
            failed: self.stats.failed.load(Ordering::Relaxed),
        }
    }
}

impl PreloadSink for BackgroundPreloader {
    fn enqueue(&self, archives: Vec<Archive>) {
        if archives.is_empty() {
            return;
        }
        if let Err(e) = self.tx.send(archives) {
            tracing::warn!("Preloader worker gone, dropping {} archives", e.0.len());
        }
    }
}

fn preload_batch(engine: &dyn ExecutionEngine, batch: &[Archive], stats: &PreloaderStats) {
    let mut loaded = engine.loaded_package_ids();

    for archive in batch {
        let id = PackageId::of(archive);
        if loaded.contains(&id) {
            tracing::debug!("Preload: package {} already loaded", id);
            record(&stats.skipped, "skipped");
            continue;
        }

        let package = match engine.decode(archive) {
            Ok(package) => package,
            Err(e) => {
                tracing::warn!("Preload: could not decode archive {}: {}", archive.hash, e);
                record(&stats.failed, "decode_failed");
                continue;
            }
        };

        match engine.preload(id.clone(), package) {
            Ok(()) => {
                tracing::debug!("Preload: package {} from archive {} loaded", id, archive.hash);
                record(&stats.preloaded, "preloaded");
                loaded.insert(id);
            }
            Err(e) => {
                tracing::warn!("Preload: package {} from archive {} failed: {}", id, archive.hash, e);
                record(&stats.failed, "preload_failed");
            }
        }
    }

    // Release pairs with the Acquire in `stats()`: once a batch is counted,
    // its per-archive counters are visible.
    stats.batches.fetch_add(1, Ordering::Release);
}

fn record(counter: &AtomicU64, result: &'static str) {
    counter.fetch_add(1, Ordering::Relaxed);
    metrics::counter!("upload_preload_total", 1, "result" => result);
}

