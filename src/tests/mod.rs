pub mod pipeline_tests;
pub mod outcome_tests;
pub mod determinism_tests;

use std::sync::{Arc, Mutex};

use crate::pipeline::{PackageCommitter, PreloadSink};
use crate::state::{LedgerState, MemoryLedgerState};
use crate::types::{Archive, RecordTime, Submission};
use crate::LogEntry;

/// A simple deterministic RNG for tests.
pub struct Pcg32 {
    state: u64,
    inc: u64,
}

impl Pcg32 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed, inc: 1 }
    }

    pub fn next_u32(&mut self) -> u32 {
        let oldstate = self.state;
        self.state = oldstate.wrapping_mul(6364136223846793005).wrapping_add(self.inc);
        let xorshifted = (((oldstate >> 18) ^ oldstate) >> 27) as u32;
        let rot = (oldstate >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    pub fn below(&mut self, n: u32) -> u32 {
        self.next_u32() % n
    }
}

/// Sink that remembers every batch it was handed.
#[derive(Default)]
pub struct RecordingPreload {
    pub batches: Mutex<Vec<Vec<Archive>>>,
}

impl RecordingPreload {
    pub fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    pub fn hashes(&self) -> Vec<Vec<String>> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .map(|b| b.iter().map(|a| a.hash.0.clone()).collect())
            .collect()
    }
}

impl PreloadSink for RecordingPreload {
    fn enqueue(&self, archives: Vec<Archive>) {
        self.batches.lock().unwrap().push(archives);
    }
}

pub fn recording_committer() -> (PackageCommitter, Arc<RecordingPreload>) {
    let sink = Arc::new(RecordingPreload::default());
    (PackageCommitter::new(sink.clone()), sink)
}

pub fn archive(hash: &str, payload: &[u8]) -> Archive {
    Archive::new(hash, payload.to_vec())
}

/// Runs a final (non-speculative) commit and applies its writes.
pub fn submit(
    committer: &PackageCommitter,
    state: &mut MemoryLedgerState,
    authenticated: &str,
    submission: Submission,
    record_time: i64,
) -> LogEntry {
    let outcome = committer
        .commit(&*state, authenticated.into(), Some(RecordTime(record_time)), submission)
        .unwrap();
    state.apply(outcome.writes).unwrap();
    outcome.log_entry
}
