// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::sync::Arc;

use crate::pipeline::{NoopPreload, PackageCommitter};
use crate::state::{LedgerState, MemoryLedgerState};
use crate::tests::{Pcg32, RecordingPreload};
use crate::types::{Archive, RecordTime, Submission};
use crate::verify::outcome_hash;

fn generate_submission(rng: &mut Pcg32, i: u32) -> (String, Submission) {
    let participants = ["p1", "p2", "p3"];
    let declared = participants[rng.below(3) as usize];
    // Mostly honest, sometimes impersonating.
    let authenticated = if rng.below(10) == 0 { participants[rng.below(3) as usize] } else { declared };
    // Small id space so duplicates happen.
    let submission_id = format!("s{}", rng.below(i + 1));

    let archives = (0..rng.below(4))
        .map(|_| {
            let hash = if rng.below(20) == 0 { String::new() } else { format!("h{}", rng.below(16)) };
            let payload = vec![rng.below(256) as u8; (rng.below(3)) as usize];
            Archive::new(hash, payload)
        })
        .collect();

    (authenticated.to_string(), Submission::new(submission_id, declared, archives))
}

/// Runs a seeded submission stream and returns every outcome hash plus the final state hash.
fn run_simulation(committer: &PackageCommitter, seed: u64, steps: u32) -> (Vec<[u8; 32]>, [u8; 32]) {
    let mut rng = Pcg32::new(seed);
    let mut state = MemoryLedgerState::new();
    let mut hashes = Vec::new();

    for i in 0..steps {
        let (authenticated, submission) = generate_submission(&mut rng, i);
        let outcome = committer
            .commit(&state, authenticated.into(), Some(RecordTime(i as i64)), submission)
            .unwrap();
        hashes.push(outcome_hash(&outcome).unwrap());
        state.apply(outcome.writes).unwrap();
    }

    (hashes, state.state_hash().unwrap())
}

#[test]
fn test_replicas_agree() {
    let a = run_simulation(&PackageCommitter::without_preload(), 12345, 300);
    let b = run_simulation(&PackageCommitter::without_preload(), 12345, 300);
    assert_eq!(a, b, "Same input stream must give identical outcomes on every replica");
}

#[test]
fn test_preload_does_not_leak_into_outcome() {
    let sink = Arc::new(RecordingPreload::default());
    let with_preload = run_simulation(&PackageCommitter::new(sink.clone()), 777, 300);
    let without = run_simulation(&PackageCommitter::new(Arc::new(NoopPreload)), 777, 300);

    assert!(sink.batch_count() > 0);
    assert_eq!(with_preload, without);
}

#[test]
fn test_different_streams_diverge() {
    let a = run_simulation(&PackageCommitter::without_preload(), 1, 100);
    let b = run_simulation(&PackageCommitter::without_preload(), 2, 100);
    assert_ne!(a.1, b.1);
}
