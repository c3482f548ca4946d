// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::log_entry::{LogEntry, RejectionReason};
use crate::state::{LedgerState, MemoryLedgerState, StateKey};
use crate::tests::{archive, recording_committer, submit, Pcg32};
use crate::types::{Archive, ArchiveHash, RecordTime, Submission};
use crate::PackageCommitter;

fn random_archives(rng: &mut Pcg32) -> Vec<Archive> {
    let count = rng.below(5);
    (0..count)
        .map(|i| {
            // Roughly a third of the archives are malformed.
            let hash = if rng.below(3) == 0 { String::new() } else { format!("h{}", rng.below(50)) };
            let payload = if rng.below(3) == 0 { Vec::new() } else { vec![i as u8 + 1; 4] };
            Archive::new(hash, payload)
        })
        .collect()
}

fn accepted_hashes(entry: &LogEntry) -> Vec<ArchiveHash> {
    match entry {
        LogEntry::Accepted(a) => a.archive_hashes.clone(),
        other => panic!("expected acceptance, got {:?}", other),
    }
}

#[test]
fn test_steps_run_in_declared_order() {
    let committer = PackageCommitter::without_preload();
    assert_eq!(
        committer.step_names(),
        vec![
            "authorize_submission",
            "validate_entry",
            "deduplicate_submission",
            "enqueue_preload",
            "filter_duplicates",
            "build_log_entry",
        ]
    );
}

#[test]
fn test_mismatched_participant_always_not_authorized() {
    let (committer, sink) = recording_committer();
    let state = MemoryLedgerState::new();
    let mut rng = Pcg32::new(7);

    for i in 0..200 {
        let submission = Submission::new(format!("s{}", i), "declared", random_archives(&mut rng));
        let outcome = committer
            .commit(&state, "someone-else".into(), Some(RecordTime(1)), submission)
            .unwrap();
        assert_eq!(outcome.log_entry.rejection_reason(), Some(RejectionReason::NotAuthorized));
        assert!(outcome.writes.is_empty());
    }
    assert_eq!(sink.batch_count(), 0, "Rejected submissions must not reach the preloader");
}

#[test]
fn test_empty_archive_list_is_invalid() {
    let (committer, _) = recording_committer();
    let mut state = MemoryLedgerState::new();

    let entry = submit(&committer, &mut state, "p1", Submission::new("s1", "p1", vec![]), 1);

    assert_eq!(entry.rejection_reason(), Some(RejectionReason::InvalidPackage));
    assert!(state.is_empty());
}

#[test]
fn test_every_invalid_archive_is_reported() {
    let (committer, _) = recording_committer();
    let mut state = MemoryLedgerState::new();
    let submission = Submission::new(
        "s1",
        "p1",
        vec![
            archive("ok1", b"AA"),
            archive("", b"AA"),
            archive("h2", b""),
            archive("ok2", b"BB"),
            archive("", b""),
        ],
    );

    let entry = submit(&committer, &mut state, "p1", submission, 1);

    let LogEntry::Rejected(rejected) = entry else {
        panic!("expected rejection");
    };
    assert_eq!(rejected.reason, RejectionReason::InvalidPackage);
    assert_eq!(
        rejected.details,
        "Invalid archives: archive #1 (hash ''): empty hash, \
         archive #2 (hash 'h2'): empty payload, \
         archive #4 (hash ''): empty hash and empty payload"
    );
}

#[test]
fn test_random_invalid_archives_always_rejected() {
    let (committer, _) = recording_committer();
    let state = MemoryLedgerState::new();
    let mut rng = Pcg32::new(99);

    for i in 0..200 {
        let archives = random_archives(&mut rng);
        let bad: Vec<usize> = archives
            .iter()
            .enumerate()
            .filter(|(_, a)| a.validation_error().is_some())
            .map(|(idx, _)| idx)
            .collect();
        let empty = archives.is_empty();
        let submission = Submission::new(format!("s{}", i), "p1", archives);

        let outcome = committer.commit(&state, "p1".into(), Some(RecordTime(1)), submission).unwrap();

        if empty || !bad.is_empty() {
            let LogEntry::Rejected(rejected) = &outcome.log_entry else {
                panic!("expected rejection for case {}", i);
            };
            assert_eq!(rejected.reason, RejectionReason::InvalidPackage);
            for idx in bad {
                assert!(rejected.details.contains(&format!("archive #{} ", idx)));
            }
        } else {
            assert!(outcome.log_entry.is_accepted());
        }
    }
}

#[test]
fn test_duplicate_submission_with_different_archives() {
    let (committer, _) = recording_committer();
    let mut state = MemoryLedgerState::new();
    submit(&committer, &mut state, "p1", Submission::new("s1", "p1", vec![archive("h1", b"AA")]), 1);
    let before = state.clone();

    let entry = submit(
        &committer,
        &mut state,
        "p1",
        Submission::new("s1", "p1", vec![archive("h2", b"BB")]),
        2,
    );

    assert_eq!(entry.rejection_reason(), Some(RejectionReason::DuplicateSubmission));
    assert_eq!(state, before);
    assert!(!state.contains(&StateKey::Archive("h2".into())).unwrap());
}

#[test]
fn test_same_submission_id_from_other_participant_is_not_duplicate() {
    let (committer, _) = recording_committer();
    let mut state = MemoryLedgerState::new();
    submit(&committer, &mut state, "p1", Submission::new("s1", "p1", vec![archive("h1", b"AA")]), 1);

    let entry = submit(&committer, &mut state, "p2", Submission::new("s1", "p2", vec![archive("h2", b"BB")]), 2);

    assert!(entry.is_accepted());
}

#[test]
fn test_known_archive_dropped_from_write_set() {
    let (committer, _) = recording_committer();
    let mut state = MemoryLedgerState::new();
    submit(&committer, &mut state, "p1", Submission::new("s1", "p1", vec![archive("h1", b"AA")]), 1);

    let submission = Submission::new("s2", "p1", vec![archive("h1", b"AA"), archive("h2", b"BB")]);
    let outcome = committer.commit(&state, "p1".into(), Some(RecordTime(2)), submission).unwrap();

    assert_eq!(accepted_hashes(&outcome.log_entry), vec![ArchiveHash::from("h2")]);
    assert!(!outcome.writes.contains_key(&StateKey::Archive("h1".into())));
    assert!(outcome.writes.contains_key(&StateKey::Archive("h2".into())));
    assert!(outcome.writes.contains_key(&StateKey::dedup(&"p1".into(), &"s2".into())));
}

#[test]
fn test_all_known_archives_still_accepted() {
    let (committer, _) = recording_committer();
    let mut state = MemoryLedgerState::new();
    submit(&committer, &mut state, "p1", Submission::new("s1", "p1", vec![archive("h1", b"AA")]), 1);

    let outcome = committer
        .commit(&state, "p1".into(), Some(RecordTime(2)), Submission::new("s2", "p1", vec![archive("h1", b"AA")]))
        .unwrap();

    assert!(accepted_hashes(&outcome.log_entry).is_empty());
    // Only the dedup marker is written.
    assert_eq!(outcome.writes.len(), 1);
}

#[test]
fn test_repeated_hash_within_submission_written_once() {
    let (committer, _) = recording_committer();
    let state = MemoryLedgerState::new();
    let submission = Submission::new(
        "s1",
        "p1",
        vec![archive("h1", b"first"), archive("h2", b"BB"), archive("h1", b"second")],
    );

    let outcome = committer.commit(&state, "p1".into(), Some(RecordTime(1)), submission).unwrap();

    assert_eq!(
        accepted_hashes(&outcome.log_entry),
        vec![ArchiveHash::from("h1"), ArchiveHash::from("h2")]
    );
    assert_eq!(
        outcome.writes.get(&StateKey::Archive("h1".into())),
        Some(&crate::StateValue::Archive(archive("h1", b"first")))
    );
}

#[test]
fn test_preload_sees_known_archives_before_filtering() {
    let (committer, sink) = recording_committer();
    let mut state = MemoryLedgerState::new();
    submit(&committer, &mut state, "p1", Submission::new("s1", "p1", vec![archive("h1", b"AA")]), 1);
    submit(&committer, &mut state, "p1", Submission::new("s2", "p1", vec![archive("h1", b"AA")]), 2);

    assert_eq!(sink.hashes(), vec![vec!["h1".to_string()], vec!["h1".to_string()]]);
}

#[test]
fn test_duplicate_submission_not_preloaded() {
    let (committer, sink) = recording_committer();
    let mut state = MemoryLedgerState::new();
    let submission = Submission::new("s1", "p1", vec![archive("h1", b"AA")]);
    submit(&committer, &mut state, "p1", submission.clone(), 1);
    submit(&committer, &mut state, "p1", submission, 2);

    assert_eq!(sink.batch_count(), 1);
}
