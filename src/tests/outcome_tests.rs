// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::log_entry::{LogEntry, RejectionReason};
use crate::state::{LedgerState, MemoryLedgerState, StateKey, StateValue};
use crate::tests::{archive, recording_committer, submit};
use crate::types::{RecordTime, Submission};
use crate::CommitOutcome;

fn pre_execute(state: &MemoryLedgerState, submission: Submission) -> CommitOutcome {
    let (committer, _) = recording_committer();
    committer.commit(state, "p1".into(), None, submission).unwrap()
}

#[test]
fn test_pre_execution_stashes_fallback() {
    let state = MemoryLedgerState::new();
    let outcome = pre_execute(&state, Submission::new("s1", "p1", vec![archive("h1", b"AA")]));

    assert!(outcome.is_pre_executed());
    assert!(outcome.log_entry.is_accepted());
    assert_eq!(outcome.log_entry.record_time(), None);
    assert!(matches!(outcome.out_of_time_bounds, Some(LogEntry::OutOfTimeBounds(_))));
    assert_eq!(
        outcome.writes.get(&StateKey::dedup(&"p1".into(), &"s1".into())),
        Some(&StateValue::SubmissionDedup { record_time: None })
    );
}

#[test]
fn test_final_commit_has_no_fallback() {
    let (committer, _) = recording_committer();
    let state = MemoryLedgerState::new();
    let outcome = committer
        .commit(&state, "p1".into(), Some(RecordTime(3)), Submission::new("s1", "p1", vec![archive("h1", b"AA")]))
        .unwrap();

    assert!(!outcome.is_pre_executed());
    assert!(outcome.out_of_time_bounds.is_none());
}

#[test]
fn test_finalize_within_bounds_matches_direct_commit() {
    let submission = Submission::new("s1", "p1", vec![archive("h1", b"AA")]);
    let state = MemoryLedgerState::new();

    let finalized = pre_execute(&state, submission.clone()).finalize(RecordTime(9), true);

    let (committer, _) = recording_committer();
    let direct = committer
        .commit(&state, "p1".into(), Some(RecordTime(9)), submission)
        .unwrap();

    assert_eq!(finalized, direct);
}

#[test]
fn test_finalize_out_of_bounds_uses_fallback() {
    let state = MemoryLedgerState::new();
    let outcome = pre_execute(&state, Submission::new("s1", "p1", vec![archive("h1", b"AA")]));

    let finalized = outcome.finalize(RecordTime(9), false);

    assert!(matches!(finalized.log_entry, LogEntry::OutOfTimeBounds(_)));
    assert!(finalized.writes.is_empty());
    assert!(finalized.out_of_time_bounds.is_none());
}

#[test]
fn test_finalize_pre_executed_rejection_is_stamped() {
    let state = MemoryLedgerState::new();
    let outcome = pre_execute(&state, Submission::new("s1", "p1", vec![]));

    let finalized = outcome.finalize(RecordTime(4), false);

    assert_eq!(finalized.log_entry.rejection_reason(), Some(RejectionReason::InvalidPackage));
    assert_eq!(finalized.log_entry.record_time(), Some(RecordTime(4)));
    assert!(finalized.writes.is_empty());
}

#[test]
fn test_finalize_on_final_outcome_is_noop() {
    let (committer, _) = recording_committer();
    let mut state = MemoryLedgerState::new();
    submit(&committer, &mut state, "p1", Submission::new("s0", "p1", vec![archive("h0", b"AA")]), 1);

    let outcome = committer
        .commit(&state, "p1".into(), Some(RecordTime(3)), Submission::new("s1", "p1", vec![archive("h1", b"AA")]))
        .unwrap();
    let again = outcome.clone().finalize(RecordTime(100), false);

    assert_eq!(outcome, again);
    assert!(state.contains(&StateKey::Archive("h0".into())).unwrap());
}
