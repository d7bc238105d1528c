// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Chain linkage and head-serialization properties.

use std::sync::Arc;

use crate::error::EngineError;
use crate::fixtures;
use crate::session::Session;
use crate::value::Value;

#[test]
fn test_linkage_over_many_steps() {
    let session = Session::in_memory();
    let genesis = session.commit_payload(fixtures::counter(0)).unwrap();

    let mut head = genesis;
    let mut total = 0i64;
    for input in 1..=20i64 {
        let (output, new_head) = session.chain(head, Value::Num(input)).unwrap();
        total += input;
        assert_eq!(output, Value::Num(total));
        assert_ne!(new_head, head);
        head = new_head;
    }

    // Every step's prior equals the previous step's new head.
    let audit = session.audit_trail();
    assert_eq!(audit.len(), 20);
    for window in audit.windows(2) {
        assert_eq!(window[1].prior, window[0].new_head);
        assert_eq!(window[1].index, window[0].index + 1);
    }
    assert_eq!(audit[0].prior, genesis);
    assert_eq!(session.head(), Some(head));
}

#[test]
fn test_chain_against_unknown_commitment() {
    let session = Session::in_memory();

    let ghost = crate::commitment::Commitment([0x44; 32]);
    let result = session.chain(ghost, Value::Num(1));

    assert!(matches!(result, Err(EngineError::UnknownCommitment(_))));
    assert_eq!(session.head(), None);
}

#[test]
fn test_concurrent_steps_serialize_on_one_head() {
    let session = Arc::new(Session::in_memory());
    let genesis = session.commit_payload(fixtures::counter(0)).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let session = session.clone();
            std::thread::spawn(move || session.chain(genesis, Value::Num(i + 1)))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // Exactly one step may observe `genesis` as its prior; the rest must be
    // rejected as stale without advancing anything.
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    for result in &results {
        if let Err(e) = result {
            assert!(matches!(e, EngineError::HeadMismatch { .. }));
        }
    }
    assert_eq!(session.step_count(), 1);
}

#[test]
fn test_toggle_chain() {
    let session = Session::in_memory();
    let genesis = session.commit_payload(fixtures::toggle(false)).unwrap();

    let (out1, h1) = session.chain(genesis, Value::Nil).unwrap();
    assert_eq!(out1, Value::Bool(true));

    let (out2, _) = session.chain(h1, Value::Nil).unwrap();
    assert_eq!(out2, Value::Bool(false));
}
