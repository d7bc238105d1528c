// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Determinism properties: identical inputs, identical digests — across
//! independent engine instances.

use std::sync::Arc;

use crate::chain::ChainController;
use crate::engine::CommitmentEngine;
use crate::eval::Interp;
use crate::fixtures;
use crate::proof::{ProofManager, ReceiptBackend};
use crate::store::CommitmentStore;
use crate::value::Value;

fn fresh_engine() -> CommitmentEngine {
    CommitmentEngine::new(Arc::new(CommitmentStore::new()))
}

#[test]
fn test_commitments_agree_across_engines() {
    let c1 = fresh_engine().commit(fixtures::counter(0)).unwrap();
    let c2 = fresh_engine().commit(fixtures::counter(0)).unwrap();

    assert_eq!(c1, c2, "independent engines must derive the same digest");
}

#[test]
fn test_chains_agree_across_engines() {
    let run = || {
        let engine = fresh_engine();
        let genesis = engine.commit(fixtures::counter(0)).unwrap();
        let controller = ChainController::new();
        controller.initialize(genesis).unwrap();

        let mut head = genesis;
        for input in [9i64, 12, 14] {
            let record = controller
                .chain(&engine, &Interp::new(), head, Value::Num(input))
                .unwrap();
            head = record.new_head;
        }
        head
    };

    assert_eq!(run(), run(), "replaying the same inputs must converge");
}

#[test]
fn test_proof_identifiers_agree_across_managers() {
    let engine = fresh_engine();
    let genesis = engine.commit(fixtures::counter(0)).unwrap();
    let controller = ChainController::new();
    controller.initialize(genesis).unwrap();
    let record = controller
        .chain(&engine, &Interp::new(), genesis, Value::Num(9))
        .unwrap();

    let id1 = ProofManager::new(ReceiptBackend::new()).prove(&record).unwrap();
    let id2 = ProofManager::new(ReceiptBackend::new()).prove(&record).unwrap();

    assert_eq!(id1, id2, "identifiers are content-derived, not stateful");
}

#[test]
fn test_traces_are_reproducible() {
    use crate::eval::Evaluator;

    let interp = Interp::new();
    let payload = fixtures::counter(5);

    let a = interp.apply(&payload, &Value::Num(3)).unwrap();
    let b = interp.apply(&payload, &Value::Num(3)).unwrap();

    assert_eq!(a.trace, b.trace);
    assert_eq!(a.trace.digest(), b.trace.digest());
}
