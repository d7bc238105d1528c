// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! End-to-end run of the counter transcript.

use crate::error::EngineError;
use crate::expr::Expr;
use crate::session::Session;
use crate::value::Value;

/// `let count = 0 in λinput. let count = count + input in (count, self)`
fn counter_expr() -> Expr {
    Expr::let_(
        "count",
        Expr::num(0),
        Expr::lambda(
            "input",
            Expr::let_(
                "count",
                Expr::add(Expr::var("count"), Expr::var("input")),
                Expr::pair(Expr::var("count"), Expr::SelfRef),
            ),
        ),
    )
}

#[test]
fn test_counter_transcript() {
    let session = Session::in_memory();

    // commit <expression>
    let genesis = session.commit_expr(&counter_expr()).unwrap();

    // chain <commitment> <input>, three generations
    let (out1, h1) = session.chain(genesis, Value::Num(9)).unwrap();
    assert_eq!(out1, Value::Num(9));

    let (out2, h2) = session.chain(h1, Value::Num(12)).unwrap();
    assert_eq!(out2, Value::Num(21));

    let (out3, h3) = session.chain(h2, Value::Num(14)).unwrap();
    assert_eq!(out3, Value::Num(35));

    assert_eq!(session.head(), Some(h3));
    assert_ne!(genesis, h1);
    assert_ne!(h1, h2);
    assert_ne!(h2, h3);

    // prove / verify for every step
    for _ in 0..3 {
        let id = session.prove().unwrap();
        assert!(session.verify(&id).unwrap().is_verified());
    }
    assert_eq!(session.unproven_count(), 0);

    // replaying a superseded head must fail and leave the head alone
    let result = session.chain(h1, Value::Num(12));
    assert!(matches!(
        result,
        Err(EngineError::HeadMismatch { expected, actual })
            if expected == h1 && actual == h3
    ));
    assert_eq!(session.head(), Some(h3));

    // nothing left to prove
    assert!(matches!(
        session.prove(),
        Err(EngineError::NothingToProve)
    ));
}

#[test]
fn test_commit_expr_rejects_non_closure() {
    let session = Session::in_memory();

    let result = session.commit_expr(&Expr::num(42));
    assert!(matches!(result, Err(EngineError::Evaluation(_))));
}

#[test]
fn test_verified_claims_match_transcript() {
    let session = Session::in_memory();
    let genesis = session.commit_expr(&counter_expr()).unwrap();

    let (_, h1) = session.chain(genesis, Value::Num(9)).unwrap();

    let id = session.prove().unwrap();
    match session.verify(&id).unwrap() {
        crate::proof::VerificationResult::Verified(claim) => {
            assert_eq!(claim.prior, genesis);
            assert_eq!(claim.input, Value::Num(9));
            assert_eq!(claim.output, Value::Num(9));
            assert_eq!(claim.new_head, h1);
        }
        crate::proof::VerificationResult::Rejected(reason) => panic!("rejected: {reason}"),
    }
}
