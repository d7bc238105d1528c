// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! catena-kernel: chained functional commitments with provable steps.
//!
//! A committed closure is applied to successive inputs; every application
//! yields an observable output plus a fresh closure, which is committed in
//! turn. The result is a hash-linked chain whose steps carry
//! machine-checkable execution traces, provable and verifiable from a short
//! content-derived identifier.

pub mod canonical;
pub mod chain;
pub mod commitment;
pub mod engine;
pub mod error;
pub mod eval;
pub mod expr;
pub mod fixtures;
pub mod persist;
pub mod proof;
pub mod session;
pub mod store;
pub mod value;

pub use chain::{ChainController, StepRecord};
pub use commitment::Commitment;
pub use engine::CommitmentEngine;
pub use error::{EngineError, Result};
pub use eval::{Applied, EvalError, Evaluated, Evaluator, Interp, OpCode, Trace};
pub use expr::Expr;
pub use proof::{
    Claim, Proof, ProofBackend, ProofId, ProofManager, ReceiptBackend, RejectReason,
    VerificationResult,
};
pub use session::Session;
pub use store::CommitmentStore;
pub use value::{Env, Payload, Value};

#[cfg(test)]
pub mod tests;
