// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Evaluator Oracle
//!
//! The deterministic reducer the engine depends on but does not implement:
//! given an expression and an environment it produces a value plus a
//! machine-checkable execution trace. The engine only ever talks to this
//! seam; `Interp` is the bundled reference implementation.

pub mod interp;
pub mod trace;

pub use interp::Interp;
pub use trace::{OpCode, Trace};

use thiserror::Error;

use crate::expr::Expr;
use crate::value::{Env, Payload, Value};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("unbound name `{0}`")]
    Unbound(String),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The bounded step budget ran out before reduction finished.
    #[error("step budget exhausted after {0} steps")]
    BudgetExhausted(u64),

    #[error("recursion depth exceeded")]
    DepthExceeded,

    #[error("arithmetic overflow")]
    Overflow,

    /// A chained application must reduce to `(output, closure)`.
    #[error("result is not an (output, closure) pair")]
    NotChainable,

    #[error("self reference outside a function body")]
    SelfOutsideFunction,

    #[error("trace capture failed: {0}")]
    Encode(String),
}

/// Result of a standalone evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluated {
    pub value: Value,
    pub trace: Trace,
}

/// Result of applying a committed closure to an input: the observable
/// output, the fresh closure ready for the next commitment, and the trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Applied {
    pub output: Value,
    pub next: Payload,
    pub trace: Trace,
}

/// Deterministic evaluation capability.
pub trait Evaluator {
    /// Reduce `expr` under `env` to a value.
    fn eval(&self, expr: &Expr, env: &Env) -> Result<Evaluated, EvalError>;

    /// Apply a committed closure to `input`. The closure body must reduce to
    /// a pair of (observable output, next closure); anything else fails with
    /// [`EvalError::NotChainable`].
    fn apply(&self, payload: &Payload, input: &Value) -> Result<Applied, EvalError>;
}
