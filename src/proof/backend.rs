// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Proof backend capability seam.
//!
//! The real prover/verifier internals (field arithmetic, polynomial
//! commitments) live behind this narrow interface so any conforming backend
//! is swappable. The engine never looks inside an artifact.

use thiserror::Error;

use crate::eval::Trace;

use super::Claim;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Proving is resource-intensive; traces beyond the configured bound
    /// are refused outright rather than ground through.
    #[error("trace exceeds backend resource limits ({steps} steps, cap {cap})")]
    ResourceExhausted { steps: u64, cap: u64 },

    #[error("trace rejected by backend: {0}")]
    Rejected(String),
}

/// Resource bounds for proving. There is no wall-clock timeout anywhere in
/// the kernel — bounds are expressed in trace steps, so a refused attempt
/// leaves no partial artifact and a retry with the same step record is
/// idempotent.
#[derive(Clone, Copy, Debug)]
pub struct BackendLimits {
    pub max_trace_steps: u64,
}

impl Default for BackendLimits {
    fn default() -> Self {
        Self {
            max_trace_steps: 1_000_000,
        }
    }
}

/// Narrow prover/verifier oracle.
pub trait ProofBackend {
    /// Produce an opaque succinct artifact binding `claim` to `trace`.
    fn prove(&self, claim: &Claim, trace: &Trace) -> Result<Vec<u8>, BackendError>;

    /// Check an artifact against a claim. `false` means the proof does not
    /// hold; the caller reports a negative result, never a crash.
    fn verify(&self, claim: &Claim, artifact: &[u8]) -> bool;
}
