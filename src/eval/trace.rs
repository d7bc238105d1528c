// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Execution traces consumed by the prover.

use serde::{Deserialize, Serialize};

/// One reduction step kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum OpCode {
    Lit,
    Var,
    Add,
    Sub,
    Mul,
    Eq,
    Lt,
    If,
    Let,
    Lambda,
    Apply,
    Pair,
    First,
    Second,
    SelfRef,
}

/// Machine-checkable record of one evaluation: the reduction tape plus
/// BLAKE3 digests of the evaluation boundary (what went in, what came out).
///
/// The tape and the boundary digests are what the proof backend binds; the
/// engine never re-executes a trace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    pub ops: Vec<OpCode>,
    pub steps: u64,
    pub input_digest: [u8; 32],
    pub output_digest: [u8; 32],
}

impl Trace {
    /// A well-formed trace has a non-empty tape that agrees with its step
    /// count.
    pub fn well_formed(&self) -> bool {
        self.steps > 0 && self.steps == self.ops.len() as u64
    }

    /// Digest folding the whole tape and both boundaries.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.steps.to_le_bytes());
        for op in &self.ops {
            hasher.update(&[*op as u8]);
        }
        hasher.update(&self.input_digest);
        hasher.update(&self.output_digest);
        *hasher.finalize().as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trace {
        Trace {
            ops: vec![OpCode::Apply, OpCode::Let, OpCode::Add],
            steps: 3,
            input_digest: [1u8; 32],
            output_digest: [2u8; 32],
        }
    }

    #[test]
    fn test_well_formed() {
        assert!(sample().well_formed());

        let mut bad = sample();
        bad.steps = 2;
        assert!(!bad.well_formed());

        let empty = Trace {
            ops: vec![],
            steps: 0,
            input_digest: [0u8; 32],
            output_digest: [0u8; 32],
        };
        assert!(!empty.well_formed());
    }

    #[test]
    fn test_digest_sensitive_to_tape() {
        let base = sample().digest();

        let mut reordered = sample();
        reordered.ops.swap(0, 2);
        assert_ne!(base, reordered.digest());

        let mut boundary = sample();
        boundary.output_digest = [3u8; 32];
        assert_ne!(base, boundary.digest());
    }
}
