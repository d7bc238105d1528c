// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Reference hash-receipt backend.
//!
//! The artifact is a receipt: the trace digest, the step count, and a seal
//! binding both to the claim under a domain tag. Verification recomputes
//! the seal from the embedded fields — no re-execution, no trace, no live
//! evaluator.
//!
//! # Guarantee
//! Same claim + same trace → same artifact (across any architecture)

use serde::{Deserialize, Serialize};

use crate::canonical;
use crate::eval::Trace;

use super::backend::{BackendError, BackendLimits, ProofBackend};
use super::Claim;

const RECEIPT_DOMAIN: &[u8] = b"catena.receipt.v1";

/// Receipt body carried inside the artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Receipt {
    trace_digest: [u8; 32],
    steps: u64,
    seal: [u8; 32],
}

pub struct ReceiptBackend {
    limits: BackendLimits,
}

impl ReceiptBackend {
    pub fn new() -> Self {
        Self {
            limits: BackendLimits::default(),
        }
    }

    pub fn with_limits(limits: BackendLimits) -> Self {
        Self { limits }
    }

    fn seal(claim: &Claim, trace_digest: &[u8; 32], steps: u64) -> Result<[u8; 32], BackendError> {
        let claim_bytes = canonical::encode(claim).map_err(BackendError::Rejected)?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(RECEIPT_DOMAIN);
        hasher.update(&claim_bytes);
        hasher.update(trace_digest);
        hasher.update(&steps.to_le_bytes());
        Ok(*hasher.finalize().as_bytes())
    }
}

impl Default for ReceiptBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ProofBackend for ReceiptBackend {
    fn prove(&self, claim: &Claim, trace: &Trace) -> Result<Vec<u8>, BackendError> {
        if trace.steps > self.limits.max_trace_steps {
            return Err(BackendError::ResourceExhausted {
                steps: trace.steps,
                cap: self.limits.max_trace_steps,
            });
        }
        if !trace.well_formed() {
            return Err(BackendError::Rejected(
                "trace tape and step count disagree".into(),
            ));
        }

        let trace_digest = trace.digest();
        let seal = Self::seal(claim, &trace_digest, trace.steps)?;
        let receipt = Receipt {
            trace_digest,
            steps: trace.steps,
            seal,
        };
        canonical::encode(&receipt).map_err(BackendError::Rejected)
    }

    fn verify(&self, claim: &Claim, artifact: &[u8]) -> bool {
        let receipt: Receipt = match canonical::decode(artifact) {
            Ok(receipt) => receipt,
            Err(_) => return false,
        };
        match Self::seal(claim, &receipt.trace_digest, receipt.steps) {
            Ok(expected) => expected == receipt.seal,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::Commitment;
    use crate::eval::OpCode;
    use crate::value::Value;

    fn claim() -> Claim {
        Claim {
            prior: Commitment([1u8; 32]),
            input: Value::Num(9),
            output: Value::Num(9),
            new_head: Commitment([2u8; 32]),
        }
    }

    fn trace() -> Trace {
        Trace {
            ops: vec![OpCode::Apply, OpCode::Let, OpCode::Add, OpCode::Pair],
            steps: 4,
            input_digest: [3u8; 32],
            output_digest: [4u8; 32],
        }
    }

    #[test]
    fn test_prove_verify_roundtrip() {
        let backend = ReceiptBackend::new();
        let artifact = backend.prove(&claim(), &trace()).unwrap();

        assert!(backend.verify(&claim(), &artifact));
    }

    #[test]
    fn test_artifact_is_deterministic() {
        let backend = ReceiptBackend::new();

        let a1 = backend.prove(&claim(), &trace()).unwrap();
        let a2 = backend.prove(&claim(), &trace()).unwrap();

        assert_eq!(a1, a2);
    }

    #[test]
    fn test_wrong_claim_rejected() {
        let backend = ReceiptBackend::new();
        let artifact = backend.prove(&claim(), &trace()).unwrap();

        let mut tampered = claim();
        tampered.output = Value::Num(10);
        assert!(!backend.verify(&tampered, &artifact));
    }

    #[test]
    fn test_flipped_artifact_byte_rejected() {
        let backend = ReceiptBackend::new();
        let artifact = backend.prove(&claim(), &trace()).unwrap();

        for i in 0..artifact.len() {
            let mut mutated = artifact.clone();
            mutated[i] ^= 0x01;
            assert!(
                !backend.verify(&claim(), &mutated),
                "flipping byte {} must invalidate the artifact",
                i
            );
        }
    }

    #[test]
    fn test_resource_limit() {
        let backend = ReceiptBackend::with_limits(BackendLimits { max_trace_steps: 2 });

        assert!(matches!(
            backend.prove(&claim(), &trace()),
            Err(BackendError::ResourceExhausted { steps: 4, cap: 2 })
        ));
    }

    #[test]
    fn test_malformed_trace_refused() {
        let backend = ReceiptBackend::new();
        let mut bad = trace();
        bad.steps = 3;

        assert!(matches!(
            backend.prove(&claim(), &bad),
            Err(BackendError::Rejected(_))
        ));
    }
}
