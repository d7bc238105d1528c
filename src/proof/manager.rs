// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Proof production and identifier-based verification.
//!
//! `prove` turns a step record's trace into a stored artifact; `verify`
//! checks a proof against its identifier without the original step record,
//! trace, or live evaluator. Verification is pure: it never touches the
//! chain head or the commitment store.

use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;

use crate::canonical;
use crate::chain::StepRecord;
use crate::error::{EngineError, Result};

use super::backend::ProofBackend;
use super::{Claim, Proof, ProofId, ProveError, RejectReason, VerificationResult};

pub struct ProofManager<B> {
    backend: B,
    proofs: RwLock<FxHashMap<ProofId, Arc<Proof>>>,
}

impl<B: ProofBackend> ProofManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            proofs: RwLock::new(FxHashMap::default()),
        }
    }

    /// Content-derived identifier: BLAKE3 of the canonical proof encoding.
    pub fn identifier(proof: &Proof) -> Result<ProofId> {
        let bytes = canonical::encode(proof)
            .map_err(|e| EngineError::Proving(ProveError::Encode(e)))?;
        Ok(ProofId(canonical::digest(&bytes)))
    }

    /// Turn a step record into a stored proof and return its identifier.
    ///
    /// Idempotent: proving the same record twice yields the identical
    /// identifier and a single stored artifact. A failed attempt stores
    /// nothing, so retrying with the same record is side-effect free.
    pub fn prove(&self, record: &StepRecord) -> Result<ProofId> {
        if !record.trace.well_formed() {
            return Err(EngineError::Proving(ProveError::MalformedTrace));
        }

        let claim = Claim {
            prior: record.prior,
            input: record.input.clone(),
            output: record.output.clone(),
            new_head: record.new_head,
        };
        let artifact = self
            .backend
            .prove(&claim, &record.trace)
            .map_err(ProveError::Backend)?;
        let proof = Proof { claim, artifact };
        let id = Self::identifier(&proof)?;

        let mut proofs = self.proofs.write().unwrap_or_else(|e| e.into_inner());
        proofs.entry(id).or_insert_with(|| Arc::new(proof));
        tracing::debug!(step = record.index, %id, "proof stored");

        Ok(id)
    }

    /// Check a stored proof. An unknown identifier is an infrastructure
    /// error; a failing proof is a negative result, never an error.
    pub fn verify(&self, id: &ProofId) -> Result<VerificationResult> {
        let proof = self.get(id).ok_or(EngineError::UnknownProof(*id))?;
        Ok(self.check(id, &proof))
    }

    /// Check an externally supplied artifact presented under `id`. Every
    /// defect — undecodable bytes, a content digest that does not match the
    /// identifier, a failing seal — is a rejection, never a crash.
    pub fn verify_artifact(&self, id: &ProofId, bytes: &[u8]) -> VerificationResult {
        let proof: Proof = match canonical::decode(bytes) {
            Ok(proof) => proof,
            Err(_) => return VerificationResult::Rejected(RejectReason::MalformedProof),
        };
        match Self::identifier(&proof) {
            Ok(actual) if actual == *id => self.check(id, &proof),
            Ok(_) => VerificationResult::Rejected(RejectReason::IdentifierMismatch),
            Err(_) => VerificationResult::Rejected(RejectReason::MalformedProof),
        }
    }

    fn check(&self, id: &ProofId, proof: &Proof) -> VerificationResult {
        if self.backend.verify(&proof.claim, &proof.artifact) {
            tracing::debug!(%id, "proof verified");
            VerificationResult::Verified(proof.claim.clone())
        } else {
            tracing::warn!(%id, "proof rejected by backend");
            VerificationResult::Rejected(RejectReason::SealMismatch)
        }
    }

    pub fn get(&self, id: &ProofId) -> Option<Arc<Proof>> {
        let proofs = self.proofs.read().unwrap_or_else(|e| e.into_inner());
        proofs.get(id).cloned()
    }

    pub fn contains(&self, id: &ProofId) -> bool {
        let proofs = self.proofs.read().unwrap_or_else(|e| e.into_inner());
        proofs.contains_key(id)
    }

    /// Whether any stored proof binds this claim. Recovery uses this to
    /// work out which replayed step records are still unproven.
    pub fn has_claim(&self, claim: &Claim) -> bool {
        let proofs = self.proofs.read().unwrap_or_else(|e| e.into_inner());
        proofs.values().any(|proof| proof.claim == *claim)
    }

    /// Insert an already-built proof (recovery path). The identifier is
    /// re-derived from content, so a tampered artifact cannot squat on a
    /// foreign identifier.
    pub fn insert(&self, proof: Proof) -> Result<ProofId> {
        let id = Self::identifier(&proof)?;
        let mut proofs = self.proofs.write().unwrap_or_else(|e| e.into_inner());
        proofs.entry(id).or_insert_with(|| Arc::new(proof));
        Ok(id)
    }

    pub fn len(&self) -> usize {
        let proofs = self.proofs.read().unwrap_or_else(|e| e.into_inner());
        proofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time snapshot of all stored proofs.
    pub fn snapshot(&self) -> Vec<(ProofId, Arc<Proof>)> {
        let proofs = self.proofs.read().unwrap_or_else(|e| e.into_inner());
        proofs.iter().map(|(id, proof)| (*id, proof.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc as StdArc;

    use super::*;
    use crate::chain::ChainController;
    use crate::engine::CommitmentEngine;
    use crate::eval::Interp;
    use crate::fixtures;
    use crate::proof::ReceiptBackend;
    use crate::store::CommitmentStore;
    use crate::value::Value;

    fn step_record() -> StepRecord {
        let engine = CommitmentEngine::new(StdArc::new(CommitmentStore::new()));
        let genesis = engine.commit(fixtures::counter(0)).unwrap();
        let controller = ChainController::new();
        controller.initialize(genesis).unwrap();
        controller
            .chain(&engine, &Interp::new(), genesis, Value::Num(9))
            .unwrap()
    }

    fn manager() -> ProofManager<ReceiptBackend> {
        ProofManager::new(ReceiptBackend::new())
    }

    #[test]
    fn test_prove_then_verify() {
        let manager = manager();
        let record = step_record();

        let id = manager.prove(&record).unwrap();
        let result = manager.verify(&id).unwrap();

        match result {
            VerificationResult::Verified(claim) => {
                assert_eq!(claim.prior, record.prior);
                assert_eq!(claim.input, record.input);
                assert_eq!(claim.new_head, record.new_head);
            }
            VerificationResult::Rejected(reason) => panic!("rejected: {reason}"),
        }
    }

    #[test]
    fn test_identifiers_are_idempotent() {
        let manager = manager();
        let record = step_record();

        let id1 = manager.prove(&record).unwrap();
        let id2 = manager.prove(&record).unwrap();

        assert_eq!(id1, id2);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_unknown_identifier_is_an_error() {
        let manager = manager();
        let ghost = ProofId([7u8; 32]);

        assert!(matches!(
            manager.verify(&ghost),
            Err(EngineError::UnknownProof(id)) if id == ghost
        ));
    }

    #[test]
    fn test_malformed_trace_refused() {
        let manager = manager();
        let mut record = step_record();
        record.trace.steps += 1;

        assert!(matches!(
            manager.prove(&record),
            Err(EngineError::Proving(ProveError::MalformedTrace))
        ));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_tampered_external_artifact_rejected() {
        let manager = manager();
        let record = step_record();
        let id = manager.prove(&record).unwrap();

        let proof = manager.get(&id).unwrap();
        let bytes = canonical::encode(&*proof).unwrap();

        // Untampered bytes verify.
        assert!(manager.verify_artifact(&id, &bytes).is_verified());

        // Any single flipped byte is rejected, never a crash.
        for i in 0..bytes.len() {
            let mut mutated = bytes.clone();
            mutated[i] ^= 0x01;
            let result = manager.verify_artifact(&id, &mutated);
            assert!(!result.is_verified(), "byte {} survived tampering", i);
        }
    }

    #[test]
    fn test_distinct_records_distinct_identifiers() {
        let engine = CommitmentEngine::new(StdArc::new(CommitmentStore::new()));
        let genesis = engine.commit(fixtures::counter(0)).unwrap();
        let controller = ChainController::new();
        controller.initialize(genesis).unwrap();
        let interp = Interp::new();

        let first = controller
            .chain(&engine, &interp, genesis, Value::Num(9))
            .unwrap();
        let second = controller
            .chain(&engine, &interp, first.new_head, Value::Num(12))
            .unwrap();

        let manager = manager();
        let id1 = manager.prove(&first).unwrap();
        let id2 = manager.prove(&second).unwrap();

        assert_ne!(id1, id2);
    }
}
