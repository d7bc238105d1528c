// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Commitment Engine
//!
//! Builds a commitment from a payload and opens a commitment back to its
//! payload. Determinism of the canonical encoding is load-bearing here: it
//! is what lets a verifier recompute a commitment independently of the
//! engine that produced it.

use std::sync::Arc;

use crate::canonical;
use crate::commitment::Commitment;
use crate::error::{EngineError, Result};
use crate::store::CommitmentStore;
use crate::value::Payload;

pub struct CommitmentEngine {
    store: Arc<CommitmentStore>,
}

impl CommitmentEngine {
    pub fn new(store: Arc<CommitmentStore>) -> Self {
        Self { store }
    }

    /// Canonically encode, hash, and record a payload.
    ///
    /// Deterministic: the same payload always yields the same commitment
    /// (and an idempotent store insert the second time around).
    pub fn commit(&self, payload: Payload) -> Result<Commitment> {
        self.commit_tracking(payload).map(|(commitment, _)| commitment)
    }

    /// Like [`commit`](Self::commit), additionally reporting whether the
    /// store had never seen this payload before. The durability layer uses
    /// the freshness flag to avoid re-logging known payloads.
    pub fn commit_tracking(&self, payload: Payload) -> Result<(Commitment, bool)> {
        let bytes = canonical::encode_payload(&payload)?;
        let commitment = Commitment(canonical::digest(&bytes));
        let fresh = self.store.insert(commitment, Arc::new(payload));
        if fresh {
            tracing::debug!(%commitment, "payload committed");
        }
        Ok((commitment, fresh))
    }

    /// Recover the payload a commitment binds.
    pub fn open(&self, commitment: &Commitment) -> Result<Arc<Payload>> {
        self.store
            .get(commitment)
            .ok_or(EngineError::UnknownCommitment(*commitment))
    }

    pub fn store(&self) -> &Arc<CommitmentStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;
    use crate::fixtures;
    use crate::value::Env;

    fn engine() -> CommitmentEngine {
        CommitmentEngine::new(Arc::new(CommitmentStore::new()))
    }

    #[test]
    fn test_commit_deterministic() {
        let engine = engine();

        let c1 = engine.commit(fixtures::counter(0)).unwrap();
        let c2 = engine.commit(fixtures::counter(0)).unwrap();

        assert_eq!(c1, c2, "same payload must yield the same commitment");
        assert_eq!(engine.store().len(), 1);
    }

    #[test]
    fn test_distinct_payloads_distinct_commitments() {
        let engine = engine();

        let c1 = engine.commit(fixtures::counter(0)).unwrap();
        let c2 = engine.commit(fixtures::counter(1)).unwrap();

        assert_ne!(c1, c2);
    }

    #[test]
    fn test_open_roundtrip() {
        let engine = engine();
        let payload = fixtures::counter(3);

        let commitment = engine.commit(payload.clone()).unwrap();
        let opened = engine.open(&commitment).unwrap();

        assert_eq!(*opened, payload);
    }

    #[test]
    fn test_open_unknown() {
        let engine = engine();
        let ghost = Commitment([0xee; 32]);

        assert!(matches!(
            engine.open(&ghost),
            Err(EngineError::UnknownCommitment(c)) if c == ghost
        ));
    }

    #[test]
    fn test_commit_rejects_unencodable_payload() {
        let engine = engine();

        // A pair nested past the canonical depth cap is not representable.
        let mut deep = crate::value::Value::Nil;
        for _ in 0..canonical::MAX_NESTING_DEPTH + 1 {
            deep = crate::value::Value::pair(crate::value::Value::Num(0), deep);
        }
        let payload = Payload::new("x", Expr::Nil, Env::new().bind("deep", deep));

        assert!(matches!(
            engine.commit(payload),
            Err(EngineError::Serialization(_))
        ));
    }
}
