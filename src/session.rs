// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Session Façade
//!
//! One chain instance behind the four directives: `commit`, `chain`,
//! `prove`, `verify`. Composes the Commitment Engine, Chain Controller,
//! Evaluator Oracle, and Proof Manager, and wires them to a durable state
//! directory so a chain survives process restarts.
//!
//! # Recovery Protocol
//! 1. Replay `commitments.log` through the engine (re-deriving every digest
//!    revalidates content addressing)
//! 2. Replay `proofs.log` into the proof store (identifiers re-derived from
//!    content)
//! 3. Replay `chain.log`, checking step linkage, to restore the head
//! 4. Steps whose claim has no stored proof are unproven again
//!
//! Corrupted or inconsistent logs fail closed.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::chain::{ChainController, StepRecord};
use crate::commitment::Commitment;
use crate::engine::CommitmentEngine;
use crate::error::{EngineError, Result};
use crate::eval::{EvalError, Evaluator, Interp};
use crate::expr::Expr;
use crate::persist::{ChainEntry, PersistError, StateDir};
use crate::proof::{Claim, Proof, ProofBackend, ProofId, ProofManager, ReceiptBackend, VerificationResult};
use crate::store::CommitmentStore;
use crate::value::{Env, Payload, Value};

pub struct Session<E = Interp, B = ReceiptBackend> {
    engine: CommitmentEngine,
    controller: ChainController,
    evaluator: E,
    proofs: ProofManager<B>,
    /// Step records awaiting proof, oldest first. `prove` consumes the most
    /// recent one.
    unproven: Mutex<Vec<StepRecord>>,
    /// Every executed step, retained for audit.
    audit: Mutex<Vec<StepRecord>>,
    state: Option<Mutex<StateDir>>,
}

impl Session<Interp, ReceiptBackend> {
    /// Ephemeral session with the reference evaluator and proof backend.
    pub fn in_memory() -> Self {
        Self::with_parts(Interp::new(), ReceiptBackend::new())
    }

    /// Durable session backed by `dir`, with the reference evaluator and
    /// proof backend.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(dir, Interp::new(), ReceiptBackend::new())
    }
}

impl<E: Evaluator, B: ProofBackend> Session<E, B> {
    /// Ephemeral session over caller-supplied oracles.
    pub fn with_parts(evaluator: E, backend: B) -> Self {
        Self {
            engine: CommitmentEngine::new(Arc::new(CommitmentStore::new())),
            controller: ChainController::new(),
            evaluator,
            proofs: ProofManager::new(backend),
            unproven: Mutex::new(Vec::new()),
            audit: Mutex::new(Vec::new()),
            state: None,
        }
    }

    /// Durable session over caller-supplied oracles.
    pub fn open_with(dir: impl AsRef<Path>, evaluator: E, backend: B) -> Result<Self> {
        let (state, recovered) = StateDir::open(dir)?;

        let engine = CommitmentEngine::new(Arc::new(CommitmentStore::new()));
        for payload in recovered.payloads {
            engine.commit(payload)?;
        }

        let proofs = ProofManager::new(backend);
        for proof in recovered.proofs {
            proofs.insert(proof)?;
        }

        let mut head: Option<Commitment> = None;
        let mut audit: Vec<StepRecord> = Vec::new();
        for (entry_index, entry) in recovered.chain.into_iter().enumerate() {
            match entry {
                ChainEntry::Genesis(genesis) => {
                    if head.is_some() || !audit.is_empty() {
                        return Err(inconsistent(entry_index));
                    }
                    engine.open(&genesis)?;
                    head = Some(genesis);
                }
                ChainEntry::Step(record) => {
                    if head != Some(record.prior) || record.index != audit.len() as u64 {
                        return Err(inconsistent(entry_index));
                    }
                    engine.open(&record.new_head)?;
                    head = Some(record.new_head);
                    audit.push(record);
                }
            }
        }

        let unproven: Vec<StepRecord> = audit
            .iter()
            .filter(|record| !proofs.has_claim(&claim_of(record)))
            .cloned()
            .collect();

        let controller = match head {
            Some(head) => ChainController::resume(head, audit.len() as u64),
            None => ChainController::new(),
        };

        tracing::info!(
            head = ?head.map(|h| h.to_string()),
            steps = audit.len(),
            unproven = unproven.len(),
            "session recovered"
        );

        Ok(Self {
            engine,
            controller,
            evaluator,
            proofs,
            unproven: Mutex::new(unproven),
            audit: Mutex::new(audit),
            state: Some(Mutex::new(state)),
        })
    }

    /// `commit <expression>`: evaluate via the oracle and commit the
    /// resulting closure. A non-closure result is not a chainable payload.
    pub fn commit_expr(&self, expr: &Expr) -> Result<Commitment> {
        let evaluated = self.evaluator.eval(expr, &Env::new())?;
        let payload = evaluated
            .value
            .into_closure()
            .ok_or(EngineError::Evaluation(EvalError::NotChainable))?;
        self.commit_payload(payload)
    }

    /// Commit an already-built payload.
    pub fn commit_payload(&self, payload: Payload) -> Result<Commitment> {
        let (commitment, fresh) = self.engine.commit_tracking(payload.clone())?;
        if fresh {
            self.with_state(|state| state.commitments.append(&payload).map(|_| ()))?;
        }
        Ok(commitment)
    }

    /// Anchor the chain at an existing commitment. Legal exactly once.
    pub fn initialize(&self, genesis: Commitment) -> Result<()> {
        self.engine.open(&genesis)?;
        self.controller.initialize(genesis)?;
        self.with_state(|state| state.chain.append(&ChainEntry::Genesis(genesis)).map(|_| ()))
    }

    /// `chain <commitment> <input>`: execute one step against the live head
    /// and return the observable output plus the new head.
    ///
    /// An uninitialized chain is anchored at `expected_prior` first — the
    /// transcript's implicit genesis: the first `chain` call names the
    /// commitment the chain starts from.
    pub fn chain(&self, expected_prior: Commitment, input: Value) -> Result<(Value, Commitment)> {
        if self.controller.head().is_none() {
            self.engine.open(&expected_prior)?;
            match self.controller.initialize(expected_prior) {
                Ok(()) => self.with_state(|state| {
                    state
                        .chain
                        .append(&ChainEntry::Genesis(expected_prior))
                        .map(|_| ())
                })?,
                // Another caller anchored first; the head check below
                // decides whether this step still applies.
                Err(EngineError::AlreadyInitialized) => {}
                Err(e) => return Err(e),
            }
        }

        let record =
            self.controller
                .chain(&self.engine, &self.evaluator, expected_prior, input)?;

        // The in-memory step is already committed; a failed log write here
        // surfaces as an error and the durable prefix simply ends one step
        // earlier, which recovery restores cleanly.
        let payload = self.engine.open(&record.new_head)?;
        self.with_state(|state| {
            state.commitments.append(&payload)?;
            state.chain.append(&ChainEntry::Step(record.clone()))?;
            Ok(())
        })?;

        let output = record.output.clone();
        let new_head = record.new_head;
        {
            let mut unproven = self.unproven.lock().unwrap_or_else(|e| e.into_inner());
            unproven.push(record.clone());
        }
        {
            let mut audit = self.audit.lock().unwrap_or_else(|e| e.into_inner());
            audit.push(record);
        }

        Ok((output, new_head))
    }

    /// `prove`: prove the most recent unproven step record and retain the
    /// proof. Fails with [`EngineError::NothingToProve`] when every step is
    /// proven. On failure the record stays unproven, so a retry sees the
    /// identical record and no side effects from the failed attempt.
    pub fn prove(&self) -> Result<ProofId> {
        let record = {
            let mut unproven = self.unproven.lock().unwrap_or_else(|e| e.into_inner());
            unproven.pop().ok_or(EngineError::NothingToProve)?
        };

        let proven = self.proofs.prove(&record).and_then(|id| {
            if let Some(proof) = self.proofs.get(&id) {
                self.with_state(|state| state.proofs.append(&*proof).map(|_| ()))?;
            }
            Ok(id)
        });

        match proven {
            Ok(id) => {
                tracing::info!(step = record.index, %id, "step proven");
                Ok(id)
            }
            Err(e) => {
                // The record stays unproven; a retry re-derives the same
                // content-addressed identifier, so nothing is half-done.
                let mut unproven = self.unproven.lock().unwrap_or_else(|e| e.into_inner());
                unproven.push(record);
                Err(e)
            }
        }
    }

    /// `verify <identifier>`: check a stored proof. Pure — mutates neither
    /// the head nor any store.
    pub fn verify(&self, id: &ProofId) -> Result<VerificationResult> {
        self.proofs.verify(id)
    }

    /// Check an externally supplied artifact against an identifier.
    pub fn verify_artifact(&self, id: &ProofId, bytes: &[u8]) -> VerificationResult {
        self.proofs.verify_artifact(id, bytes)
    }

    pub fn head(&self) -> Option<Commitment> {
        self.controller.head()
    }

    pub fn step_count(&self) -> u64 {
        self.controller.step_count()
    }

    pub fn unproven_count(&self) -> usize {
        let unproven = self.unproven.lock().unwrap_or_else(|e| e.into_inner());
        unproven.len()
    }

    pub fn commitment_count(&self) -> usize {
        self.engine.store().len()
    }

    pub fn proof_count(&self) -> usize {
        self.proofs.len()
    }

    pub fn proof(&self, id: &ProofId) -> Option<Arc<Proof>> {
        self.proofs.get(id)
    }

    /// Audit trail snapshot, oldest step first.
    pub fn audit_trail(&self) -> Vec<StepRecord> {
        let audit = self.audit.lock().unwrap_or_else(|e| e.into_inner());
        audit.clone()
    }

    pub fn engine(&self) -> &CommitmentEngine {
        &self.engine
    }

    fn with_state<F>(&self, write: F) -> Result<()>
    where
        F: FnOnce(&mut StateDir) -> std::result::Result<(), PersistError>,
    {
        if let Some(state) = &self.state {
            let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
            write(&mut state)?;
        }
        Ok(())
    }
}

fn claim_of(record: &StepRecord) -> Claim {
    Claim {
        prior: record.prior,
        input: record.input.clone(),
        output: record.output.clone(),
        new_head: record.new_head,
    }
}

fn inconsistent(entry: usize) -> EngineError {
    EngineError::Persist(PersistError::Inconsistent {
        entry: entry as u64,
    })
}
