// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Chain Controller - The Commit Barrier
//!
//! Holds the current head commitment and executes chain steps against it.
//!
//! # Step protocol
//! 1. Caller-supplied prior commitment must equal the live head
//! 2. Open the head's payload
//! 3. Apply the payload's function to the input via the Evaluator Oracle
//! 4. Commit the fresh payload
//! 5. Advance the head, emit a step record
//!
//! If ANY step fails → head unchanged (atomic step, no partial advancement)
//!
//! # Invariants
//! - Exactly one head per chain instance
//! - The head after step n is the prior of step n+1
//! - Two concurrent steps must never both observe the same prior

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::commitment::Commitment;
use crate::engine::CommitmentEngine;
use crate::error::{EngineError, Result};
use crate::eval::{Evaluator, Trace};
use crate::value::Value;

/// Record of one executed chain step. Immutable once created; consumed by
/// the Proof Manager and retained for audit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub index: u64,
    pub prior: Commitment,
    pub input: Value,
    pub output: Value,
    pub new_head: Commitment,
    pub trace: Trace,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HeadState {
    Uninitialized,
    Active(Commitment),
}

struct HeadInner {
    state: HeadState,
    next_index: u64,
}

/// Single-writer state machine over the chain head. Constructed once per
/// chain instance and passed by handle; there is no hidden global head.
pub struct ChainController {
    head: Mutex<HeadInner>,
}

impl ChainController {
    pub fn new() -> Self {
        Self {
            head: Mutex::new(HeadInner {
                state: HeadState::Uninitialized,
                next_index: 0,
            }),
        }
    }

    /// Restore an already-advanced chain (recovery path).
    pub fn resume(head: Commitment, next_index: u64) -> Self {
        Self {
            head: Mutex::new(HeadInner {
                state: HeadState::Active(head),
                next_index,
            }),
        }
    }

    /// Anchor the chain at its genesis commitment. Legal exactly once.
    pub fn initialize(&self, genesis: Commitment) -> Result<()> {
        let mut inner = self.head.lock().unwrap_or_else(|e| e.into_inner());
        match inner.state {
            HeadState::Uninitialized => {
                inner.state = HeadState::Active(genesis);
                tracing::info!(%genesis, "chain initialized");
                Ok(())
            }
            HeadState::Active(_) => Err(EngineError::AlreadyInitialized),
        }
    }

    /// The live head, if the chain has been initialized.
    pub fn head(&self) -> Option<Commitment> {
        let inner = self.head.lock().unwrap_or_else(|e| e.into_inner());
        match inner.state {
            HeadState::Uninitialized => None,
            HeadState::Active(head) => Some(head),
        }
    }

    /// Number of steps executed so far.
    pub fn step_count(&self) -> u64 {
        let inner = self.head.lock().unwrap_or_else(|e| e.into_inner());
        inner.next_index
    }

    /// Execute one chain step. The head lock is held across the whole step:
    /// `chain` is a read-modify-write of a single shared head, and two
    /// concurrent calls must be serialized so both cannot succeed from the
    /// same prior.
    pub fn chain<E: Evaluator>(
        &self,
        engine: &CommitmentEngine,
        evaluator: &E,
        expected_prior: Commitment,
        input: Value,
    ) -> Result<StepRecord> {
        let mut inner = self.head.lock().unwrap_or_else(|e| e.into_inner());

        let actual = match inner.state {
            HeadState::Uninitialized => return Err(EngineError::Uninitialized),
            HeadState::Active(head) => head,
        };
        if actual != expected_prior {
            return Err(EngineError::HeadMismatch {
                expected: expected_prior,
                actual,
            });
        }

        let payload = engine.open(&actual)?;
        let applied = evaluator.apply(&payload, &input)?;
        let new_head = engine.commit(applied.next)?;

        // Every fallible step is behind us; advance the head.
        inner.state = HeadState::Active(new_head);
        let index = inner.next_index;
        inner.next_index += 1;

        tracing::info!(step = index, prior = %expected_prior, head = %new_head, "chain step committed");

        Ok(StepRecord {
            index,
            prior: expected_prior,
            input,
            output: applied.output,
            new_head,
            trace: applied.trace,
        })
    }
}

impl Default for ChainController {
    fn default() -> Self {
        Self::new()
    }
}
