//! Error types.

use thiserror::Error;

use crate::commitment::Commitment;
use crate::eval::EvalError;
use crate::persist::PersistError;
use crate::proof::{ProofId, ProveError};

#[derive(Error, Debug)]
pub enum EngineError {
    /// The payload contains a value outside the canonically encodable subset.
    #[error("payload not canonically encodable: {0}")]
    Serialization(String),

    /// Commitment store miss.
    #[error("unknown commitment {0}")]
    UnknownCommitment(Commitment),

    /// The caller-supplied prior commitment does not match the live head.
    #[error("stale prior commitment: expected {expected}, head is {actual}")]
    HeadMismatch {
        expected: Commitment,
        actual: Commitment,
    },

    #[error("chain already initialized")]
    AlreadyInitialized,

    #[error("chain not initialized")]
    Uninitialized,

    #[error("evaluation failed: {0}")]
    Evaluation(#[from] EvalError),

    #[error("proving failed: {0}")]
    Proving(#[from] ProveError),

    /// Proof store miss. An unknown identifier is an infrastructure failure,
    /// unlike a failing proof, which is a negative `VerificationResult`.
    #[error("unknown proof identifier {0}")]
    UnknownProof(ProofId),

    #[error("no unproven step record")]
    NothingToProve,

    #[error("persistence error: {0}")]
    Persist(#[from] PersistError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
