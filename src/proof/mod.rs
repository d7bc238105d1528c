// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Proofs of chain transitions.
//!
//! A proof binds a step record to a publicly checkable claim: applying the
//! function under `prior` to `input` yields `output` and the commitment
//! `new_head`. Its identifier is derived from its content, never from a
//! counter or a clock, so identical inputs always name the identical proof.

pub mod backend;
pub mod manager;
pub mod receipt;

pub use backend::{BackendError, BackendLimits, ProofBackend};
pub use manager::ProofManager;
pub use receipt::ReceiptBackend;

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::commitment::{decode_hex_into, Commitment};
use crate::value::Value;

/// The public claim a proof binds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub prior: Commitment,
    pub input: Value,
    pub output: Value,
    pub new_head: Commitment,
}

/// Succinct artifact plus the claim it binds. Immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub claim: Claim,
    pub artifact: Vec<u8>,
}

/// Stable textual identifier of a proof: BLAKE3 of the canonical proof
/// encoding, rendered `pf` + 64 lowercase hex characters — a fixed-format
/// token disjoint from the `0x` commitment rendering.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofId(pub [u8; 32]);

impl ProofId {
    /// Length of the textual rendering: `pf` + 64 hex chars.
    pub const TOKEN_LEN: usize = 66;
}

impl fmt::Display for ProofId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pf")?;
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ProofId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProofId({})", self)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("malformed proof identifier")]
pub struct ParseProofIdError;

impl FromStr for ProofId {
    type Err = ParseProofIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix("pf").ok_or(ParseProofIdError)?;
        let mut bytes = [0u8; 32];
        decode_hex_into(hex, &mut bytes).ok_or(ParseProofIdError)?;
        Ok(ProofId(bytes))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProveError {
    /// The step record's trace tape and step count disagree.
    #[error("malformed trace")]
    MalformedTrace,

    #[error("backend refused: {0}")]
    Backend(#[from] BackendError),

    #[error("proof encoding failed: {0}")]
    Encode(String),
}

/// Why a proof failed verification. A rejection is an expected, reportable
/// outcome — not an engine fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The artifact does not decode as a proof.
    MalformedProof,
    /// The artifact's content digest does not match the identifier it was
    /// presented under.
    IdentifierMismatch,
    /// The backend verifier rejected the claim/artifact binding.
    SealMismatch,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::MalformedProof => "malformed proof",
            RejectReason::IdentifierMismatch => "identifier mismatch",
            RejectReason::SealMismatch => "seal mismatch",
        };
        f.write_str(text)
    }
}

/// Outcome of checking a proof against its identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationResult {
    Verified(Claim),
    Rejected(RejectReason),
}

impl VerificationResult {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationResult::Verified(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proof_id_token_roundtrip() {
        let id = ProofId([0x5a; 32]);
        let token = id.to_string();

        assert_eq!(token.len(), ProofId::TOKEN_LEN);
        assert!(token.starts_with("pf"));
        assert_eq!(token.parse::<ProofId>().unwrap(), id);
    }

    #[test]
    fn test_proof_id_rejects_commitment_alphabet() {
        // A commitment literal must not parse as a proof identifier.
        let commitment_token = format!("0x{}", "ab".repeat(32));
        assert!(commitment_token.parse::<ProofId>().is_err());
    }
}
