// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Durable State Directory
//!
//! Append-only persistence for one chain instance:
//! - `commitments.log` — every committed payload
//! - `proofs.log` — every stored proof
//! - `chain.log` — genesis anchor plus one entry per executed step
//!
//! The chain log is the audit trail and the recovery truth: reopening a
//! state directory replays it to restore the head, re-deriving every
//! payload's digest along the way (which revalidates content addressing on
//! every start).
//!
//! # Guarantees
//! - Entries are fsync'd before an operation reports success
//! - Corrupted logs fail closed; a torn tail from a crash is dropped
//! - Same logs → same recovered state, on any architecture

pub mod log;

pub use log::{LogWriter, PersistError};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chain::StepRecord;
use crate::commitment::Commitment;
use crate::proof::Proof;
use crate::value::Payload;

pub const COMMITMENTS_LOG: &str = "commitments.log";
pub const PROOFS_LOG: &str = "proofs.log";
pub const CHAIN_LOG: &str = "chain.log";

const COMMITMENT_MAGIC: u32 = 0x4354_4e31; // "CTN1"
const PROOF_MAGIC: u32 = 0x4354_4e32; // "CTN2"
const CHAIN_MAGIC: u32 = 0x4354_4e33; // "CTN3"

/// One chain-log entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainEntry {
    Genesis(Commitment),
    Step(StepRecord),
}

/// Open handles to the three logs of a state directory.
pub struct StateDir {
    pub commitments: LogWriter<Payload>,
    pub proofs: LogWriter<Proof>,
    pub chain: LogWriter<ChainEntry>,
}

/// Replayed contents of a state directory, in commit order.
pub struct Recovered {
    pub payloads: Vec<Payload>,
    pub proofs: Vec<Proof>,
    pub chain: Vec<ChainEntry>,
}

impl StateDir {
    /// Open (creating if needed) the logs under `dir` and replay them.
    pub fn open(dir: impl AsRef<Path>) -> Result<(Self, Recovered), PersistError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let (commitments, payloads) =
            LogWriter::open(dir.join(COMMITMENTS_LOG), COMMITMENT_MAGIC)?;
        let (proofs, proof_entries) = LogWriter::open(dir.join(PROOFS_LOG), PROOF_MAGIC)?;
        let (chain, chain_entries) = LogWriter::open(dir.join(CHAIN_LOG), CHAIN_MAGIC)?;

        tracing::info!(
            dir = %dir.display(),
            payloads = payloads.len(),
            proofs = proof_entries.len(),
            steps = chain_entries.len(),
            "state directory opened"
        );

        Ok((
            Self {
                commitments,
                proofs,
                chain,
            },
            Recovered {
                payloads,
                proofs: proof_entries,
                chain: chain_entries,
            },
        ))
    }
}
