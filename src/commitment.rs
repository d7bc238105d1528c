// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Content commitments.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// BLAKE3 digest over the canonical encoding of a payload.
///
/// Uniquely identifies the payload it was computed from; collisions are
/// cryptographically infeasible and never handled as a runtime case.
/// Rendered as `0x` followed by 64 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment(pub [u8; 32]);

impl Commitment {
    /// Length of the textual rendering: `0x` + 64 hex chars.
    pub const HEX_LEN: usize = 66;

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", self)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("malformed commitment literal")]
pub struct ParseCommitmentError;

impl FromStr for Commitment {
    type Err = ParseCommitmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix("0x").ok_or(ParseCommitmentError)?;
        let mut bytes = [0u8; 32];
        decode_hex_into(hex, &mut bytes).ok_or(ParseCommitmentError)?;
        Ok(Commitment(bytes))
    }
}

/// Decode lowercase/uppercase hex into `out`. Returns `None` unless `s` is
/// exactly `2 * out.len()` hex characters.
pub(crate) fn decode_hex_into(s: &str, out: &mut [u8]) -> Option<()> {
    if s.len() != out.len() * 2 || !s.is_ascii() {
        return None;
    }
    let raw = s.as_bytes();
    for (i, slot) in out.iter_mut().enumerate() {
        let hi = hex_val(raw[2 * i])?;
        let lo = hex_val(raw[2 * i + 1])?;
        *slot = (hi << 4) | lo;
    }
    Some(())
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
