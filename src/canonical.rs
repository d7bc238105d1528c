// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Canonical Encoding
//!
//! The single deterministic codec for everything the engine hashes:
//! payloads, values, claims, proofs. Same input, same bytes, on any
//! architecture — this is what lets a verifier recompute a commitment
//! independently of the engine that produced it.
//!
//! # Invariants
//! - bincode standard config, serde mode, nothing else
//! - Environments serialize in key order (`BTreeMap`)
//! - Payloads beyond the nesting or size caps are not canonically
//!   encodable and fail with `Serialization`

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{EngineError, Result};
use crate::expr::Expr;
use crate::value::{Payload, Value};

/// Maximum nesting depth of a canonically encodable payload or value.
pub const MAX_NESTING_DEPTH: usize = 512;

/// Maximum canonical size of a single payload.
pub const MAX_PAYLOAD_BYTES: usize = 1 << 20;

/// Encode with the canonical bincode configuration.
pub(crate) fn encode<T: Serialize>(value: &T) -> std::result::Result<Vec<u8>, String> {
    bincode::serde::encode_to_vec(value, bincode::config::standard()).map_err(|e| e.to_string())
}

/// Decode a full buffer. Trailing bytes are an error: a canonical encoding
/// is exactly one value, nothing more.
pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> std::result::Result<T, String> {
    let (value, read) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .map_err(|e| e.to_string())?;
    if read != bytes.len() {
        return Err(format!("trailing bytes after canonical value ({} unread)", bytes.len() - read));
    }
    Ok(value)
}

/// BLAKE3 over a canonical byte string.
pub fn digest(bytes: &[u8]) -> [u8; 32] {
    *blake3::hash(bytes).as_bytes()
}

/// Encode-and-hash helper for digest fields (trace boundaries, proof ids).
pub(crate) fn try_digest<T: Serialize>(value: &T) -> std::result::Result<[u8; 32], String> {
    Ok(digest(&encode(value)?))
}

/// Canonically encode a payload, enforcing the representability caps.
pub fn encode_payload(payload: &Payload) -> Result<Vec<u8>> {
    if !payload_depth_ok(payload, MAX_NESTING_DEPTH) {
        return Err(EngineError::Serialization(
            "payload exceeds canonical nesting depth".into(),
        ));
    }
    let bytes = encode(payload).map_err(EngineError::Serialization)?;
    if bytes.len() > MAX_PAYLOAD_BYTES {
        return Err(EngineError::Serialization(format!(
            "payload exceeds canonical size cap ({} bytes)",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Decode a canonical payload encoding.
pub fn decode_payload(bytes: &[u8]) -> Result<Payload> {
    decode(bytes).map_err(EngineError::Serialization)
}

fn payload_depth_ok(payload: &Payload, budget: usize) -> bool {
    if budget == 0 {
        return false;
    }
    expr_depth_ok(&payload.body, budget - 1)
        && payload.env.0.values().all(|v| value_depth_ok(v, budget - 1))
}

fn value_depth_ok(value: &Value, budget: usize) -> bool {
    if budget == 0 {
        return false;
    }
    match value {
        Value::Nil | Value::Num(_) | Value::Bool(_) => true,
        Value::Pair(a, b) => value_depth_ok(a, budget - 1) && value_depth_ok(b, budget - 1),
        Value::Closure(payload) => payload_depth_ok(payload, budget - 1),
    }
}

fn expr_depth_ok(expr: &Expr, budget: usize) -> bool {
    if budget == 0 {
        return false;
    }
    match expr {
        Expr::Nil | Expr::Num(_) | Expr::Bool(_) | Expr::Var(_) | Expr::SelfRef => true,
        Expr::Add(a, b)
        | Expr::Sub(a, b)
        | Expr::Mul(a, b)
        | Expr::Eq(a, b)
        | Expr::Lt(a, b)
        | Expr::Pair(a, b) => expr_depth_ok(a, budget - 1) && expr_depth_ok(b, budget - 1),
        Expr::If { cond, then, other } => {
            expr_depth_ok(cond, budget - 1)
                && expr_depth_ok(then, budget - 1)
                && expr_depth_ok(other, budget - 1)
        }
        Expr::Let { value, body, .. } => {
            expr_depth_ok(value, budget - 1) && expr_depth_ok(body, budget - 1)
        }
        Expr::Lambda { body, .. } => expr_depth_ok(body, budget - 1),
        Expr::Apply { func, arg } => {
            expr_depth_ok(func, budget - 1) && expr_depth_ok(arg, budget - 1)
        }
        Expr::First(e) | Expr::Second(e) => expr_depth_ok(e, budget - 1),
    }
}
