// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Values and committed payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::expr::Expr;

/// Captured lexical environment.
///
/// Backed by a `BTreeMap` so the canonical encoding is independent of
/// binding insertion order: the same set of bindings always serializes to
/// the same bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Env(pub BTreeMap<String, Value>);

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, name: impl Into<String>, value: Value) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The representable value subset: everything here is canonically
/// encodable (up to the nesting-depth cap enforced at commit time).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Nil,
    Num(i64),
    Bool(bool),
    Pair(Box<Value>, Box<Value>),
    Closure(Box<Payload>),
}

impl Value {
    pub fn pair(a: Value, b: Value) -> Self {
        Value::Pair(Box::new(a), Box::new(b))
    }

    pub fn closure(payload: Payload) -> Self {
        Value::Closure(Box::new(payload))
    }

    /// Value kind name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Num(_) => "number",
            Value::Bool(_) => "bool",
            Value::Pair(_, _) => "pair",
            Value::Closure(_) => "closure",
        }
    }

    pub fn as_num(&self) -> Option<i64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn into_closure(self) -> Option<Payload> {
        match self {
            Value::Closure(payload) => Some(*payload),
            _ => None,
        }
    }
}

/// The committed value: a function definition paired with its captured
/// lexical environment. Opaque to the Chain Controller; only the Evaluator
/// Oracle interprets `body`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub param: String,
    pub body: Expr,
    pub env: Env,
}

impl Payload {
    pub fn new(param: impl Into<String>, body: Expr, env: Env) -> Self {
        Self {
            param: param.into(),
            body,
            env,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_encoding_is_insertion_order_independent() {
        let forward = Env::new()
            .bind("a", Value::Num(1))
            .bind("b", Value::Num(2));
        let reverse = Env::new()
            .bind("b", Value::Num(2))
            .bind("a", Value::Num(1));

        let bytes1 = bincode::serde::encode_to_vec(&forward, bincode::config::standard()).unwrap();
        let bytes2 = bincode::serde::encode_to_vec(&reverse, bincode::config::standard()).unwrap();

        assert_eq!(bytes1, bytes2, "Env encoding must not depend on layout");
    }

    #[test]
    fn test_payload_roundtrip() {
        let payload = Payload::new(
            "input",
            Expr::pair(Expr::var("input"), Expr::SelfRef),
            Env::new().bind("count", Value::Num(0)),
        );

        let bytes = bincode::serde::encode_to_vec(&payload, bincode::config::standard()).unwrap();
        let (decoded, _): (Payload, _) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard()).unwrap();

        assert_eq!(payload, decoded);
    }
}
