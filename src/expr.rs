// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Expression Forms
//!
//! The canonical expression language the Evaluator Oracle interprets.
//! The engine core never inspects these forms; it hands them to the oracle
//! and commits whatever closures come back.
//!
//! # Determinism Guarantees
//! - No timestamps
//! - No randomness
//! - No host-captured state
//! - Serialization is canonical (serde + bincode standard config)

use serde::{Deserialize, Serialize};

/// One expression form. Reduction of each form appends exactly one opcode to
/// the execution trace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    Nil,
    Num(i64),
    Bool(bool),
    Var(String),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    If {
        cond: Box<Expr>,
        then: Box<Expr>,
        other: Box<Expr>,
    },
    Let {
        name: String,
        value: Box<Expr>,
        body: Box<Expr>,
    },
    Lambda {
        param: String,
        body: Box<Expr>,
    },
    Apply {
        func: Box<Expr>,
        arg: Box<Expr>,
    },
    Pair(Box<Expr>, Box<Expr>),
    First(Box<Expr>),
    Second(Box<Expr>),
    /// A closure with the innermost enclosing function's code and the
    /// current environment captured afresh. This is the finite encoding of
    /// a committed function returning a new committed function.
    SelfRef,
}

impl Expr {
    pub fn num(n: i64) -> Self {
        Expr::Num(n)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn add(a: Expr, b: Expr) -> Self {
        Expr::Add(Box::new(a), Box::new(b))
    }

    pub fn sub(a: Expr, b: Expr) -> Self {
        Expr::Sub(Box::new(a), Box::new(b))
    }

    pub fn mul(a: Expr, b: Expr) -> Self {
        Expr::Mul(Box::new(a), Box::new(b))
    }

    pub fn eq(a: Expr, b: Expr) -> Self {
        Expr::Eq(Box::new(a), Box::new(b))
    }

    pub fn lt(a: Expr, b: Expr) -> Self {
        Expr::Lt(Box::new(a), Box::new(b))
    }

    pub fn if_(cond: Expr, then: Expr, other: Expr) -> Self {
        Expr::If {
            cond: Box::new(cond),
            then: Box::new(then),
            other: Box::new(other),
        }
    }

    pub fn let_(name: impl Into<String>, value: Expr, body: Expr) -> Self {
        Expr::Let {
            name: name.into(),
            value: Box::new(value),
            body: Box::new(body),
        }
    }

    pub fn lambda(param: impl Into<String>, body: Expr) -> Self {
        Expr::Lambda {
            param: param.into(),
            body: Box::new(body),
        }
    }

    pub fn apply(func: Expr, arg: Expr) -> Self {
        Expr::Apply {
            func: Box::new(func),
            arg: Box::new(arg),
        }
    }

    pub fn pair(a: Expr, b: Expr) -> Self {
        Expr::Pair(Box::new(a), Box::new(b))
    }

    pub fn first(e: Expr) -> Self {
        Expr::First(Box::new(e))
    }

    pub fn second(e: Expr) -> Self {
        Expr::Second(Box::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_serialization_determinism() {
        // Same expression must always encode to the same bytes.
        let expr = Expr::let_(
            "count",
            Expr::add(Expr::var("count"), Expr::var("input")),
            Expr::pair(Expr::var("count"), Expr::SelfRef),
        );

        let bytes1 = bincode::serde::encode_to_vec(&expr, bincode::config::standard()).unwrap();
        let bytes2 = bincode::serde::encode_to_vec(&expr, bincode::config::standard()).unwrap();

        assert_eq!(bytes1, bytes2, "Expression encoding must be deterministic");
    }

    #[test]
    fn test_expr_roundtrip() {
        let original = Expr::lambda("x", Expr::add(Expr::var("x"), Expr::num(1)));

        let bytes = bincode::serde::encode_to_vec(&original, bincode::config::standard()).unwrap();
        let (decoded, _): (Expr, _) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard()).unwrap();

        assert_eq!(original, decoded);
    }
}
