// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Deterministic payload builders for tests and demos.

use crate::expr::Expr;
use crate::value::{Env, Payload, Value};

/// Running-counter closure: applying it to `n` yields
/// `(count + n, <closure with count := count + n>)`.
///
/// This is the canonical chain fixture: each application produces the next
/// committed generation of itself.
pub fn counter(initial: i64) -> Payload {
    let body = Expr::let_(
        "count",
        Expr::add(Expr::var("count"), Expr::var("input")),
        Expr::pair(Expr::var("count"), Expr::SelfRef),
    );
    Payload::new("input", body, Env::new().bind("count", Value::Num(initial)))
}

/// Toggle closure: ignores its input and yields
/// `(flipped, <closure with on := flipped>)`. Exercises non-numeric chain
/// state.
pub fn toggle(initial: bool) -> Payload {
    let body = Expr::let_(
        "on",
        Expr::if_(Expr::var("on"), Expr::Bool(false), Expr::Bool(true)),
        Expr::pair(Expr::var("on"), Expr::SelfRef),
    );
    Payload::new("input", body, Env::new().bind("on", Value::Bool(initial)))
}
