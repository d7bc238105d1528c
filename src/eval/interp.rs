// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Reference evaluator: a deterministic, step-budgeted reducer.
//!
//! Environment-passing reduction over [`Expr`]. Every reduction appends one
//! opcode to the trace tape, and the whole run is bounded by a step budget
//! and a recursion-depth cap, so non-terminating programs fail with a
//! budget error instead of diverging.

use crate::canonical;
use crate::expr::Expr;
use crate::value::{Env, Payload, Value};

use super::trace::{OpCode, Trace};
use super::{Applied, EvalError, Evaluated, Evaluator};

/// Default reduction budget. Generous for chained closures, small enough to
/// cut off runaway recursion quickly.
pub const DEFAULT_STEP_BUDGET: u64 = 100_000;

/// Cap on nested reductions, independent of the step budget.
const MAX_EVAL_DEPTH: usize = 1_024;

pub struct Interp {
    step_budget: u64,
}

impl Interp {
    pub fn new() -> Self {
        Self {
            step_budget: DEFAULT_STEP_BUDGET,
        }
    }

    pub fn with_budget(step_budget: u64) -> Self {
        Self { step_budget }
    }
}

impl Default for Interp {
    fn default() -> Self {
        Self::new()
    }
}

struct Machine {
    budget: u64,
    ops: Vec<OpCode>,
    /// Scope chain, outermost first. Lookup scans from the end so inner
    /// bindings shadow outer ones.
    scope: Vec<(String, Value)>,
    /// Enclosing function stack, for `SelfRef`.
    self_ctx: Vec<(String, Expr)>,
    depth: usize,
}

impl Machine {
    fn new(budget: u64, base: &Env) -> Self {
        let scope = base
            .0
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Self {
            budget,
            ops: Vec::new(),
            scope,
            self_ctx: Vec::new(),
            depth: 0,
        }
    }

    fn tick(&mut self, op: OpCode) -> Result<(), EvalError> {
        if self.budget == 0 {
            return Err(EvalError::BudgetExhausted(self.ops.len() as u64));
        }
        self.budget -= 1;
        self.ops.push(op);
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        self.scope
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| EvalError::Unbound(name.to_string()))
    }

    /// Flatten the current scope into a capture. Later bindings overwrite
    /// earlier ones, so the innermost shadowing binding wins.
    fn capture(&self) -> Env {
        let mut env = Env::new();
        for (name, value) in &self.scope {
            env.0.insert(name.clone(), value.clone());
        }
        env
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        if self.depth >= MAX_EVAL_DEPTH {
            return Err(EvalError::DepthExceeded);
        }
        self.depth += 1;
        let result = self.eval_inner(expr);
        self.depth -= 1;
        result
    }

    fn eval_inner(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Nil => {
                self.tick(OpCode::Lit)?;
                Ok(Value::Nil)
            }
            Expr::Num(n) => {
                self.tick(OpCode::Lit)?;
                Ok(Value::Num(*n))
            }
            Expr::Bool(b) => {
                self.tick(OpCode::Lit)?;
                Ok(Value::Bool(*b))
            }
            Expr::Var(name) => {
                self.tick(OpCode::Var)?;
                self.lookup(name)
            }
            Expr::Add(a, b) => {
                self.tick(OpCode::Add)?;
                let x = self.eval_num(a)?;
                let y = self.eval_num(b)?;
                x.checked_add(y).map(Value::Num).ok_or(EvalError::Overflow)
            }
            Expr::Sub(a, b) => {
                self.tick(OpCode::Sub)?;
                let x = self.eval_num(a)?;
                let y = self.eval_num(b)?;
                x.checked_sub(y).map(Value::Num).ok_or(EvalError::Overflow)
            }
            Expr::Mul(a, b) => {
                self.tick(OpCode::Mul)?;
                let x = self.eval_num(a)?;
                let y = self.eval_num(b)?;
                x.checked_mul(y).map(Value::Num).ok_or(EvalError::Overflow)
            }
            Expr::Eq(a, b) => {
                self.tick(OpCode::Eq)?;
                let x = self.eval(a)?;
                let y = self.eval(b)?;
                Ok(Value::Bool(x == y))
            }
            Expr::Lt(a, b) => {
                self.tick(OpCode::Lt)?;
                let x = self.eval_num(a)?;
                let y = self.eval_num(b)?;
                Ok(Value::Bool(x < y))
            }
            Expr::If { cond, then, other } => {
                self.tick(OpCode::If)?;
                match self.eval(cond)? {
                    Value::Bool(true) => self.eval(then),
                    Value::Bool(false) => self.eval(other),
                    v => Err(EvalError::TypeMismatch {
                        expected: "bool",
                        found: v.kind(),
                    }),
                }
            }
            Expr::Let { name, value, body } => {
                self.tick(OpCode::Let)?;
                let bound = self.eval(value)?;
                self.scope.push((name.clone(), bound));
                let result = self.eval(body);
                self.scope.pop();
                result
            }
            Expr::Lambda { param, body } => {
                self.tick(OpCode::Lambda)?;
                Ok(Value::closure(Payload::new(
                    param.clone(),
                    (**body).clone(),
                    self.capture(),
                )))
            }
            Expr::Apply { func, arg } => {
                self.tick(OpCode::Apply)?;
                let func = self.eval(func)?;
                let arg = self.eval(arg)?;
                match func {
                    Value::Closure(payload) => self.enter(*payload, arg),
                    v => Err(EvalError::TypeMismatch {
                        expected: "closure",
                        found: v.kind(),
                    }),
                }
            }
            Expr::Pair(a, b) => {
                self.tick(OpCode::Pair)?;
                let first = self.eval(a)?;
                let second = self.eval(b)?;
                Ok(Value::pair(first, second))
            }
            Expr::First(e) => {
                self.tick(OpCode::First)?;
                match self.eval(e)? {
                    Value::Pair(a, _) => Ok(*a),
                    v => Err(EvalError::TypeMismatch {
                        expected: "pair",
                        found: v.kind(),
                    }),
                }
            }
            Expr::Second(e) => {
                self.tick(OpCode::Second)?;
                match self.eval(e)? {
                    Value::Pair(_, b) => Ok(*b),
                    v => Err(EvalError::TypeMismatch {
                        expected: "pair",
                        found: v.kind(),
                    }),
                }
            }
            Expr::SelfRef => {
                self.tick(OpCode::SelfRef)?;
                let (param, body) = self
                    .self_ctx
                    .last()
                    .cloned()
                    .ok_or(EvalError::SelfOutsideFunction)?;
                Ok(Value::closure(Payload::new(param, body, self.capture())))
            }
        }
    }

    /// Enter a closure body with `arg` bound to its parameter. The body sees
    /// the closure's captured environment, not the caller's scope.
    fn enter(&mut self, payload: Payload, arg: Value) -> Result<Value, EvalError> {
        let Payload { param, body, env } = payload;
        let saved_scope = std::mem::take(&mut self.scope);
        self.scope = env.0.into_iter().collect();
        self.scope.push((param.clone(), arg));
        self.self_ctx.push((param, body.clone()));

        let result = self.eval(&body);

        self.self_ctx.pop();
        self.scope = saved_scope;
        result
    }

    fn eval_num(&mut self, expr: &Expr) -> Result<i64, EvalError> {
        match self.eval(expr)? {
            Value::Num(n) => Ok(n),
            v => Err(EvalError::TypeMismatch {
                expected: "number",
                found: v.kind(),
            }),
        }
    }

    fn into_trace(
        self,
        input_digest: [u8; 32],
        output_digest: [u8; 32],
    ) -> Trace {
        Trace {
            steps: self.ops.len() as u64,
            ops: self.ops,
            input_digest,
            output_digest,
        }
    }
}

impl Evaluator for Interp {
    fn eval(&self, expr: &Expr, env: &Env) -> Result<Evaluated, EvalError> {
        let mut machine = Machine::new(self.step_budget, env);
        let value = machine.eval(expr)?;

        let input_digest = canonical::try_digest(&(expr, env)).map_err(EvalError::Encode)?;
        let output_digest = canonical::try_digest(&value).map_err(EvalError::Encode)?;
        let trace = machine.into_trace(input_digest, output_digest);

        Ok(Evaluated { value, trace })
    }

    fn apply(&self, payload: &Payload, input: &Value) -> Result<Applied, EvalError> {
        let mut machine = Machine::new(self.step_budget, &Env::new());
        machine.tick(OpCode::Apply)?;
        let result = machine.enter(payload.clone(), input.clone())?;

        let (output, next) = match result {
            Value::Pair(output, second) => match *second {
                Value::Closure(next) => (*output, *next),
                _ => return Err(EvalError::NotChainable),
            },
            _ => return Err(EvalError::NotChainable),
        };

        let input_digest = canonical::try_digest(&(payload, input)).map_err(EvalError::Encode)?;
        let output_digest = canonical::try_digest(&(&output, &next)).map_err(EvalError::Encode)?;
        let trace = machine.into_trace(input_digest, output_digest);

        Ok(Applied {
            output,
            next,
            trace,
        })
    }
}
