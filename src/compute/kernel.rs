//! Deterministic operators.
//!
//! Each operator owns its type-inference rule and its pure evaluation
//! function. The stochastic `Sample` operator is structural and handled by the
//! graph and the compiler directly; it has no entry here.

use crate::store::OperatorType;
use crate::type_system::checker::{check_arity, unary_operand, uniform_operand};
use crate::type_system::{Arity, AtomicType, TypeError, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use AtomicType::*;

pub trait Operator: Send + Sync + fmt::Debug {
    /// Validates parent types and returns the output type.
    fn infer_type(&self, operands: &[AtomicType]) -> Result<AtomicType, TypeError>;

    /// Applies the operator to already-evaluated parent values.
    fn apply(&self, args: &[Value], output: AtomicType) -> Value;
}

#[derive(Debug, Clone)]
pub struct OperatorLibrary {
    operators: HashMap<OperatorType, Arc<dyn Operator>>,
}

impl Default for OperatorLibrary {
    fn default() -> Self {
        let mut lib = Self::empty();
        lib.register(OperatorType::ToReal, ToReal);
        lib.register(OperatorType::ToPosReal, ToPosReal);
        lib.register(OperatorType::Complement, Complement);
        lib.register(OperatorType::Negate, Negate);
        lib.register(OperatorType::Exp, Exp);
        lib.register(OperatorType::Log, Log);
        lib.register(OperatorType::Add, Add);
        lib.register(OperatorType::Multiply, Multiply);
        lib.register(OperatorType::Logistic, Logistic);
        lib.register(OperatorType::IfThenElse, IfThenElse);
        lib
    }
}

impl OperatorLibrary {
    pub fn new() -> Self { Self::default() }

    pub fn empty() -> Self { Self { operators: HashMap::new() } }

    pub fn register(&mut self, kind: OperatorType, op: impl Operator + 'static) -> Option<Arc<dyn Operator>> {
        self.operators.insert(kind, Arc::new(op))
    }

    pub fn get(&self, kind: OperatorType) -> Option<&Arc<dyn Operator>> { self.operators.get(&kind) }
}

// --- Conversions ---

#[derive(Debug)]
struct ToReal;

impl Operator for ToReal {
    fn infer_type(&self, operands: &[AtomicType]) -> Result<AtomicType, TypeError> {
        unary_operand("ToReal", operands, &[Real, PosReal, Probability, Natural, Boolean])?;
        Ok(Real)
    }
    fn apply(&self, args: &[Value], _: AtomicType) -> Value { Value::Real(args[0].as_f64()) }
}

/// Reinterprets a non-negative value as a positive real. A zero operand
/// yields `PosReal(0.0)`, which lies outside the domain; the simulator
/// rejects it when a distribution reads it as a parameter.
#[derive(Debug)]
struct ToPosReal;

impl Operator for ToPosReal {
    fn infer_type(&self, operands: &[AtomicType]) -> Result<AtomicType, TypeError> {
        unary_operand("ToPosReal", operands, &[PosReal, Probability, Natural])?;
        Ok(PosReal)
    }
    fn apply(&self, args: &[Value], _: AtomicType) -> Value { Value::PosReal(args[0].as_f64()) }
}

// --- Unary arithmetic ---

/// `1 - p` for probabilities, logical not for booleans.
#[derive(Debug)]
struct Complement;

impl Operator for Complement {
    fn infer_type(&self, operands: &[AtomicType]) -> Result<AtomicType, TypeError> {
        unary_operand("Complement", operands, &[Probability, Boolean])
    }
    fn apply(&self, args: &[Value], _: AtomicType) -> Value {
        match args[0] {
            Value::Boolean(b) => Value::Boolean(!b),
            other => Value::Probability(1.0 - other.as_f64()),
        }
    }
}

#[derive(Debug)]
struct Negate;

impl Operator for Negate {
    fn infer_type(&self, operands: &[AtomicType]) -> Result<AtomicType, TypeError> {
        unary_operand("Negate", operands, &[Real])
    }
    fn apply(&self, args: &[Value], _: AtomicType) -> Value { Value::Real(-args[0].as_f64()) }
}

#[derive(Debug)]
struct Exp;

impl Operator for Exp {
    fn infer_type(&self, operands: &[AtomicType]) -> Result<AtomicType, TypeError> {
        unary_operand("Exp", operands, &[Real, PosReal])?;
        Ok(PosReal)
    }
    fn apply(&self, args: &[Value], _: AtomicType) -> Value { Value::PosReal(args[0].as_f64().exp()) }
}

#[derive(Debug)]
struct Log;

impl Operator for Log {
    fn infer_type(&self, operands: &[AtomicType]) -> Result<AtomicType, TypeError> {
        unary_operand("Log", operands, &[PosReal])?;
        Ok(Real)
    }
    fn apply(&self, args: &[Value], _: AtomicType) -> Value { Value::Real(args[0].as_f64().ln()) }
}

#[derive(Debug)]
struct Logistic;

impl Operator for Logistic {
    fn infer_type(&self, operands: &[AtomicType]) -> Result<AtomicType, TypeError> {
        unary_operand("Logistic", operands, &[Real])?;
        Ok(Probability)
    }
    fn apply(&self, args: &[Value], _: AtomicType) -> Value {
        Value::Probability(1.0 / (1.0 + (-args[0].as_f64()).exp()))
    }
}

// --- Variadic arithmetic ---

#[derive(Debug)]
struct Add;

impl Operator for Add {
    fn infer_type(&self, operands: &[AtomicType]) -> Result<AtomicType, TypeError> {
        check_arity("Add", Arity::AtLeast(2), operands.len())?;
        uniform_operand("Add", operands, &[Real, PosReal, Natural])
    }
    fn apply(&self, args: &[Value], output: AtomicType) -> Value {
        if output == Natural {
            let sum = args.iter().fold(0u64, |acc, v| acc.saturating_add(v.as_natural().unwrap_or(0)));
            return Value::Natural(sum);
        }
        Value::from_f64(output, args.iter().map(Value::as_f64).sum())
    }
}

#[derive(Debug)]
struct Multiply;

impl Operator for Multiply {
    fn infer_type(&self, operands: &[AtomicType]) -> Result<AtomicType, TypeError> {
        check_arity("Multiply", Arity::AtLeast(2), operands.len())?;
        uniform_operand("Multiply", operands, &[Real, PosReal, Probability, Natural])
    }
    fn apply(&self, args: &[Value], output: AtomicType) -> Value {
        if output == Natural {
            let product = args.iter().fold(1u64, |acc, v| acc.saturating_mul(v.as_natural().unwrap_or(0)));
            return Value::Natural(product);
        }
        Value::from_f64(output, args.iter().map(Value::as_f64).product())
    }
}

// --- Control ---

/// `IfThenElse(cond, a, b)`; both branches must share a type.
#[derive(Debug)]
struct IfThenElse;

impl Operator for IfThenElse {
    fn infer_type(&self, operands: &[AtomicType]) -> Result<AtomicType, TypeError> {
        check_arity("IfThenElse", Arity::Exactly(3), operands.len())?;
        if operands[0] != Boolean || operands[1] != operands[2] {
            return Err(TypeError::OperandType { what: "IfThenElse".into(), actual: operands.to_vec() });
        }
        Ok(operands[1])
    }
    fn apply(&self, args: &[Value], _: AtomicType) -> Value {
        if args[0].as_bool().unwrap_or(false) { args[1] } else { args[2] }
    }
}
