//! Signature checks shared by distribution families and operators.
//!
//! A node is type-checked exactly once, when it is inserted. Because parents
//! always precede their children, every parent's type is already final.
use super::domain::AtomicType;
use super::error::{Arity, TypeError};

/// The static signature of a distribution family: positional parameter types
/// and the set of output types the family may be declared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<AtomicType>,
    pub outputs: Vec<AtomicType>,
}

impl Signature {
    pub fn new(params: &[AtomicType], outputs: &[AtomicType]) -> Self {
        Self { params: params.to_vec(), outputs: outputs.to_vec() }
    }

    pub fn arity(&self) -> Arity { Arity::Exactly(self.params.len()) }

    /// Verifies parent types position by position, then the requested output.
    pub fn check(&self, what: &str, parents: &[AtomicType], output: AtomicType) -> Result<(), TypeError> {
        check_arity(what, self.arity(), parents.len())?;

        for (index, (&expected, &actual)) in self.params.iter().zip(parents).enumerate() {
            if expected != actual {
                return Err(TypeError::ParameterType { what: what.to_string(), index, expected, actual });
            }
        }

        if !self.outputs.contains(&output) {
            return Err(TypeError::OutputType { what: what.to_string(), requested: output });
        }
        Ok(())
    }
}

pub fn check_arity(what: &str, expected: Arity, actual: usize) -> Result<(), TypeError> {
    if expected.admits(actual) {
        Ok(())
    } else {
        Err(TypeError::Arity { what: what.to_string(), expected, actual })
    }
}

/// Requires every operand to share one type drawn from `allowed`, and returns it.
/// Used by the variadic arithmetic operators.
pub fn uniform_operand(what: &str, operands: &[AtomicType], allowed: &[AtomicType]) -> Result<AtomicType, TypeError> {
    let first = operands.first().copied();
    match first {
        Some(ty) if allowed.contains(&ty) && operands.iter().all(|&t| t == ty) => Ok(ty),
        _ => Err(TypeError::OperandType { what: what.to_string(), actual: operands.to_vec() }),
    }
}

/// Single-operand rule: the operand must be one of `allowed`.
pub fn unary_operand(what: &str, operands: &[AtomicType], allowed: &[AtomicType]) -> Result<AtomicType, TypeError> {
    check_arity(what, Arity::Exactly(1), operands.len())?;
    if allowed.contains(&operands[0]) {
        Ok(operands[0])
    } else {
        Err(TypeError::OperandType { what: what.to_string(), actual: operands.to_vec() })
    }
}
