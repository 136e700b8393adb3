//! Scalar value domains and the tagged values that live in them.

use super::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The output domain of a node.
///
/// Every domain carries a validity predicate that is enforced whenever a
/// concrete value enters the graph (constants and observations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtomicType {
    Boolean,
    /// Any finite real number.
    Real,
    /// A finite real strictly greater than zero.
    PosReal,
    /// A real in the closed interval [0, 1].
    Probability,
    /// A non-negative integer.
    Natural,
}

impl AtomicType {
    /// Countable domains, where exact equality of two draws has non-zero probability.
    pub fn is_discrete(self) -> bool {
        matches!(self, AtomicType::Boolean | AtomicType::Natural)
    }

    pub fn is_numeric(self) -> bool { !matches!(self, AtomicType::Boolean) }
}

impl fmt::Display for AtomicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AtomicType::Boolean => "boolean",
            AtomicType::Real => "real",
            AtomicType::PosReal => "positive real",
            AtomicType::Probability => "probability",
            AtomicType::Natural => "natural",
        };
        f.write_str(name)
    }
}

/// A concrete scalar tagged with its domain. Equality is exact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Boolean(bool),
    Real(f64),
    PosReal(f64),
    Probability(f64),
    Natural(u64),
}

impl Value {
    pub fn atomic_type(&self) -> AtomicType {
        match self {
            Value::Boolean(_) => AtomicType::Boolean,
            Value::Real(_) => AtomicType::Real,
            Value::PosReal(_) => AtomicType::PosReal,
            Value::Probability(_) => AtomicType::Probability,
            Value::Natural(_) => AtomicType::Natural,
        }
    }

    /// Checks the value against its domain's validity predicate.
    pub fn validate(self) -> Result<Self, TypeError> {
        let valid = match self {
            Value::Boolean(_) | Value::Natural(_) => true,
            Value::Real(x) => x.is_finite(),
            Value::PosReal(x) => x.is_finite() && x > 0.0,
            Value::Probability(x) => (0.0..=1.0).contains(&x),
        };
        if valid {
            Ok(self)
        } else {
            Err(TypeError::Domain { expected: self.atomic_type(), value: self })
        }
    }

    /// Builds a value of a numeric domain from a raw float.
    ///
    /// Naturals are truncated, booleans are `x != 0`. No domain check is applied;
    /// runtime results are trusted to the operator that produced them.
    pub fn from_f64(ty: AtomicType, x: f64) -> Self {
        match ty {
            AtomicType::Boolean => Value::Boolean(x != 0.0),
            AtomicType::Real => Value::Real(x),
            AtomicType::PosReal => Value::PosReal(x),
            AtomicType::Probability => Value::Probability(x),
            AtomicType::Natural => Value::Natural(x.max(0.0) as u64),
        }
    }

    /// Real-valued view used for arithmetic and for posterior means.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Boolean(b) => if b { 1.0 } else { 0.0 },
            Value::Real(x) | Value::PosReal(x) | Value::Probability(x) => x,
            Value::Natural(n) => n as f64,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_natural(&self) -> Option<u64> {
        match *self {
            Value::Natural(n) => Some(n),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Boolean(b) }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self { Value::Natural(n) }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Natural(n) => write!(f, "{}", n),
            Value::Real(x) | Value::PosReal(x) | Value::Probability(x) => write!(f, "{:.4}", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Real(-3.5))]
    #[case(Value::PosReal(1e-9))]
    #[case(Value::Probability(0.0))]
    #[case(Value::Probability(1.0))]
    #[case(Value::Natural(0))]
    #[case(Value::Boolean(false))]
    fn test_valid_values_pass(#[case] value: Value) {
        assert_eq!(value.validate(), Ok(value));
    }

    #[rstest]
    #[case(Value::Real(f64::NAN))]
    #[case(Value::Real(f64::INFINITY))]
    #[case(Value::PosReal(0.0))]
    #[case(Value::PosReal(-2.0))]
    #[case(Value::Probability(1.000_001))]
    #[case(Value::Probability(-0.1))]
    fn test_out_of_domain_values_fail(#[case] value: Value) {
        match value.validate() {
            Err(TypeError::Domain { expected, .. }) => assert_eq!(expected, value.atomic_type()),
            other => panic!("Expected domain error, got {:?}", other),
        }
    }

    #[test]
    fn test_real_view() {
        assert_eq!(Value::Boolean(true).as_f64(), 1.0);
        assert_eq!(Value::Natural(7).as_f64(), 7.0);
        assert_eq!(Value::from_f64(AtomicType::Natural, 3.9), Value::Natural(3));
        assert!(AtomicType::Natural.is_discrete());
        assert!(!AtomicType::Probability.is_discrete());
    }
}
