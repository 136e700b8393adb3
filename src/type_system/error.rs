//! Defines the error types for the type system module.
use super::domain::{AtomicType, Value};
use std::fmt;
use thiserror::Error;

/// How many parents a node kind accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn admits(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// A construction-time typing violation. The offending node is never added.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("value {value:?} is outside the {expected} domain")]
    Domain { expected: AtomicType, value: Value },

    #[error("{what} takes {expected} parent(s), got {actual}")]
    Arity { what: String, expected: Arity, actual: usize },

    #[error("{what} parameter {index} must be {expected}, got {actual}")]
    ParameterType {
        what: String,
        index: usize,
        expected: AtomicType,
        actual: AtomicType,
    },

    #[error("{what} cannot produce values of type {requested}")]
    OutputType { what: String, requested: AtomicType },

    #[error("{what} does not accept operands {actual:?}")]
    OperandType { what: String, actual: Vec<AtomicType> },
}
