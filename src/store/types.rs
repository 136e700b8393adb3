use crate::type_system::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense, creation-ordered node identifier. Ids start at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistributionType {
    Bernoulli,
    Beta,
    Binomial,
    Normal,
    Gamma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorType {
    /// The stochastic draw from a single distribution parent.
    Sample,
    ToReal,
    ToPosReal,
    Complement,
    Negate,
    Exp,
    Log,
    Add,
    Multiply,
    Logistic,
    IfThenElse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactorType {
    /// Contributes the product of its parents to the joint log-density.
    ExpProduct,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Constant(Value),
    Distribution(DistributionType),
    Operator(OperatorType),
    Factor(FactorType),
}

impl NodeKind {
    /// Whether the node yields a per-trial value that children may read.
    pub fn produces_value(&self) -> bool {
        matches!(self, NodeKind::Constant(_) | NodeKind::Operator(_))
    }

    pub fn is_sample(&self) -> bool { matches!(self, NodeKind::Operator(OperatorType::Sample)) }
}
