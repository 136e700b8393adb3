//! Defines the error types for graph construction and evidence.
use crate::store::{DistributionType, NodeId, OperatorType};
use crate::type_system::{AtomicType, TypeError};
use thiserror::Error;

/// A rejected builder call. The graph and its evidence are left exactly as
/// they were, and no id is consumed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("node {node} does not exist (next id is {next})")]
    UnknownNode { node: NodeId, next: NodeId },
    #[error("node {0} is not a distribution")]
    NotADistribution(NodeId),
    #[error("node {0} does not produce a value")]
    NotAValueNode(NodeId),
    #[error("only sample nodes can be observed; node {0} is not one")]
    NotASample(NodeId),
    #[error("node {0} is already observed")]
    AlreadyObserved(NodeId),
    #[error("observation of node {node} must be {expected}, got {actual}")]
    ObservationType { node: NodeId, expected: AtomicType, actual: AtomicType },
    #[error("no handler registered for distribution {0:?}")]
    UnknownDistribution(DistributionType),
    #[error("no handler registered for operator {0:?}")]
    UnknownOperator(OperatorType),
    #[error("graph is sealed; inference has already started")]
    Sealed,
    #[error(transparent)]
    Type(#[from] TypeError),
}
