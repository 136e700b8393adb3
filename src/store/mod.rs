//! Node storage: identifiers, node kinds and the columnar arena.
pub mod registry;
pub mod types;

pub use registry::Registry;
pub use types::{DistributionType, FactorType, NodeId, NodeKind, OperatorType};
