//! A Bayesian graphical-model engine.
//!
//! Models are built as an append-only DAG of constants, distributions,
//! operators and factors ([`Graph`]). Evidence is bound to sample nodes,
//! queries name the nodes to collect, and [`Graph::infer`] dispatches to a
//! registered sampler. The built-in sampler is exact rejection sampling.

pub mod analysis;
pub mod compute;
pub mod display;
pub mod distribution;
pub mod evidence;
pub mod graph;
pub mod inference;
pub mod store;
pub mod type_system;

pub use graph::{Graph, GraphError};
pub use inference::{InferConfig, InferenceError, InferenceResult, InferenceType};
pub use store::{DistributionType, FactorType, NodeId, NodeKind, OperatorType};
pub use type_system::{AtomicType, TypeError, Value};
