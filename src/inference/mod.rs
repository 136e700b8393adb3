//! Inference dispatch.
//!
//! Every algorithm implements [`Sampler`] and is selected through an
//! [`AlgorithmRegistry`] keyed by [`InferenceType`]. All samplers share one
//! contract: a compiled program plus evidence in, `num_samples` values per
//! query out.

pub mod config;
pub mod rejection;

pub use config::{ConfigError, InferConfig};
pub use rejection::RejectionSampler;

use crate::compute::{ComputationError, Program};
use crate::evidence::Evidence;
use crate::store::NodeId;
use crate::type_system::{AtomicType, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InferenceType {
    Rejection,
    /// Gibbs sampling. No built-in handler.
    Gibbs,
    /// Newtonian Monte Carlo. No built-in handler.
    Nmc,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("sample count must be positive")]
    InvalidSampleCount,
    #[error("no sampler registered for {0:?}")]
    UnregisteredAlgorithm(InferenceType),
    #[error("rejection sampling needs discrete evidence, but node {node} is observed as {ty}")]
    ContinuousEvidence { node: NodeId, ty: AtomicType },
    #[error("trial {trial} has factor log-weight {log_weight} > 0; rejection needs weights of at most one")]
    FactorWeightAboveOne { trial: u64, log_weight: f64 },
    #[error("trial budget of {max_trials} exhausted with {accepted} accepted sample(s)")]
    TrialBudgetExhausted { max_trials: u64, accepted: usize },
    #[error(transparent)]
    Computation(#[from] ComputationError),
}

/// Everything a sampler needs for one `infer` call.
#[derive(Debug, Clone, Copy)]
pub struct InferenceJob<'a> {
    pub program: &'a Program,
    pub evidence: &'a Evidence,
    pub num_samples: usize,
    pub seed: u64,
    pub config: &'a InferConfig,
}

pub trait Sampler: Send + Sync + fmt::Debug {
    /// Rejects evidence the algorithm cannot handle. Runs before the graph is
    /// sealed and before any simulation.
    fn validate(&self, _evidence: &Evidence) -> Result<(), InferenceError> { Ok(()) }

    fn run(&self, job: &InferenceJob<'_>) -> Result<InferenceResult, InferenceError>;
}

#[derive(Debug, Clone)]
pub struct AlgorithmRegistry {
    samplers: HashMap<InferenceType, Arc<dyn Sampler>>,
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        let mut registry = Self { samplers: HashMap::new() };
        registry.register(InferenceType::Rejection, RejectionSampler);
        registry
    }
}

impl AlgorithmRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn register(&mut self, kind: InferenceType, sampler: impl Sampler + 'static) -> Option<Arc<dyn Sampler>> {
        self.samplers.insert(kind, Arc::new(sampler))
    }

    pub fn get(&self, kind: InferenceType) -> Result<Arc<dyn Sampler>, InferenceError> {
        self.samplers.get(&kind).cloned().ok_or(InferenceError::UnregisteredAlgorithm(kind))
    }
}

/// Accepted samples, one column per query in query-registration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceResult {
    pub samples: Vec<Vec<Value>>,
    /// Accepted trials. Tracked separately so graphs without queries still count.
    pub accepted: usize,
    /// Trials simulated, accepted or not.
    pub trials: u64,
}

impl InferenceResult {
    pub fn new(num_queries: usize, capacity: usize) -> Self {
        Self {
            samples: (0..num_queries).map(|_| Vec::with_capacity(capacity)).collect(),
            accepted: 0,
            trials: 0,
        }
    }

    /// Appends one accepted trial's queried values.
    pub fn push(&mut self, values: Vec<Value>) {
        for (column, value) in self.samples.iter_mut().zip(values) {
            column.push(value);
        }
        self.accepted += 1;
    }

    /// Arithmetic mean of each query's samples, as a real number whatever
    /// the query's type.
    pub fn means(&self) -> Vec<f64> {
        self.samples
            .iter()
            .map(|column| {
                if column.is_empty() {
                    f64::NAN
                } else {
                    column.iter().map(Value::as_f64).sum::<f64>() / column.len() as f64
                }
            })
            .collect()
    }

    pub fn acceptance_rate(&self) -> f64 {
        if self.trials == 0 { 0.0 } else { self.accepted as f64 / self.trials as f64 }
    }
}
