//! dag.rs
//! Wraps the low-level Registry with the typed builder surface, the evidence
//! set and the inference entry points.

use super::error::GraphError;
use crate::analysis::topology;
use crate::compute::engine::{factor_log_weight, Engine, Trial};
use crate::compute::kernel::OperatorLibrary;
use crate::compute::rng::trial_stream;
use crate::compute::{Compiler, ComputationError, Ledger, Program};
use crate::distribution::DistributionLibrary;
use crate::evidence::Evidence;
use crate::inference::{AlgorithmRegistry, InferConfig, InferenceError, InferenceJob, InferenceResult, InferenceType, Sampler};
use crate::store::{DistributionType, FactorType, NodeId, NodeKind, OperatorType, Registry};
use crate::type_system::checker::check_arity;
use crate::type_system::{Arity, AtomicType, TypeError, Value};
use std::sync::Arc;
use tracing::debug;

/// A Bayesian network under construction.
///
/// Nodes are append-only and every parent must already exist, so id order is
/// a topological order. The first call to [`Graph::infer`] seals the graph;
/// from then on every builder call fails with [`GraphError::Sealed`].
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub(crate) store: Registry,
    pub(crate) evidence: Evidence,
    distributions: Arc<DistributionLibrary>,
    operators: Arc<OperatorLibrary>,
    algorithms: AlgorithmRegistry,
    config: InferConfig,
    sealed: bool,
}

impl Graph {
    pub fn new() -> Self { Self::default() }

    /// A graph backed by custom distribution and operator libraries.
    pub fn with_libraries(distributions: DistributionLibrary, operators: OperatorLibrary) -> Self {
        Self { distributions: Arc::new(distributions), operators: Arc::new(operators), ..Self::default() }
    }

    pub fn with_config(mut self, config: InferConfig) -> Self {
        self.config = config;
        self
    }

    pub fn set_config(&mut self, config: InferConfig) -> Result<(), GraphError> {
        self.ensure_open()?;
        self.config = config;
        Ok(())
    }

    /// Installs (or replaces) the sampler behind an algorithm selector.
    pub fn register_algorithm(&mut self, kind: InferenceType, sampler: impl Sampler + 'static) -> Result<(), GraphError> {
        self.ensure_open()?;
        self.algorithms.register(kind, sampler);
        Ok(())
    }

    // --- Builder ---

    /// Adds a constant after checking it against its domain.
    pub fn add_constant(&mut self, value: Value) -> Result<NodeId, GraphError> {
        self.ensure_open()?;
        let value = value.validate()?;
        Ok(self.store.add_node(NodeKind::Constant(value), &[], Some(value.atomic_type())))
    }

    pub fn add_constant_bool(&mut self, value: bool) -> Result<NodeId, GraphError> { self.add_constant(Value::Boolean(value)) }
    pub fn add_constant_real(&mut self, value: f64) -> Result<NodeId, GraphError> { self.add_constant(Value::Real(value)) }
    pub fn add_constant_pos_real(&mut self, value: f64) -> Result<NodeId, GraphError> { self.add_constant(Value::PosReal(value)) }
    pub fn add_constant_probability(&mut self, value: f64) -> Result<NodeId, GraphError> { self.add_constant(Value::Probability(value)) }
    pub fn add_constant_natural(&mut self, value: u64) -> Result<NodeId, GraphError> { self.add_constant(Value::Natural(value)) }

    /// Adds a distribution node whose samples will have type `output`.
    pub fn add_distribution(
        &mut self,
        dist_type: DistributionType,
        output: AtomicType,
        parents: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        self.ensure_open()?;
        let family = self
            .distributions
            .get(dist_type)
            .ok_or(GraphError::UnknownDistribution(dist_type))?;
        let parent_types = self.value_parent_types(parents)?;
        family.signature().check(&format!("{:?}", dist_type), &parent_types, output)?;

        Ok(self.store.add_node(NodeKind::Distribution(dist_type), parents, Some(output)))
    }

    /// Adds an operator node. `Sample` draws from a single distribution parent;
    /// every other operator infers its output type from its parents.
    pub fn add_operator(&mut self, op_type: OperatorType, parents: &[NodeId]) -> Result<NodeId, GraphError> {
        self.ensure_open()?;

        let output = if op_type == OperatorType::Sample {
            check_arity("Sample", Arity::Exactly(1), parents.len())?;
            let dist = parents[0];
            self.check_parent(dist)?;
            if !matches!(self.store.kind(dist), NodeKind::Distribution(_)) {
                return Err(GraphError::NotADistribution(dist));
            }
            self.declared_type(dist)?
        } else {
            let op = self.operators.get(op_type).ok_or(GraphError::UnknownOperator(op_type))?;
            let parent_types = self.value_parent_types(parents)?;
            op.infer_type(&parent_types)?
        };

        Ok(self.store.add_node(NodeKind::Operator(op_type), parents, Some(output)))
    }

    /// Adds a factor over numeric parents. Factors produce no value; they
    /// weight the joint density.
    pub fn add_factor(&mut self, factor_type: FactorType, parents: &[NodeId]) -> Result<NodeId, GraphError> {
        self.ensure_open()?;
        let what = format!("{:?}", factor_type);
        check_arity(&what, Arity::AtLeast(1), parents.len())?;
        let parent_types = self.value_parent_types(parents)?;
        if !parent_types.iter().all(|t| t.is_numeric()) {
            return Err(TypeError::OperandType { what, actual: parent_types }.into());
        }
        Ok(self.store.add_node(NodeKind::Factor(factor_type), parents, None))
    }

    // --- Evidence ---

    /// Binds evidence to a sample node.
    pub fn observe(&mut self, node: NodeId, value: impl Into<Value>) -> Result<(), GraphError> {
        self.ensure_open()?;
        let value = value.into();
        self.check_parent(node)?;
        if !self.store.kind(node).is_sample() {
            return Err(GraphError::NotASample(node));
        }
        let expected = self.declared_type(node)?;
        if value.atomic_type() != expected {
            return Err(GraphError::ObservationType { node, expected, actual: value.atomic_type() });
        }
        let value = value.validate()?;

        if !self.evidence.record_observation(node, value) {
            return Err(GraphError::AlreadyObserved(node));
        }
        Ok(())
    }

    /// Registers a node for result collection and returns its query index.
    pub fn query(&mut self, node: NodeId) -> Result<usize, GraphError> {
        self.ensure_open()?;
        self.check_parent(node)?;
        if !self.store.kind(node).produces_value() {
            return Err(GraphError::NotAValueNode(node));
        }
        Ok(self.evidence.add_query(node))
    }

    // --- Inference ---

    /// Draws `num_samples` posterior samples for every query.
    ///
    /// Input errors are reported before the graph is sealed or anything is
    /// simulated. The rejection sampler has no attempt limit unless
    /// [`InferConfig::max_trials`] is set.
    pub fn infer(
        &mut self,
        num_samples: usize,
        algorithm: InferenceType,
        seed: u64,
    ) -> Result<InferenceResult, InferenceError> {
        if num_samples == 0 {
            return Err(InferenceError::InvalidSampleCount);
        }
        let sampler = self.algorithms.get(algorithm)?;
        sampler.validate(&self.evidence)?;

        self.seal();
        let program = self.compile(&self.inference_roots())?;
        let job = InferenceJob {
            program: &program,
            evidence: &self.evidence,
            num_samples,
            seed,
            config: &self.config,
        };
        sampler.run(&job)
    }

    /// Posterior mean of every query, in query-registration order.
    pub fn infer_mean(
        &mut self,
        num_samples: usize,
        algorithm: InferenceType,
        seed: u64,
    ) -> Result<Vec<f64>, InferenceError> {
        Ok(self.infer(num_samples, algorithm, seed)?.means())
    }

    /// One unconditioned forward simulation of the whole graph, using the
    /// stream of trial 0 for `seed`. Does not seal the graph.
    pub fn sample_prior(&self, seed: u64) -> Result<Trial, ComputationError> {
        let program = self.compile(&topology::all_nodes(&self.store))?;
        Engine::run(&program, &mut trial_stream(seed, 0))
    }

    /// Joint log-density of a full assignment: every sample node under its
    /// distribution, plus every factor.
    pub fn log_prob(&self, ledger: &Ledger) -> Result<f64, ComputationError> {
        let mut total = 0.0;
        for idx in 0..self.store.count() {
            let node = NodeId::new(idx);
            let parents = self.store.get_parents(node);
            match self.store.kind(node) {
                NodeKind::Operator(OperatorType::Sample) => {
                    let dist = parents[0];
                    let NodeKind::Distribution(kind) = self.store.kind(dist) else { continue };
                    let family = self
                        .distributions
                        .get(*kind)
                        .ok_or_else(|| ComputationError::MissingHandler(format!("{:?}", kind)))?;
                    let params = self
                        .store
                        .get_parents(dist)
                        .iter()
                        .map(|&p| ledger.read(p))
                        .collect::<Result<Vec<_>, _>>()?;
                    total += family.log_density(&ledger.read(node)?, &params);
                }
                NodeKind::Factor(kind) => {
                    let args = parents.iter().map(|&p| ledger.read(p)).collect::<Result<Vec<_>, _>>()?;
                    total += factor_log_weight(*kind, &args);
                }
                _ => {}
            }
        }
        Ok(total)
    }

    // --- Accessors ---

    pub fn node_count(&self) -> usize { self.store.count() }
    pub fn get_node_kind(&self, id: NodeId) -> Option<&NodeKind> { self.store.kinds.get(id.index()) }
    pub fn get_parents(&self, id: NodeId) -> &[NodeId] { self.store.get_parents(id) }
    pub fn get_value_type(&self, id: NodeId) -> Option<AtomicType> { self.store.value_types.get(id.index()).copied().flatten() }
    pub fn evidence(&self) -> &Evidence { &self.evidence }
    pub fn config(&self) -> &InferConfig { &self.config }
    pub fn is_sealed(&self) -> bool { self.sealed }

    // --- Internals ---

    fn ensure_open(&self) -> Result<(), GraphError> {
        if self.sealed { Err(GraphError::Sealed) } else { Ok(()) }
    }

    fn seal(&mut self) {
        if !self.sealed {
            self.sealed = true;
            debug!(nodes = self.store.count(), "graph sealed");
        }
    }

    /// The single structural check: a referenced id must already exist, which
    /// also makes it smaller than any id about to be created.
    fn check_parent(&self, id: NodeId) -> Result<(), GraphError> {
        if self.store.contains(id) {
            Ok(())
        } else {
            Err(GraphError::UnknownNode { node: id, next: self.store.next_id() })
        }
    }

    fn declared_type(&self, id: NodeId) -> Result<AtomicType, GraphError> {
        self.store.value_type(id).ok_or(GraphError::NotAValueNode(id))
    }

    fn value_parent_types(&self, parents: &[NodeId]) -> Result<Vec<AtomicType>, GraphError> {
        parents
            .iter()
            .map(|&p| {
                self.check_parent(p)?;
                if !self.store.kind(p).produces_value() {
                    return Err(GraphError::NotAValueNode(p));
                }
                self.declared_type(p)
            })
            .collect()
    }

    /// Observed and queried nodes plus every factor.
    fn inference_roots(&self) -> Vec<NodeId> {
        let mut roots = self.evidence.roots();
        roots.extend(
            (0..self.store.count())
                .map(NodeId::new)
                .filter(|&id| matches!(self.store.kind(id), NodeKind::Factor(_))),
        );
        roots
    }

    fn compile(&self, roots: &[NodeId]) -> Result<Program, ComputationError> {
        let support = topology::support(&self.store, roots);
        let program = Compiler::new(&self.store, &self.distributions, &self.operators).compile(support)?;
        debug!(support = program.support.len(), steps = program.steps.len(), "program compiled");
        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::InferConfig;

    /// Beta(2, 3) prior on `prob`, Binomial(5, prob) likelihood on `k`.
    fn beta_binomial() -> (Graph, NodeId, NodeId) {
        let mut g = Graph::new();
        let a = g.add_constant_pos_real(2.0).unwrap();
        let b = g.add_constant_pos_real(3.0).unwrap();
        let prior = g.add_distribution(DistributionType::Beta, AtomicType::Probability, &[a, b]).unwrap();
        let prob = g.add_operator(OperatorType::Sample, &[prior]).unwrap();
        let n = g.add_constant_natural(5).unwrap();
        let like = g.add_distribution(DistributionType::Binomial, AtomicType::Natural, &[n, prob]).unwrap();
        let k = g.add_operator(OperatorType::Sample, &[like]).unwrap();
        (g, prob, k)
    }

    #[test]
    fn test_ids_are_dense_and_parents_precede_children() {
        let (g, prob, k) = beta_binomial();
        assert_eq!(g.node_count(), 7);
        assert_eq!((prob, k), (NodeId(3), NodeId(6)));
        for idx in 0..g.node_count() {
            let id = NodeId::new(idx);
            assert!(g.get_parents(id).iter().all(|p| *p < id));
        }
        assert_eq!(g.get_value_type(prob), Some(AtomicType::Probability));
        assert_eq!(g.get_value_type(k), Some(AtomicType::Natural));
    }

    #[test]
    fn test_out_of_domain_constant_adds_nothing() {
        let mut g = Graph::new();
        let err = g.add_constant_pos_real(0.0).unwrap_err();
        assert!(matches!(err, GraphError::Type(TypeError::Domain { expected: AtomicType::PosReal, .. })));
        assert!(g.add_constant_probability(1.5).is_err());
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.add_constant_real(-4.0).unwrap(), NodeId(0));
    }

    #[test]
    fn test_failed_insertions_do_not_consume_ids() {
        let mut g = Graph::new();
        let a = g.add_constant_pos_real(2.0).unwrap();

        // Arity mismatch.
        let err = g.add_distribution(DistributionType::Beta, AtomicType::Probability, &[a]).unwrap_err();
        assert!(matches!(err, GraphError::Type(TypeError::Arity { actual: 1, .. })));
        // Parameter type mismatch.
        let n = g.add_constant_natural(3).unwrap();
        let err = g.add_distribution(DistributionType::Beta, AtomicType::Probability, &[a, n]).unwrap_err();
        assert!(matches!(err, GraphError::Type(TypeError::ParameterType { index: 1, .. })));
        // Inadmissible output type.
        let err = g.add_distribution(DistributionType::Beta, AtomicType::Real, &[a, a]).unwrap_err();
        assert!(matches!(err, GraphError::Type(TypeError::OutputType { .. })));

        let next = g.add_distribution(DistributionType::Beta, AtomicType::Probability, &[a, a]).unwrap();
        assert_eq!(next, NodeId(2));
    }

    #[test]
    fn test_parent_must_exist() {
        let mut g = Graph::new();
        let a = g.add_constant_real(0.0).unwrap();
        let err = g.add_operator(OperatorType::Negate, &[NodeId(1)]).unwrap_err();
        assert_eq!(err, GraphError::UnknownNode { node: NodeId(1), next: NodeId(1) });
        assert_eq!(g.add_operator(OperatorType::Negate, &[a]).unwrap(), NodeId(1));
    }

    #[test]
    fn test_sample_requires_single_distribution_parent() {
        let (mut g, prob, _) = beta_binomial();
        assert_eq!(g.add_operator(OperatorType::Sample, &[prob]).unwrap_err(), GraphError::NotADistribution(prob));
        let err = g.add_operator(OperatorType::Sample, &[NodeId(2), NodeId(5)]).unwrap_err();
        assert!(matches!(err, GraphError::Type(TypeError::Arity { actual: 2, .. })));
    }

    #[test]
    fn test_distributions_are_not_values() {
        let (mut g, _, _) = beta_binomial();
        let prior = NodeId(2);
        let err = g.add_operator(OperatorType::ToReal, &[prior]).unwrap_err();
        assert_eq!(err, GraphError::NotAValueNode(prior));
        assert_eq!(g.query(prior).unwrap_err(), GraphError::NotAValueNode(prior));
    }

    #[test]
    fn test_operator_type_inference_on_graph() {
        let mut g = Graph::new();
        let x = g.add_constant_real(0.3).unwrap();
        let p = g.add_operator(OperatorType::Logistic, &[x]).unwrap();
        let q = g.add_operator(OperatorType::Complement, &[p]).unwrap();
        let m = g.add_operator(OperatorType::Multiply, &[p, q]).unwrap();
        assert_eq!(g.get_value_type(m), Some(AtomicType::Probability));
        assert!(g.add_operator(OperatorType::Add, &[x, p]).is_err());
        assert_eq!(g.node_count(), 4);
    }

    #[test]
    fn test_observe_rules() {
        let (mut g, prob, k) = beta_binomial();

        assert_eq!(g.observe(NodeId(4), 5u64).unwrap_err(), GraphError::NotASample(NodeId(4)));
        assert_eq!(
            g.observe(k, true).unwrap_err(),
            GraphError::ObservationType { node: k, expected: AtomicType::Natural, actual: AtomicType::Boolean }
        );
        assert!(matches!(g.observe(NodeId(99), 1u64), Err(GraphError::UnknownNode { .. })));

        g.observe(k, 2u64).unwrap();
        assert_eq!(g.observe(k, 3u64).unwrap_err(), GraphError::AlreadyObserved(k));
        assert_eq!(g.observe(k, 2u64).unwrap_err(), GraphError::AlreadyObserved(k));
        assert_eq!(g.evidence().observed_value(k), Some(&Value::Natural(2)));

        // Failed calls leave every later valid operation available.
        assert_eq!(g.query(prob).unwrap(), 0);
        assert!(g.add_constant_real(1.0).is_ok());
    }

    #[test]
    fn test_observation_domain_is_checked() {
        let (mut g, prob, _) = beta_binomial();
        let err = g.observe(prob, Value::Probability(1.2)).unwrap_err();
        assert!(matches!(err, GraphError::Type(TypeError::Domain { .. })));
        assert!(!g.evidence().is_observed(prob));
    }

    #[test]
    fn test_input_errors_do_not_seal() {
        let (mut g, prob, k) = beta_binomial();
        g.observe(k, 2u64).unwrap();
        g.query(prob).unwrap();

        assert_eq!(g.infer(0, InferenceType::Rejection, 1).unwrap_err(), InferenceError::InvalidSampleCount);
        assert_eq!(
            g.infer(10, InferenceType::Gibbs, 1).unwrap_err(),
            InferenceError::UnregisteredAlgorithm(InferenceType::Gibbs)
        );
        assert!(!g.is_sealed());
    }

    #[test]
    fn test_continuous_evidence_is_refused_by_rejection() {
        let (mut g, prob, _) = beta_binomial();
        g.observe(prob, Value::Probability(0.5)).unwrap();
        assert_eq!(
            g.infer(10, InferenceType::Rejection, 1).unwrap_err(),
            InferenceError::ContinuousEvidence { node: prob, ty: AtomicType::Probability }
        );
    }

    #[test]
    fn test_inference_seals_the_graph() {
        let (mut g, prob, _) = beta_binomial();
        g.query(prob).unwrap();
        g.infer(5, InferenceType::Rejection, 9).unwrap();

        assert!(g.is_sealed());
        assert_eq!(g.add_constant_real(1.0).unwrap_err(), GraphError::Sealed);
        assert_eq!(g.observe(NodeId(6), 1u64).unwrap_err(), GraphError::Sealed);
        assert_eq!(g.query(NodeId(6)).unwrap_err(), GraphError::Sealed);
        assert_eq!(g.set_config(InferConfig::default()).unwrap_err(), GraphError::Sealed);
        // Sealed graphs can still be queried for more samples.
        assert_eq!(g.infer(5, InferenceType::Rejection, 10).unwrap().accepted, 5);
    }

    #[test]
    fn test_custom_sampler_dispatch() {
        #[derive(Debug)]
        struct Constant;
        impl Sampler for Constant {
            fn run(&self, job: &InferenceJob<'_>) -> Result<InferenceResult, InferenceError> {
                let mut result = InferenceResult::new(job.evidence.queries().len(), job.num_samples);
                for _ in 0..job.num_samples {
                    result.push(vec![Value::Probability(0.25); job.evidence.queries().len()]);
                }
                Ok(result)
            }
        }

        let (mut g, prob, _) = beta_binomial();
        g.query(prob).unwrap();
        g.register_algorithm(InferenceType::Gibbs, Constant).unwrap();
        assert_eq!(g.infer_mean(3, InferenceType::Gibbs, 0).unwrap(), vec![0.25]);
    }

    #[test]
    fn test_unknown_family_in_custom_library() {
        let mut g = Graph::with_libraries(DistributionLibrary::empty(), OperatorLibrary::new());
        let p = g.add_constant_probability(0.5).unwrap();
        assert_eq!(
            g.add_distribution(DistributionType::Bernoulli, AtomicType::Boolean, &[p]).unwrap_err(),
            GraphError::UnknownDistribution(DistributionType::Bernoulli)
        );
        assert_eq!(
            g.add_operator(OperatorType::Negate, &[p]).unwrap_err(),
            GraphError::Type(TypeError::OperandType { what: "Negate".into(), actual: vec![AtomicType::Probability] })
        );
    }

    #[test]
    fn test_factor_parents_must_be_numeric() {
        let mut g = Graph::new();
        let flag = g.add_constant_bool(true).unwrap();
        let x = g.add_constant_real(-0.5).unwrap();
        assert!(g.add_factor(FactorType::ExpProduct, &[flag]).is_err());
        assert!(g.add_factor(FactorType::ExpProduct, &[]).is_err());
        let f = g.add_factor(FactorType::ExpProduct, &[x, x]).unwrap();
        assert_eq!(g.get_value_type(f), None);
        assert_eq!(g.query(f).unwrap_err(), GraphError::NotAValueNode(f));
    }

    #[test]
    fn test_log_prob_of_prior_sample() {
        let (g, prob, k) = beta_binomial();
        let trial = g.sample_prior(42).unwrap();
        assert!(!g.is_sealed());

        let p = trial.ledger.read(prob).unwrap().as_f64();
        let kv = trial.ledger.read(k).unwrap().as_natural().unwrap() as i32;
        // Beta(2,3) pdf: 12 p (1-p)^2; Binomial(5, p) pmf: C(5,k) p^k (1-p)^(5-k)
        let choose = [1.0, 5.0, 10.0, 10.0, 5.0, 1.0][kv as usize];
        let expected = (12.0 * p * (1.0 - p).powi(2)).ln() + (choose * p.powi(kv) * (1.0 - p).powi(5 - kv)).ln();
        assert!((g.log_prob(&trial.ledger).unwrap() - expected).abs() < 1e-9);

        // Same seed, same trial.
        assert_eq!(g.sample_prior(42).unwrap(), trial);
    }

    #[test]
    fn test_log_prob_needs_full_assignment() {
        let (g, prob, _) = beta_binomial();
        let mut ledger = Ledger::new();
        ledger.insert(prob, Value::Probability(0.5));
        assert!(matches!(g.log_prob(&ledger), Err(ComputationError::Unevaluated(_))));
    }
}
