use crate::compute::kernel::{Operator, OperatorLibrary};
use crate::compute::ledger::{ComputationError, Ledger};
use crate::distribution::{Distribution, DistributionLibrary};
use crate::store::{FactorType, NodeId, NodeKind, OperatorType, Registry};
use crate::type_system::AtomicType;
use smallvec::SmallVec;
use std::sync::Arc;

pub type Operands = SmallVec<[NodeId; 4]>;

/// One instruction of the execution tape. Every step writes only its own
/// target slot and reads only slots written by earlier steps.
#[derive(Debug, Clone)]
pub enum Step {
    Sample {
        target: NodeId,
        family: Arc<dyn Distribution>,
        output: AtomicType,
        /// Parents of the distribution node, i.e. the family's parameters.
        params: Operands,
    },
    Apply {
        target: NodeId,
        op: Arc<dyn Operator>,
        output: AtomicType,
        args: Operands,
    },
    Factor {
        target: NodeId,
        kind: FactorType,
        args: Operands,
    },
}

/// A graph lowered to a linear tape over its support.
///
/// Constants are not instructions: they are written once into `template`,
/// which every trial clones as its starting ledger.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub steps: Vec<Step>,
    pub template: Ledger,
    /// The simulated nodes, ascending.
    pub support: Vec<NodeId>,
}

impl Program {
    pub fn has_factors(&self) -> bool { self.steps.iter().any(|s| matches!(s, Step::Factor { .. })) }
}

pub struct Compiler<'a> {
    registry: &'a Registry,
    distributions: &'a DistributionLibrary,
    operators: &'a OperatorLibrary,
}

impl<'a> Compiler<'a> {
    pub fn new(registry: &'a Registry, distributions: &'a DistributionLibrary, operators: &'a OperatorLibrary) -> Self {
        Self { registry, distributions, operators }
    }

    /// Compiles the given nodes (ascending ids, closed under parents) into a program.
    ///
    /// Ascending id order is already topological, so the tape is emitted in
    /// a single forward pass without sorting.
    pub fn compile(&self, support: Vec<NodeId>) -> Result<Program, ComputationError> {
        let mut template = Ledger::with_size(self.registry.count());
        let mut steps = Vec::with_capacity(support.len());

        for &node in &support {
            let parents = self.registry.get_parents(node);
            match self.registry.kind(node) {
                NodeKind::Constant(value) => template.insert(node, *value),
                // Parameters are read by the dependent Sample steps.
                NodeKind::Distribution(_) => {}
                NodeKind::Operator(OperatorType::Sample) => {
                    let dist_node = parents[0];
                    let NodeKind::Distribution(kind) = self.registry.kind(dist_node) else {
                        return Err(ComputationError::Mismatch {
                            msg: format!("sample {} has non-distribution parent {}", node, dist_node),
                        });
                    };
                    let family = self
                        .distributions
                        .get(*kind)
                        .ok_or_else(|| ComputationError::MissingHandler(format!("{:?}", kind)))?;
                    steps.push(Step::Sample {
                        target: node,
                        family: Arc::clone(family),
                        output: self.output_type(node)?,
                        params: self.registry.get_parents(dist_node).iter().copied().collect(),
                    });
                }
                NodeKind::Operator(kind) => {
                    let op = self
                        .operators
                        .get(*kind)
                        .ok_or_else(|| ComputationError::MissingHandler(format!("{:?}", kind)))?;
                    steps.push(Step::Apply {
                        target: node,
                        op: Arc::clone(op),
                        output: self.output_type(node)?,
                        args: parents.iter().copied().collect(),
                    });
                }
                NodeKind::Factor(kind) => steps.push(Step::Factor {
                    target: node,
                    kind: *kind,
                    args: parents.iter().copied().collect(),
                }),
            }
        }

        Ok(Program { steps, template, support })
    }

    fn output_type(&self, node: NodeId) -> Result<AtomicType, ComputationError> {
        self.registry
            .value_type(node)
            .ok_or_else(|| ComputationError::Mismatch { msg: format!("node {} has no output type", node) })
    }
}
