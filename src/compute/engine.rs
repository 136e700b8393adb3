use crate::compute::bytecode::{Program, Step};
use crate::compute::ledger::{ComputationError, Ledger};
use crate::compute::rng::TrialRng;
use crate::store::{FactorType, NodeId};
use crate::type_system::Value;
use smallvec::SmallVec;

/// The result of one forward simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub ledger: Ledger,
    /// Sum of all factor log-weights; zero when the program has no factors.
    pub log_weight: f64,
}

pub struct Engine;

impl Engine {
    /// Runs one trial: clones the constant template, then executes the tape
    /// in order. Observed nodes are simulated like any other node.
    pub fn run(program: &Program, rng: &mut TrialRng) -> Result<Trial, ComputationError> {
        let mut ledger = program.template.clone();
        let mut log_weight = 0.0;

        for step in &program.steps {
            match step {
                Step::Sample { target, family, output, params } => {
                    let values = Self::gather_params(&ledger, params)?;
                    let drawn = family.sample(&values, *output, rng);
                    ledger.insert(*target, drawn);
                }
                Step::Apply { target, op, output, args } => {
                    let values = Self::gather(&ledger, args)?;
                    ledger.insert(*target, op.apply(&values, *output));
                }
                Step::Factor { kind, args, .. } => {
                    let values = Self::gather(&ledger, args)?;
                    log_weight += factor_log_weight(*kind, &values);
                }
            }
        }

        Ok(Trial { ledger, log_weight })
    }

    /// Like `gather`, but every parameter must lie in its domain. Operator
    /// results are not checked when written, so overflow or NaN shows up here.
    fn gather_params(ledger: &Ledger, ids: &[NodeId]) -> Result<SmallVec<[Value; 4]>, ComputationError> {
        ids.iter()
            .map(|&id| {
                let value = ledger.read(id)?;
                value.validate().map_err(|_| ComputationError::Domain { node: id, value })
            })
            .collect()
    }

    #[inline]
    fn gather(ledger: &Ledger, ids: &[NodeId]) -> Result<SmallVec<[Value; 4]>, ComputationError> {
        ids.iter().map(|&id| ledger.read(id)).collect()
    }
}

pub fn factor_log_weight(kind: FactorType, args: &[Value]) -> f64 {
    match kind {
        FactorType::ExpProduct => args.iter().map(Value::as_f64).product(),
    }
}
