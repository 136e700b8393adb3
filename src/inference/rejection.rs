//! Exact rejection sampling.
//!
//! Each trial simulates the whole support from the priors and is kept only
//! if every observed node reproduced its evidence exactly. Trial `t` always
//! draws from the stream derived from `(seed, t)`, so the accepted sequence is
//! a function of the graph and the seed alone.

use super::{InferenceError, InferenceJob, InferenceResult, Sampler};
use crate::compute::engine::Engine;
use crate::compute::rng::trial_stream;
use crate::evidence::Evidence;
use crate::type_system::Value;
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info, trace, warn};

/// Trials after which a persistently tiny acceptance rate is reported.
const SLOW_PROGRESS_TRIALS: u64 = 1_000_000;
const SLOW_PROGRESS_RATE: f64 = 1e-4;

#[derive(Debug, Clone, Copy, Default)]
pub struct RejectionSampler;

impl RejectionSampler {
    /// Simulates trial `trial` and returns its queried values if accepted.
    fn run_trial(job: &InferenceJob<'_>, trial: u64) -> Result<Option<Vec<Value>>, InferenceError> {
        let mut rng = trial_stream(job.seed, trial);
        let outcome = Engine::run(job.program, &mut rng)?;

        if !job.evidence.accepts(&outcome.ledger) {
            return Ok(None);
        }

        if job.program.has_factors() {
            if outcome.log_weight > 0.0 {
                return Err(InferenceError::FactorWeightAboveOne { trial, log_weight: outcome.log_weight });
            }
            // Keep the trial with probability exp(log_weight).
            if rng.gen::<f64>() >= outcome.log_weight.exp() {
                return Ok(None);
            }
        }

        Ok(Some(job.evidence.collect(&outcome.ledger)?))
    }
}

impl Sampler for RejectionSampler {
    /// Exact matching only has positive probability on countable domains.
    fn validate(&self, evidence: &Evidence) -> Result<(), InferenceError> {
        for (node, value) in evidence.observations() {
            let ty = value.atomic_type();
            if !ty.is_discrete() {
                return Err(InferenceError::ContinuousEvidence { node, ty });
            }
        }
        Ok(())
    }

    fn run(&self, job: &InferenceJob<'_>) -> Result<InferenceResult, InferenceError> {
        let queries = job.evidence.queries().len();
        let batch = job.config.batch_size.max(1);
        let mut result = InferenceResult::new(queries, job.num_samples);
        let mut trial: u64 = 0;
        let mut warned = false;

        info!(
            samples = job.num_samples,
            queries,
            seed = job.seed,
            batch,
            steps = job.program.steps.len(),
            "rejection sampling started"
        );

        while result.accepted < job.num_samples {
            // 1. Size the round, honouring the trial budget.
            let round = match job.config.max_trials {
                Some(max) if trial >= max => {
                    return Err(InferenceError::TrialBudgetExhausted { max_trials: max, accepted: result.accepted });
                }
                Some(max) => (batch as u64).min(max - trial) as usize,
                None => batch,
            };

            // 2. Simulate. Rounds larger than one run on the rayon pool; each
            // trial owns its stream, so scheduling cannot change the outcome.
            let start = trial;
            let outcomes: Vec<_> = if round == 1 {
                vec![Self::run_trial(job, start)]
            } else {
                (0..round)
                    .into_par_iter()
                    .map(|i| Self::run_trial(job, start + i as u64))
                    .collect()
            };

            // 3. Accept in trial order; anything past the last needed sample is discarded.
            for outcome in outcomes {
                trial += 1;
                if let Some(values) = outcome? {
                    trace!(trial = trial - 1, "trial accepted");
                    result.push(values);
                    if result.accepted == job.num_samples {
                        break;
                    }
                }
            }

            if !warned && trial >= SLOW_PROGRESS_TRIALS {
                let rate = result.accepted as f64 / trial as f64;
                if rate < SLOW_PROGRESS_RATE {
                    warn!(trial, accepted = result.accepted, rate, "evidence is rarely reproduced; rejection may not terminate");
                    warned = true;
                }
            }
        }

        result.trials = trial;
        debug!(trials = trial, "rejection loop finished");
        info!(
            accepted = result.accepted,
            trials = result.trials,
            rate = result.acceptance_rate(),
            "rejection sampling finished"
        );
        Ok(result)
    }
}
