use super::special::{ln_choose, xlny};
use super::Distribution;
use crate::compute::rng::TrialRng;
use crate::type_system::{AtomicType, Signature, Value};
use rand::Rng;

/// Binomial(n, p): the number of successes among `n` independent Bernoulli(p) trials.
#[derive(Debug, Clone)]
pub struct Binomial {
    signature: Signature,
}

impl Binomial {
    pub fn new() -> Self {
        Self {
            signature: Signature::new(&[AtomicType::Natural, AtomicType::Probability], &[AtomicType::Natural]),
        }
    }
}

impl Default for Binomial {
    fn default() -> Self { Self::new() }
}

impl Distribution for Binomial {
    fn signature(&self) -> &Signature { &self.signature }

    fn sample(&self, params: &[Value], _output: AtomicType, rng: &mut TrialRng) -> Value {
        let n = params[0].as_natural().unwrap_or(0);
        let p = params[1].as_f64().clamp(0.0, 1.0);
        let successes = (0..n).filter(|_| rng.gen_bool(p)).count();
        Value::Natural(successes as u64)
    }

    fn log_density(&self, value: &Value, params: &[Value]) -> f64 {
        let n = params[0].as_natural().unwrap_or(0);
        let p = params[1].as_f64();
        match value.as_natural() {
            Some(k) if k <= n => {
                ln_choose(n, k) + xlny(k as f64, p) + xlny((n - k) as f64, 1.0 - p)
            }
            _ => f64::NEG_INFINITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::rng::trial_stream;

    #[test]
    fn test_binomial_sample_bounds_and_mean() {
        let binomial = Binomial::new();
        let params = [Value::Natural(5), Value::Probability(0.4)];
        let mut rng = trial_stream(3, 1);
        let n = 10_000;
        let mut total = 0u64;
        for _ in 0..n {
            let k = binomial.sample(&params, AtomicType::Natural, &mut rng).as_natural().unwrap();
            assert!(k <= 5);
            total += k;
        }
        let mean = total as f64 / n as f64;
        assert!((mean - 2.0).abs() < 0.05, "mean {}", mean);
    }

    #[test]
    fn test_binomial_degenerate_probabilities() {
        let binomial = Binomial::new();
        let mut rng = trial_stream(3, 2);
        let all = binomial.sample(&[Value::Natural(4), Value::Probability(1.0)], AtomicType::Natural, &mut rng);
        let none = binomial.sample(&[Value::Natural(4), Value::Probability(0.0)], AtomicType::Natural, &mut rng);
        assert_eq!((all, none), (Value::Natural(4), Value::Natural(0)));

        let params = [Value::Natural(4), Value::Probability(0.0)];
        assert!(binomial.log_density(&Value::Natural(0), &params).abs() < 1e-12);
        assert_eq!(binomial.log_density(&Value::Natural(5), &params), f64::NEG_INFINITY);
    }

    #[test]
    fn test_binomial_log_mass() {
        let binomial = Binomial::new();
        let params = [Value::Natural(5), Value::Probability(0.4)];
        let expected = (10.0 * 0.4f64.powi(2) * 0.6f64.powi(3)).ln();
        assert!((binomial.log_density(&Value::Natural(2), &params) - expected).abs() < 1e-9);
    }
}
