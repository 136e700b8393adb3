use super::special::{ln_beta, standard_gamma, xlny};
use super::Distribution;
use crate::compute::rng::TrialRng;
use crate::type_system::{AtomicType, Signature, Value};

/// Beta(alpha, beta) over [0, 1], sampled as a ratio of Gamma draws.
#[derive(Debug, Clone)]
pub struct Beta {
    signature: Signature,
}

impl Beta {
    pub fn new() -> Self {
        Self {
            signature: Signature::new(&[AtomicType::PosReal, AtomicType::PosReal], &[AtomicType::Probability]),
        }
    }
}

impl Default for Beta {
    fn default() -> Self { Self::new() }
}

impl Distribution for Beta {
    fn signature(&self) -> &Signature { &self.signature }

    fn sample(&self, params: &[Value], output: AtomicType, rng: &mut TrialRng) -> Value {
        let (a, b) = (params[0].as_f64(), params[1].as_f64());
        let x = standard_gamma(a, rng);
        let y = standard_gamma(b, rng);
        let total = x + y;
        // Both draws can underflow for tiny shapes.
        let p = if total > 0.0 { x / total } else { 0.5 };
        Value::from_f64(output, p)
    }

    fn log_density(&self, value: &Value, params: &[Value]) -> f64 {
        let (a, b) = (params[0].as_f64(), params[1].as_f64());
        let x = value.as_f64();
        if !(0.0..=1.0).contains(&x) {
            return f64::NEG_INFINITY;
        }
        xlny(a - 1.0, x) + xlny(b - 1.0, 1.0 - x) - ln_beta(a, b)
    }
}
