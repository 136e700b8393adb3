use super::special::standard_normal;
use super::Distribution;
use crate::compute::rng::TrialRng;
use crate::type_system::{AtomicType, Signature, Value};
use std::f64::consts::PI;

/// Normal(mean, sd) over the reals.
#[derive(Debug, Clone)]
pub struct Normal {
    signature: Signature,
}

impl Normal {
    pub fn new() -> Self {
        Self { signature: Signature::new(&[AtomicType::Real, AtomicType::PosReal], &[AtomicType::Real]) }
    }
}

impl Default for Normal {
    fn default() -> Self { Self::new() }
}

impl Distribution for Normal {
    fn signature(&self) -> &Signature { &self.signature }

    fn sample(&self, params: &[Value], output: AtomicType, rng: &mut TrialRng) -> Value {
        let (mean, sd) = (params[0].as_f64(), params[1].as_f64());
        Value::from_f64(output, mean + sd * standard_normal(rng))
    }

    fn log_density(&self, value: &Value, params: &[Value]) -> f64 {
        let (mean, sd) = (params[0].as_f64(), params[1].as_f64());
        let z = (value.as_f64() - mean) / sd;
        -0.5 * z * z - sd.ln() - 0.5 * (2.0 * PI).ln()
    }
}
