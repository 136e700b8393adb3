use super::Distribution;
use crate::compute::rng::TrialRng;
use crate::type_system::{AtomicType, Signature, Value};
use rand::Rng;

#[derive(Debug, Clone)]
pub struct Bernoulli {
    signature: Signature,
}

impl Bernoulli {
    pub fn new() -> Self {
        Self { signature: Signature::new(&[AtomicType::Probability], &[AtomicType::Boolean]) }
    }
}

impl Default for Bernoulli {
    fn default() -> Self { Self::new() }
}

impl Distribution for Bernoulli {
    fn signature(&self) -> &Signature { &self.signature }

    fn sample(&self, params: &[Value], _output: AtomicType, rng: &mut TrialRng) -> Value {
        Value::Boolean(rng.gen_bool(params[0].as_f64().clamp(0.0, 1.0)))
    }

    fn log_density(&self, value: &Value, params: &[Value]) -> f64 {
        let p = params[0].as_f64();
        match value.as_bool() {
            Some(true) => p.ln(),
            Some(false) => (1.0 - p).ln(),
            None => f64::NEG_INFINITY,
        }
    }
}
