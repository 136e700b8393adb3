//! The distribution library: sampling and log-density primitives per family.
//!
//! Families are looked up through [`DistributionLibrary`], keyed by
//! [`DistributionType`]. The graph and the forward simulator only ever talk to
//! the [`Distribution`] trait, so a family can be added or replaced without
//! touching either.

mod bernoulli;
mod beta;
mod binomial;
mod gamma;
mod normal;
pub mod special;

pub use bernoulli::Bernoulli;
pub use beta::Beta;
pub use binomial::Binomial;
pub use gamma::Gamma;
pub use normal::Normal;

use crate::compute::rng::TrialRng;
use crate::store::DistributionType;
use crate::type_system::{AtomicType, Signature, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Capability interface of a distribution family.
///
/// `params` and `output` have already been checked against [`Distribution::signature`]
/// when the node was inserted, so implementations may read them positionally.
pub trait Distribution: Send + Sync + fmt::Debug {
    fn signature(&self) -> &Signature;

    fn sample(&self, params: &[Value], output: AtomicType, rng: &mut TrialRng) -> Value;

    /// Log-density (or log-mass) of `value`; `-inf` outside the support.
    fn log_density(&self, value: &Value, params: &[Value]) -> f64;
}

#[derive(Debug, Clone)]
pub struct DistributionLibrary {
    families: HashMap<DistributionType, Arc<dyn Distribution>>,
}

impl Default for DistributionLibrary {
    fn default() -> Self {
        let mut lib = Self::empty();
        lib.register(DistributionType::Bernoulli, Bernoulli::new());
        lib.register(DistributionType::Beta, Beta::new());
        lib.register(DistributionType::Binomial, Binomial::new());
        lib.register(DistributionType::Normal, Normal::new());
        lib.register(DistributionType::Gamma, Gamma::new());
        lib
    }
}

impl DistributionLibrary {
    /// The built-in families.
    pub fn new() -> Self { Self::default() }

    pub fn empty() -> Self { Self { families: HashMap::new() } }

    /// Installs a family, returning the handler it replaced.
    pub fn register(
        &mut self,
        kind: DistributionType,
        family: impl Distribution + 'static,
    ) -> Option<Arc<dyn Distribution>> {
        self.families.insert(kind, Arc::new(family))
    }

    pub fn get(&self, kind: DistributionType) -> Option<&Arc<dyn Distribution>> { self.families.get(&kind) }
}
