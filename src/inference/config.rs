//! Inference configuration.
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid inference config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("batch_size must be at least 1")]
    ZeroBatch,
}

/// Knobs shared by all samplers. Every field has a default, so a config file
/// only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferConfig {
    /// Trials simulated per round. `1` runs strictly sequentially; larger
    /// values simulate each round on the rayon pool. Results do not depend
    /// on this value.
    pub batch_size: usize,
    /// Upper bound on simulated trials. `None` means unbounded: evidence
    /// with vanishing prior probability then never terminates.
    pub max_trials: Option<u64>,
}

impl Default for InferConfig {
    fn default() -> Self { Self { batch_size: 1, max_trials: None } }
}

impl InferConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatch);
        }
        Ok(self)
    }
}
