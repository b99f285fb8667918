//! MCTS configuration parameters.

use serde::{Deserialize, Serialize};

use crate::core::{MctsError, Result};

/// Which built-in tree policy picks among already-tried actions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Uniformly random action.
    Random,
    /// Upper confidence bound.
    #[default]
    Ucb,
    /// Most starving action under OCBA.
    Ocba,
}

/// MCTS configuration parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// UCB exploration weight `c` (default: 1.0).
    /// Higher values favor exploration over exploitation.
    pub exploration_weight: f64,

    /// Variance inflation for the OCBA policy (default: 10.0).
    /// Each action's variance is taken as `stddev² + ocba_noise / n`, which
    /// keeps freshly tried actions from looking certain.
    pub ocba_noise: f64,

    /// Tree policy used once a node's actions have all been tried.
    pub policy: PolicyKind,

    /// Random seed for the search.
    /// Same seed produces identical trees.
    pub seed: u64,

    /// Node capacity reserved up front in each arena.
    /// Only a hint; the tree grows past it.
    pub max_nodes: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration_weight: 1.0,
            ocba_noise: 10.0,
            policy: PolicyKind::Ucb,
            seed: 42,
            max_nodes: 100_000,
        }
    }
}

impl SearchConfig {
    /// Set the UCB exploration weight.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_weight = c;
        self
    }

    /// Set the OCBA variance inflation.
    pub fn with_ocba_noise(mut self, noise: f64) -> Self {
        self.ocba_noise = noise;
        self
    }

    /// Choose the tree policy.
    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the arena capacity hint.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Reject parameters that would make scores NaN or negative.
    pub fn validate(&self) -> Result<()> {
        if !self.exploration_weight.is_finite() || self.exploration_weight < 0.0 {
            return Err(MctsError::InvalidConfiguration {
                message: format!(
                    "exploration_weight must be finite and non-negative, got {}",
                    self.exploration_weight
                ),
            });
        }
        if !self.ocba_noise.is_finite() || self.ocba_noise < 0.0 {
            return Err(MctsError::InvalidConfiguration {
                message: format!(
                    "ocba_noise must be finite and non-negative, got {}",
                    self.ocba_noise
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.exploration_weight, 1.0);
        assert_eq!(config.ocba_noise, 10.0);
        assert_eq!(config.policy, PolicyKind::Ucb);
        assert_eq!(config.seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = SearchConfig::default()
            .with_exploration(2.0)
            .with_ocba_noise(1.0)
            .with_policy(PolicyKind::Ocba)
            .with_seed(123)
            .with_max_nodes(64);

        assert_eq!(config.exploration_weight, 2.0);
        assert_eq!(config.ocba_noise, 1.0);
        assert_eq!(config.policy, PolicyKind::Ocba);
        assert_eq!(config.seed, 123);
        assert_eq!(config.max_nodes, 64);
    }

    #[test]
    fn test_validate_rejects_bad_weights() {
        assert!(SearchConfig::default().with_exploration(-1.0).validate().is_err());
        assert!(SearchConfig::default().with_exploration(f64::NAN).validate().is_err());
        assert!(SearchConfig::default().with_ocba_noise(f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_serialization() {
        let config = SearchConfig::default().with_policy(PolicyKind::Random);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"policy\":\"random\""));

        let back: SearchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.policy, PolicyKind::Random);
        assert_eq!(back.seed, config.seed);
    }
}
