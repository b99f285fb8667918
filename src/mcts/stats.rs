//! Sample statistics for tree nodes and search diagnostics.

use serde::{Deserialize, Serialize};

/// Running sample statistics over retained observations.
///
/// Mean and variance are updated incrementally (Welford) as samples arrive,
/// so they always equal the batch mean and the Bessel-corrected standard
/// deviation of `samples()`. The standard deviation is 0 below 2 samples.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SampleStats {
    samples: Vec<f64>,
    mean: f64,
    m2: f64,
}

impl SampleStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observation, returning the refreshed mean.
    pub fn push(&mut self, value: f64) -> f64 {
        self.samples.push(value);
        let n = self.samples.len() as f64;
        let delta = value - self.mean;
        self.mean += delta / n;
        self.m2 += delta * (value - self.mean);
        self.mean
    }

    /// Number of observations.
    #[must_use]
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// All observations in arrival order.
    #[must_use]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Arithmetic mean, 0 when empty.
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Bessel-corrected sample variance, 0 below 2 samples.
    #[must_use]
    pub fn variance(&self) -> f64 {
        if self.samples.len() < 2 {
            0.0
        } else {
            (self.m2 / (self.samples.len() - 1) as f64).max(0.0)
        }
    }

    /// Sample standard deviation, 0 below 2 samples.
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

/// What a tree policy sees of one tried action.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArmStats {
    /// Mean of the action's Q-value samples.
    pub mean: f64,
    /// Sample standard deviation of those samples.
    pub std_dev: f64,
    /// Times the action has been backpropagated through.
    pub visits: u32,
}

/// Statistics collected during MCTS search.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Walk → roll-out → backpropagate cycles completed.
    pub iterations: u32,

    /// State nodes added to the tree.
    pub state_nodes_created: u32,

    /// State-action nodes added to the tree.
    pub action_nodes_created: u32,

    /// Roll-outs played to a terminal position.
    pub rollouts: u32,

    /// Deepest state node a walk ended on (root = 0).
    pub max_depth: u16,

    /// Total time spent searching (microseconds).
    pub time_us: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all statistics to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Calculate iterations per second.
    #[must_use]
    pub fn iterations_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            self.iterations as f64 / (self.time_us as f64 / 1_000_000.0)
        }
    }

    /// Average number of nodes (both layers) added per iteration.
    #[must_use]
    pub fn avg_nodes_per_iteration(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            f64::from(self.state_nodes_created + self.action_nodes_created)
                / f64::from(self.iterations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_mean(xs: &[f64]) -> f64 {
        xs.iter().sum::<f64>() / xs.len() as f64
    }

    fn batch_std(xs: &[f64]) -> f64 {
        let m = batch_mean(xs);
        let ss: f64 = xs.iter().map(|x| (x - m) * (x - m)).sum();
        (ss / (xs.len() - 1) as f64).sqrt()
    }

    #[test]
    fn test_empty_and_single() {
        let mut stats = SampleStats::new();
        assert_eq!(stats.count(), 0);
        assert_eq!(stats.mean(), 0.0);
        assert_eq!(stats.std_dev(), 0.0);

        assert_eq!(stats.push(0.75), 0.75);
        assert_eq!(stats.std_dev(), 0.0);
    }

    #[test]
    fn test_matches_batch() {
        let xs = [1.0, 0.0, 0.5, 0.5, 1.0, 0.25];
        let mut stats = SampleStats::new();
        for &x in &xs {
            stats.push(x);
        }

        assert_eq!(stats.samples(), &xs);
        assert!((stats.mean() - batch_mean(&xs)).abs() < 1e-12);
        assert!((stats.std_dev() - batch_std(&xs)).abs() < 1e-12);
    }

    #[test]
    fn test_two_samples() {
        let mut stats = SampleStats::new();
        stats.push(0.0);
        stats.push(1.0);

        assert!((stats.mean() - 0.5).abs() < 1e-12);
        // sqrt(0.5)
        assert!((stats.std_dev() - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_constant_samples_zero_spread() {
        let mut stats = SampleStats::new();
        for _ in 0..10 {
            stats.push(0.3);
        }
        assert!(stats.std_dev() < 1e-12);
    }

    #[test]
    fn test_search_stats_rates() {
        let mut stats = SearchStats::new();
        assert_eq!(stats.iterations_per_second(), 0.0);
        assert_eq!(stats.avg_nodes_per_iteration(), 0.0);

        stats.iterations = 1000;
        stats.state_nodes_created = 1500;
        stats.action_nodes_created = 500;
        stats.time_us = 1_000_000;

        assert_eq!(stats.iterations_per_second(), 1000.0);
        assert_eq!(stats.avg_nodes_per_iteration(), 2.0);

        stats.reset();
        assert_eq!(stats.iterations, 0);
    }

    #[test]
    fn test_search_stats_serialization() {
        let mut stats = SearchStats::new();
        stats.rollouts = 42;

        let json = serde_json::to_string(&stats).unwrap();
        let back: SearchStats = serde_json::from_str(&json).unwrap();

        assert_eq!(back.rollouts, 42);
    }
}
