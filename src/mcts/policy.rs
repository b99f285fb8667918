//! MCTS policies for selection and simulation.
//!
//! Policies are trait-based to allow customization:
//! - `TreePolicy`: which tried action to descend into (random, UCB, OCBA)
//! - `RolloutPolicy`: how to play a position out to the end (random)

use crate::core::{MctsError, Player, Result, SearchRng};
use crate::rules::GameState;

use super::config::{PolicyKind, SearchConfig};
use super::ocba::{argmax_first, most_starving, Design};
use super::stats::ArmStats;

// =============================================================================
// Tree Policy
// =============================================================================

/// Policy for choosing among the tried actions of a state node.
pub trait TreePolicy: Send + Sync {
    /// Short name used in log fields.
    fn name(&self) -> &'static str;

    /// Select the index of the arm to descend into.
    ///
    /// `arms` is never empty when called by the search. `parent_visits` is
    /// the visit count of the state node owning the arms.
    fn select(
        &self,
        arms: &[ArmStats],
        parent_visits: u32,
        config: &SearchConfig,
        rng: &mut SearchRng,
    ) -> usize;
}

/// Uniformly random choice, ignoring statistics.
#[derive(Clone, Debug, Default)]
pub struct RandomPolicy;

impl TreePolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn select(&self, arms: &[ArmStats], _: u32, _: &SearchConfig, rng: &mut SearchRng) -> usize {
        rng.pick_index(arms.len()).unwrap_or(0)
    }
}

/// UCB (Upper Confidence Bound) selection policy.
///
/// Formula: Q(a) + c * sqrt(2 ln(N) / n(a)). Unvisited arms score +∞ and
/// `N` is floored at 1. The first best score wins ties.
#[derive(Clone, Debug, Default)]
pub struct Ucb;

impl Ucb {
    /// UCB score of one arm.
    #[must_use]
    pub fn score(arm: &ArmStats, parent_visits: u32, exploration_weight: f64) -> f64 {
        if arm.visits == 0 {
            return f64::INFINITY;
        }
        let ln_parent = f64::from(parent_visits.max(1)).ln();
        arm.mean + exploration_weight * (2.0 * ln_parent / f64::from(arm.visits)).sqrt()
    }
}

impl TreePolicy for Ucb {
    fn name(&self) -> &'static str {
        "ucb"
    }

    fn select(
        &self,
        arms: &[ArmStats],
        parent_visits: u32,
        config: &SearchConfig,
        _: &mut SearchRng,
    ) -> usize {
        argmax_first(
            arms.iter()
                .map(|arm| Self::score(arm, parent_visits, config.exploration_weight)),
        )
        .unwrap_or(0)
    }
}

/// Descend into the action most starving of samples under OCBA.
///
/// Each arm's spread is inflated to `sqrt(stddev² + noise / n)` so that arms
/// with few, identical samples do not look certain.
#[derive(Clone, Debug, Default)]
pub struct OcbaPolicy;

impl OcbaPolicy {
    /// The OCBA design an arm is treated as.
    #[must_use]
    pub fn design(arm: &ArmStats, noise: f64) -> Design {
        let n = f64::from(arm.visits.max(1));
        let std_dev = (arm.std_dev * arm.std_dev + noise / n).sqrt();
        Design::new(arm.mean, std_dev, arm.visits)
    }
}

impl TreePolicy for OcbaPolicy {
    fn name(&self) -> &'static str {
        "ocba"
    }

    fn select(&self, arms: &[ArmStats], _: u32, config: &SearchConfig, _: &mut SearchRng) -> usize {
        if let Some(unvisited) = arms.iter().position(|arm| arm.visits == 0) {
            return unvisited;
        }
        let designs: Vec<Design> = arms
            .iter()
            .map(|arm| Self::design(arm, config.ocba_noise))
            .collect();
        most_starving(&designs).unwrap_or(0)
    }
}

impl PolicyKind {
    /// Instantiate the built-in policy this kind names.
    #[must_use]
    pub fn into_policy(self) -> Box<dyn TreePolicy> {
        match self {
            PolicyKind::Random => Box::new(RandomPolicy),
            PolicyKind::Ucb => Box::new(Ucb),
            PolicyKind::Ocba => Box::new(OcbaPolicy),
        }
    }
}

// =============================================================================
// Rollout Policy
// =============================================================================

/// Policy for playing a position out to a terminal state.
pub trait RolloutPolicy<S: GameState>: Send + Sync {
    /// Play from `state` to the end of the game and score the result for
    /// `perspective`: 1.0 for a win, 0.5 for a draw, 0.0 for a loss.
    fn rollout(&self, state: &S, perspective: Player, rng: &mut SearchRng) -> Result<f64>;
}

/// Random roll-out policy.
///
/// Plays uniformly random legal actions until the game is over.
#[derive(Clone, Debug, Default)]
pub struct RandomRollout;

impl<S: GameState> RolloutPolicy<S> for RandomRollout {
    fn rollout(&self, state: &S, perspective: Player, rng: &mut SearchRng) -> Result<f64> {
        let mut current = state.clone();
        loop {
            if let Some(result) = current.game_result() {
                return Ok(result.reward_for(perspective));
            }
            let actions = current.legal_actions();
            let Some(action) = rng.choose(&actions) else {
                return Err(MctsError::NoLegalActions {
                    position: current.render(),
                });
            };
            current = current.make_move(action)?;
        }
    }
}
