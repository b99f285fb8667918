//! Core MCTS search algorithm.
//!
//! Every iteration walks down from the root, grows the tree by one
//! state-action node and one state node where the walk stops, plays a
//! random roll-out from the new state node and backpropagates the reward.
//! Opponent replies are sampled, never chosen, so the tree only branches on
//! the searching player's decisions.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::core::{MctsError, Result, SearchRng, SearchRngState};
use crate::rules::GameState;

use super::config::SearchConfig;
use super::node::{ActionNodeId, StateNodeId};
use super::ocba::argmax_first;
use super::policy::{RandomRollout, RolloutPolicy, TreePolicy};
use super::stats::SearchStats;
use super::tree::SearchTree;

/// One root action's standing after a search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionRanking {
    /// Game-supplied key of the action.
    pub move_id: u32,
    /// Mean of the action's Q-value samples.
    pub q_value: f64,
    /// Times the action was backpropagated through.
    pub visits: u32,
}

/// Main MCTS search context.
///
/// Owns the search tree, the policies and the random source. Repeated calls
/// to [`MonteCarloTreeSearch::search`] keep growing the same tree.
pub struct MonteCarloTreeSearch<S: GameState> {
    /// Search configuration.
    config: SearchConfig,

    /// The search tree.
    tree: SearchTree<S>,

    /// Source of every random decision in the search.
    rng: SearchRng,

    /// Chooses among tried actions.
    policy: Box<dyn TreePolicy>,

    /// Scores new leaves.
    rollout: Box<dyn RolloutPolicy<S>>,

    /// Search statistics.
    stats: SearchStats,
}

impl<S: GameState> MonteCarloTreeSearch<S> {
    /// Create a search rooted at `root_state`.
    ///
    /// The tree policy is the one `config.policy` names; roll-outs are
    /// uniformly random.
    pub fn new(root_state: S, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tree: SearchTree::with_capacity(root_state, config.max_nodes),
            rng: SearchRng::new(config.seed),
            policy: config.policy.into_policy(),
            rollout: Box::new(RandomRollout),
            stats: SearchStats::default(),
            config,
        })
    }

    /// Set a custom tree policy.
    pub fn with_policy<P: TreePolicy + 'static>(mut self, policy: P) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Set a custom roll-out policy.
    pub fn with_rollout<R: RolloutPolicy<S> + 'static>(mut self, rollout: R) -> Self {
        self.rollout = Box::new(rollout);
        self
    }

    /// Run `iterations` walk, roll-out, backpropagate cycles.
    ///
    /// Returns the root actions ranked by [`MonteCarloTreeSearch::ranking`].
    /// A finished root position returns an empty ranking without iterating.
    pub fn search(&mut self, iterations: u32) -> Result<Vec<ActionRanking>> {
        let root = self.tree.root();
        if self.tree.state(root).is_terminal_node() {
            tracing::debug!("root position is terminal, nothing to search");
            return Ok(Vec::new());
        }

        let start = Instant::now();
        tracing::debug!(
            iterations,
            policy = self.policy.name(),
            seed = self.rng.seed(),
            "starting search"
        );

        let result = self.run(iterations);
        self.stats.time_us += start.elapsed().as_micros() as u64;
        result?;

        tracing::debug!(
            iterations = self.stats.iterations,
            state_nodes = self.tree.state_count(),
            action_nodes = self.tree.action_count(),
            max_depth = self.stats.max_depth,
            time_us = self.stats.time_us,
            "search finished"
        );

        Ok(self.ranking())
    }

    fn run(&mut self, iterations: u32) -> Result<()> {
        for iteration in 0..iterations {
            let states_before = self.tree.state_count();
            let actions_before = self.tree.action_count();

            let leaf = self.tree_walk()?;

            // Roll-outs draw from a fork so their length never shifts the
            // stream used for tree decisions.
            let mut rollout_rng = self.rng.fork();
            let reward = self.rollout.rollout(
                self.tree.state(leaf).env_state(),
                self.tree.perspective(),
                &mut rollout_rng,
            )?;
            self.stats.rollouts += 1;

            self.tree.backpropagate(leaf, reward);

            let depth = self.tree.state(leaf).depth();
            self.stats.iterations += 1;
            self.stats.state_nodes_created += (self.tree.state_count() - states_before) as u32;
            self.stats.action_nodes_created += (self.tree.action_count() - actions_before) as u32;
            self.stats.max_depth = self.stats.max_depth.max(depth);

            tracing::trace!(
                iteration,
                leaf = %leaf,
                depth,
                reward,
                node = %self.tree.state(leaf).label(),
                "iteration complete"
            );
        }
        Ok(())
    }

    /// Walk from the root to the state node the next roll-out starts from.
    ///
    /// Descends by the tree policy through nodes that are not expandable.
    /// At the first expandable node, expands it and the new action, and
    /// returns the sampled successor. A terminal state node met on the way
    /// is returned as is.
    pub fn tree_walk(&mut self) -> Result<StateNodeId> {
        let mut current = self.tree.root();
        while !self.tree.state(current).is_terminal_node() {
            if self.tree.is_expandable(current) {
                let action = self.tree.expand_state(current, &mut self.rng)?;
                return self.tree.expand_action(action, &mut self.rng);
            }
            let action = self.select_action(current)?;
            current = self.tree.expand_action(action, &mut self.rng)?;
        }
        Ok(current)
    }

    /// Ask the tree policy which tried action of `id` to descend into.
    fn select_action(&mut self, id: StateNodeId) -> Result<ActionNodeId> {
        let arms = self.tree.arms(id);
        if arms.is_empty() {
            return Err(MctsError::NoLegalActions {
                position: self.tree.state(id).env_state().render(),
            });
        }

        let parent_visits = self.tree.state(id).visits();
        let idx = self
            .policy
            .select(&arms, parent_visits, &self.config, &mut self.rng);

        self.tree
            .state(id)
            .actions()
            .get(idx)
            .copied()
            .ok_or_else(|| MctsError::InvalidConfiguration {
                message: format!(
                    "tree policy {} chose arm {idx} of {}",
                    self.policy.name(),
                    arms.len()
                ),
            })
    }

    /// Root actions with their Q mean and visits, ascending by `move_id`.
    #[must_use]
    pub fn ranking(&self) -> Vec<ActionRanking> {
        let root = self.tree.state(self.tree.root());
        let mut rows: Vec<ActionRanking> = root
            .actions()
            .iter()
            .map(|&a| {
                let node = self.tree.action(a);
                ActionRanking {
                    move_id: node.move_id(),
                    q_value: node.q_value_mean(),
                    visits: node.visits(),
                }
            })
            .collect();
        rows.sort_by_key(|row| row.move_id);
        rows
    }

    fn best_root_action(&self) -> Option<ActionNodeId> {
        let root = self.tree.state(self.tree.root());
        let idx = argmax_first(
            root.actions()
                .iter()
                .map(|&a| self.tree.action(a).q_value_mean()),
        )?;
        root.actions().get(idx).copied()
    }

    /// Root action with the highest Q mean, first on ties.
    ///
    /// Pure exploitation; does not touch the tree.
    #[must_use]
    pub fn best_action(&self) -> Option<S::Action> {
        self.best_root_action()
            .map(|a| self.tree.action(a).action().clone())
    }

    /// `move_id` of [`MonteCarloTreeSearch::best_action`].
    #[must_use]
    pub fn best_move_id(&self) -> Option<u32> {
        self.best_root_action()
            .map(|a| self.tree.action(a).move_id())
    }

    /// Get search statistics.
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Get the search tree.
    #[must_use]
    pub fn tree(&self) -> &SearchTree<S> {
        &self.tree
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Name of the active tree policy.
    #[must_use]
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Snapshot of the search's random stream.
    #[must_use]
    pub fn rng_state(&self) -> SearchRngState {
        self.rng.state()
    }
}
