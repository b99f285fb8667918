//! The two alternating layers of the search tree.
//!
//! A [`StateNode`] is a position to move from. A [`StateActionNode`] is one
//! action taken from that position, holding the position the action leads
//! to. Sampling an opponent reply from a state-action node yields the next
//! state node, so every state node has the same player to move as the root.
//!
//! Nodes live in the arena of [`SearchTree`](super::tree::SearchTree) and
//! refer to each other by index. Forward links (`actions`,
//! `next_state_nodes`) are the ownership edges; back-links (`prev_node`,
//! `state_node`) are only walked upward during backpropagation.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::rules::GameState;

use super::stats::{ArmStats, SampleStats};

/// Index of a state node in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateNodeId(pub u32);

impl StateNodeId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for StateNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// Index of a state-action node in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionNodeId(pub u32);

impl ActionNodeId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ActionNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// A position reachable from the root.
#[derive(Clone, Debug)]
pub struct StateNode<S: GameState> {
    pub(crate) env_state: S,
    pub(crate) prev_node: Option<ActionNodeId>,
    pub(crate) depth: u16,
    pub(crate) number_of_visits: u32,
    pub(crate) value_function: f64,
    pub(crate) actions: SmallVec<[ActionNodeId; 8]>,
    /// `None` until first asked for; afterwards only shrinks.
    pub(crate) untried_actions: Option<Vec<S::Action>>,
}

impl<S: GameState> StateNode<S> {
    pub(crate) fn new(env_state: S, prev_node: Option<ActionNodeId>, depth: u16) -> Self {
        Self {
            env_state,
            prev_node,
            depth,
            number_of_visits: 0,
            value_function: 0.0,
            actions: SmallVec::new(),
            untried_actions: None,
        }
    }

    /// The position this node stands for.
    pub fn env_state(&self) -> &S {
        &self.env_state
    }

    /// State-action node this position was sampled from; `None` at the root.
    pub fn prev_node(&self) -> Option<ActionNodeId> {
        self.prev_node
    }

    /// Distance from the root in state-node steps.
    pub fn depth(&self) -> u16 {
        self.depth
    }

    pub fn visits(&self) -> u32 {
        self.number_of_visits
    }

    /// Running mean of the rewards backpropagated through this node.
    pub fn value_function(&self) -> f64 {
        self.value_function
    }

    /// Tried actions, in the order they were expanded.
    pub fn actions(&self) -> &[ActionNodeId] {
        &self.actions
    }

    /// Legal actions not yet expanded, if already computed.
    pub fn untried_actions(&self) -> Option<&[S::Action]> {
        self.untried_actions.as_deref()
    }

    pub fn is_terminal_node(&self) -> bool {
        self.env_state.is_game_over()
    }

    /// Whether every legal action has a state-action node.
    pub fn is_fully_expanded(&self) -> bool {
        self.untried_actions.as_ref().is_some_and(Vec::is_empty)
    }

    pub(crate) fn untried_actions_mut(&mut self) -> &mut Vec<S::Action> {
        let state = &self.env_state;
        self.untried_actions
            .get_or_insert_with(|| state.legal_actions())
    }

    /// Fold a reward into the running mean, returning the new mean.
    pub(crate) fn record_reward(&mut self, reward: f64) -> f64 {
        self.number_of_visits += 1;
        let n = f64::from(self.number_of_visits);
        self.value_function = self.value_function * (n - 1.0) / n + reward / n;
        self.value_function
    }

    /// Diagnostic label: value, visits and the rendered position.
    pub fn label(&self) -> String {
        format!(
            "vf = {:.5}\nn = {}\n{}",
            self.value_function,
            self.number_of_visits,
            self.env_state.render()
        )
    }
}

/// An action taken from a state node, holding the position it leads to.
#[derive(Clone, Debug)]
pub struct StateActionNode<S: GameState> {
    pub(crate) env_state: S,
    pub(crate) action: S::Action,
    pub(crate) state_node: StateNodeId,
    pub(crate) move_id: u32,
    pub(crate) q_values: SampleStats,
    /// Successor state nodes in creation order.
    pub(crate) next_state_nodes: SmallVec<[StateNodeId; 4]>,
    /// Opponent reply key to the successor it produced.
    pub(crate) explored: FxHashMap<u32, StateNodeId>,
    /// Successor used when `env_state` is already terminal.
    pub(crate) terminal_successor: Option<StateNodeId>,
}

impl<S: GameState> StateActionNode<S> {
    pub(crate) fn new(env_state: S, action: S::Action, state_node: StateNodeId, move_id: u32) -> Self {
        Self {
            env_state,
            action,
            state_node,
            move_id,
            q_values: SampleStats::new(),
            next_state_nodes: SmallVec::new(),
            explored: FxHashMap::default(),
            terminal_successor: None,
        }
    }

    /// Position reached after the action.
    pub fn env_state(&self) -> &S {
        &self.env_state
    }

    /// The action this node stands for.
    pub fn action(&self) -> &S::Action {
        &self.action
    }

    /// State node the action was taken from.
    pub fn state_node(&self) -> StateNodeId {
        self.state_node
    }

    /// Game-supplied key of the action.
    pub fn move_id(&self) -> u32 {
        self.move_id
    }

    pub fn visits(&self) -> u32 {
        self.q_values.count() as u32
    }

    /// Every value backpropagated into this node.
    pub fn q_value_samples(&self) -> &[f64] {
        self.q_values.samples()
    }

    pub fn q_value_mean(&self) -> f64 {
        self.q_values.mean()
    }

    /// Sample standard deviation of the Q-values; 0 below 2 samples.
    pub fn q_value_stddev(&self) -> f64 {
        self.q_values.std_dev()
    }

    /// Successor state nodes sampled so far.
    pub fn next_state_nodes(&self) -> &[StateNodeId] {
        &self.next_state_nodes
    }

    /// Record one Q-value sample, returning the refreshed mean.
    pub(crate) fn record_sample(&mut self, value: f64) -> f64 {
        self.q_values.push(value)
    }

    pub(crate) fn arm_stats(&self) -> ArmStats {
        ArmStats {
            mean: self.q_value_mean(),
            std_dev: self.q_value_stddev(),
            visits: self.visits(),
        }
    }

    /// Diagnostic label: Q mean, visits and the rendered position.
    pub fn label(&self) -> String {
        format!(
            "q = {:.5}\nn = {}\n{}",
            self.q_value_mean(),
            self.visits(),
            self.env_state.render()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Player;
    use crate::games::tictactoe::{TicTacToe, TicTacToeMove};

    #[test]
    fn test_node_ids() {
        assert_eq!(StateNodeId::new(5).index(), 5);
        assert_eq!(format!("{}", StateNodeId::new(5)), "S5");
        assert_eq!(format!("{}", ActionNodeId::new(2)), "A2");
    }

    #[test]
    fn test_state_node_root() {
        let node = StateNode::new(TicTacToe::new(), None, 0);

        assert!(node.prev_node().is_none());
        assert_eq!(node.visits(), 0);
        assert_eq!(node.value_function(), 0.0);
        assert!(node.actions().is_empty());
        assert!(node.untried_actions().is_none());
        assert!(!node.is_terminal_node());
        assert!(!node.is_fully_expanded());
    }

    #[test]
    fn test_untried_actions_are_lazy() {
        let mut node = StateNode::new(TicTacToe::new(), None, 0);
        assert!(node.untried_actions().is_none());

        let untried = node.untried_actions_mut();
        assert_eq!(untried.len(), 9);
        untried.pop();

        // Computed once, then only shrinks.
        assert_eq!(node.untried_actions_mut().len(), 8);
        assert_eq!(node.untried_actions().map(<[_]>::len), Some(8));
    }

    #[test]
    fn test_running_mean() {
        let mut node = StateNode::new(TicTacToe::new(), None, 0);
        let rewards = [1.0, 0.0, 0.5, 1.0, 1.0];

        for &r in &rewards {
            node.record_reward(r);
        }

        assert_eq!(node.visits(), 5);
        assert!((node.value_function() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_action_node_samples() {
        let root = TicTacToe::new();
        let mv = TicTacToeMove::new(1, 1, Player::First);
        let mut node = StateActionNode::new(root.make_move(&mv).unwrap(), mv, StateNodeId::new(0), 4);

        assert_eq!(node.visits(), 0);
        assert_eq!(node.q_value_stddev(), 0.0);

        assert_eq!(node.record_sample(1.0), 1.0);
        assert_eq!(node.q_value_stddev(), 0.0);
        assert_eq!(node.record_sample(0.0), 0.5);

        assert_eq!(node.visits(), 2);
        assert_eq!(node.q_value_samples(), &[1.0, 0.0]);
        assert!((node.q_value_stddev() - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);

        let arm = node.arm_stats();
        assert_eq!(arm.visits, 2);
        assert_eq!(arm.mean, 0.5);
    }

    #[test]
    fn test_labels() {
        let node = StateNode::new(TicTacToe::new(), None, 0);
        assert!(node.label().starts_with("vf = 0.00000\nn = 0\n"));
    }
}
