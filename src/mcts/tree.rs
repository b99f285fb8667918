//! Arena-based MCTS tree.
//!
//! State nodes and state-action nodes live in two flat vectors and refer to
//! each other by [`StateNodeId`] / [`ActionNodeId`]. Nodes are only ever
//! appended, so ids stay valid for the life of the tree.

use smallvec::SmallVec;

use crate::core::{MctsError, Player, Result, SearchRng};
use crate::rules::GameState;

use super::node::{ActionNodeId, StateActionNode, StateNode, StateNodeId};
use super::stats::ArmStats;

/// Search tree rooted at one position.
#[derive(Clone, Debug)]
pub struct SearchTree<S: GameState> {
    states: Vec<StateNode<S>>,
    actions: Vec<StateActionNode<S>>,
    root: StateNodeId,
    perspective: Player,
}

impl<S: GameState> SearchTree<S> {
    /// Create a tree holding only the root position.
    pub fn new(root_state: S) -> Self {
        Self::with_capacity(root_state, 1024)
    }

    /// Create a tree with room for `capacity` nodes per layer.
    pub fn with_capacity(root_state: S, capacity: usize) -> Self {
        let perspective = root_state.to_move();
        let mut states = Vec::with_capacity(capacity);
        states.push(StateNode::new(root_state, None, 0));
        Self {
            states,
            actions: Vec::with_capacity(capacity),
            root: StateNodeId::new(0),
            perspective,
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> StateNodeId {
        self.root
    }

    /// Player to move at the root. Rewards are scored for this player.
    #[must_use]
    pub fn perspective(&self) -> Player {
        self.perspective
    }

    #[inline]
    #[must_use]
    pub fn state(&self, id: StateNodeId) -> &StateNode<S> {
        &self.states[id.index()]
    }

    #[inline]
    pub fn state_mut(&mut self, id: StateNodeId) -> &mut StateNode<S> {
        &mut self.states[id.index()]
    }

    #[inline]
    #[must_use]
    pub fn action(&self, id: ActionNodeId) -> &StateActionNode<S> {
        &self.actions[id.index()]
    }

    #[inline]
    pub fn action_mut(&mut self, id: ActionNodeId) -> &mut StateActionNode<S> {
        &mut self.actions[id.index()]
    }

    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    fn alloc_state(&mut self, node: StateNode<S>) -> StateNodeId {
        let id = StateNodeId::new(self.states.len() as u32);
        self.states.push(node);
        id
    }

    fn alloc_action(&mut self, node: StateActionNode<S>) -> ActionNodeId {
        let id = ActionNodeId::new(self.actions.len() as u32);
        self.actions.push(node);
        id
    }

    /// Legal actions of a state node not yet expanded.
    ///
    /// Computed from the game on first call, then only shrinks.
    pub fn untried_actions(&mut self, id: StateNodeId) -> &[S::Action] {
        self.state_mut(id).untried_actions_mut()
    }

    /// Whether [`SearchTree::expand_state`] should be called on this node
    /// rather than descending by the tree policy.
    ///
    /// True while untried actions remain, and afterwards while some tried
    /// action has been visited at most once.
    pub fn is_expandable(&mut self, id: StateNodeId) -> bool {
        if !self.untried_actions(id).is_empty() {
            return true;
        }
        self.least_visited(id)
            .is_some_and(|(_, visits)| visits <= 1)
    }

    /// First tried action with the fewest visits.
    fn least_visited(&self, id: StateNodeId) -> Option<(ActionNodeId, u32)> {
        let mut best: Option<(ActionNodeId, u32)> = None;
        for &a in self.state(id).actions() {
            let visits = self.action(a).visits();
            match best {
                Some((_, v)) if visits >= v => {}
                _ => best = Some((a, visits)),
            }
        }
        best
    }

    /// Expand a state node by one action.
    ///
    /// Takes a uniformly random untried action, applies it and records a new
    /// state-action node. Once every action is tried, returns the least
    /// visited one instead; that action must have at most one visit.
    pub fn expand_state(&mut self, id: StateNodeId, rng: &mut SearchRng) -> Result<ActionNodeId> {
        let untried = self.state_mut(id).untried_actions_mut();
        if let Some(idx) = rng.pick_index(untried.len()) {
            let action = untried.swap_remove(idx);

            let parent = self.state(id);
            let next = parent.env_state.make_move(&action)?;
            let move_id = parent.env_state.action_key(&action);

            let child = self.alloc_action(StateActionNode::new(next, action, id, move_id));
            self.state_mut(id).actions.push(child);
            return Ok(child);
        }

        match self.least_visited(id) {
            Some((a, visits)) if visits <= 1 => Ok(a),
            Some((_, visits)) => {
                tracing::error!(
                    node = %id,
                    min_visits = visits,
                    position = %self.state(id).env_state.render(),
                    "expansion requested on a node whose actions are all visited"
                );
                Err(MctsError::ExpansionInvariant {
                    node: id.0,
                    min_visits: visits,
                })
            }
            None => Err(MctsError::NoLegalActions {
                position: self.state(id).env_state.render(),
            }),
        }
    }

    /// Sample a successor state node of a state-action node.
    ///
    /// Draws a uniformly random opponent reply, with replacement. A reply
    /// seen before maps to the state node it produced the first time. When
    /// the action already ended the game, the single terminal successor is
    /// returned, created on first use.
    pub fn expand_action(&mut self, id: ActionNodeId, rng: &mut SearchRng) -> Result<StateNodeId> {
        let node = self.action(id);
        let depth = self.state(node.state_node).depth.saturating_add(1);

        if node.env_state.is_game_over() {
            if let Some(existing) = node.terminal_successor {
                return Ok(existing);
            }
            let terminal = StateNode::new(node.env_state.clone(), Some(id), depth);
            let child = self.alloc_state(terminal);
            let node = self.action_mut(id);
            node.terminal_successor = Some(child);
            node.next_state_nodes.push(child);
            return Ok(child);
        }

        let replies = node.env_state.legal_actions();
        let Some(reply) = rng.choose(&replies) else {
            return Err(MctsError::NoLegalActions {
                position: node.env_state.render(),
            });
        };
        let key = node.env_state.action_key(reply);
        if let Some(&existing) = node.explored.get(&key) {
            return Ok(existing);
        }

        let next = node.env_state.make_move(reply)?;
        let child = self.alloc_state(StateNode::new(next, Some(id), depth));
        let node = self.action_mut(id);
        node.explored.insert(key, child);
        node.next_state_nodes.push(child);
        Ok(child)
    }

    /// Push a reward up from a leaf state node to the root.
    ///
    /// Each state node folds the incoming value into its running mean and
    /// hands the new mean to the action above it. Each action records that
    /// as a Q-value sample and hands its refreshed Q mean to its own parent.
    pub fn backpropagate(&mut self, leaf: StateNodeId, reward: f64) {
        let mut current = leaf;
        let mut value = reward;
        loop {
            let node = &mut self.states[current.index()];
            let vf = node.record_reward(value);
            let Some(prev) = node.prev_node else {
                break;
            };
            let action = &mut self.actions[prev.index()];
            value = action.record_sample(vf);
            current = action.state_node;
        }
    }

    /// Statistics of the tried actions of a state node, in expansion order.
    #[must_use]
    pub fn arms(&self, id: StateNodeId) -> SmallVec<[ArmStats; 8]> {
        self.state(id)
            .actions()
            .iter()
            .map(|&a| self.action(a).arm_stats())
            .collect()
    }

    /// Get statistics about the tree.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            state_nodes: self.states.len(),
            action_nodes: self.actions.len(),
            max_depth: self.states.iter().map(|n| n.depth).max().unwrap_or(0),
            terminal_states: self.states.iter().filter(|n| n.is_terminal_node()).count(),
        }
    }
}

/// Statistics about the MCTS tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// State nodes, root included.
    pub state_nodes: usize,

    /// State-action nodes.
    pub action_nodes: usize,

    /// Deepest state node (root = 0).
    pub max_depth: u16,

    /// State nodes holding a finished game.
    pub terminal_states: usize,
}

impl TreeStats {
    /// Average tried actions per state node.
    #[must_use]
    pub fn branching_factor(&self) -> f64 {
        if self.state_nodes == 0 {
            0.0
        } else {
            self.action_nodes as f64 / self.state_nodes as f64
        }
    }
}
