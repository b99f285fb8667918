//! Monte Carlo Tree Search with pluggable tree policies.
//!
//! ## Overview
//!
//! The tree alternates two kinds of nodes:
//!
//! - **State nodes**: a position with the searching player to move
//! - **State-action nodes**: one of that player's actions, holding the
//!   position it leads to
//!
//! Opponent replies are sampled at random from a state-action node, so the
//! tree branches only on the searching player's choices. Among tried
//! actions, a [`TreePolicy`] decides where to descend:
//!
//! - **Random**: uniform choice
//! - **UCB**: upper confidence bound
//! - **OCBA**: the action most starving of samples under Optimal Computing
//!   Budget Allocation (see [`ocba`])
//!
//! ## Usage
//!
//! ```rust
//! use ocba_mcts::games::tictactoe::TicTacToe;
//! use ocba_mcts::mcts::{MonteCarloTreeSearch, PolicyKind, SearchConfig};
//!
//! let config = SearchConfig::default().with_policy(PolicyKind::Ocba);
//! let mut search = MonteCarloTreeSearch::new(TicTacToe::new(), config).unwrap();
//!
//! for row in search.search(200).unwrap() {
//!     println!("{}: q = {:.3}, n = {}", row.move_id, row.q_value, row.visits);
//! }
//! let best = search.best_action();
//! assert!(best.is_some());
//! ```
//!
//! ## Custom Policies
//!
//! ```rust,ignore
//! use ocba_mcts::mcts::{MonteCarloTreeSearch, SearchConfig, Ucb};
//!
//! let search = MonteCarloTreeSearch::new(state, config)?
//!     .with_policy(Ucb)
//!     .with_rollout(MyHeuristicRollout);
//! ```

pub mod config;
pub mod node;
pub mod ocba;
pub mod policy;
pub mod search;
pub mod stats;
pub mod tree;

// Re-export main types
pub use config::{PolicyKind, SearchConfig};
pub use node::{ActionNodeId, StateActionNode, StateNode, StateNodeId};
pub use ocba::Design;
pub use policy::{OcbaPolicy, RandomPolicy, RandomRollout, RolloutPolicy, TreePolicy, Ucb};
pub use search::{ActionRanking, MonteCarloTreeSearch};
pub use stats::{ArmStats, SampleStats, SearchStats};
pub use tree::{SearchTree, TreeStats};
