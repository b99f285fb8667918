//! # ocba-mcts
//!
//! Monte Carlo Tree Search for two-player games, with an Optimal Computing
//! Budget Allocation tree policy alongside the usual UCB and random ones.
//!
//! ## Design Principles
//!
//! 1. **Game-Agnostic**: The search sees a game only through the
//!    [`GameState`] trait. Actions are told apart by a game-supplied
//!    integer key.
//!
//! 2. **Reproducible**: All randomness flows from one seeded [`SearchRng`],
//!    so a seed in [`SearchConfig`] pins down the whole tree.
//!
//! 3. **Pluggable Policies**: Tree and roll-out policies are trait objects
//!    picked at construction.
//!
//! ## Modules
//!
//! - `core`: players, results, errors, RNG
//! - `rules`: the `GameState` trait games implement
//! - `games`: reference games (tic-tac-toe)
//! - `mcts`: tree, policies, OCBA allocator, search driver

pub mod core;
pub mod rules;
pub mod mcts;
pub mod games;

// Re-export commonly used types
pub use crate::core::{GameResult, MctsError, Player, Result, SearchRng, SearchRngState};

pub use crate::rules::GameState;

pub use crate::mcts::{
    ActionRanking, MonteCarloTreeSearch, PolicyKind, SearchConfig, SearchStats, SearchTree,
    TreeStats,
    TreePolicy, RolloutPolicy,
    OcbaPolicy, RandomPolicy, RandomRollout, Ucb,
};
