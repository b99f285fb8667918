//! Core types: players, results, errors and the random source.
//!
//! Nothing in here knows about trees or any particular game.

pub mod error;
pub mod player;
pub mod rng;

pub use error::{MctsError, Result};
pub use player::{GameResult, Player};
pub use rng::{SearchRng, SearchRngState};
