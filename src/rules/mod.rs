//! Game interface consumed by the search.
//!
//! Games implement `GameState` to define:
//! - Legal actions for each position
//! - How an action produces the next position
//! - When the game is over and who won
//!
//! The search core calls into `GameState` but never interprets
//! game-specific concepts directly.

pub mod state;

pub use state::GameState;
