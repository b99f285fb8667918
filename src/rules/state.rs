//! The capability interface a game exposes to the search.
//!
//! The search core never interprets a game's board or its actions. It only
//! asks for legal actions, applies them, checks for the end of the game and
//! asks for a stable integer key per action to label tree branches.

use std::fmt::Debug;

use crate::core::{GameResult, Player, Result};

/// Immutable snapshot of a two-player game position.
///
/// ## Implementation Notes
///
/// - `make_move` must not mutate `self`; it returns the successor position
///   and fails with `MctsError::IllegalMove` for an action that is not legal.
/// - `game_result` is `None` until the position is terminal.
/// - `action_key` must be stable for the lifetime of a search and distinct
///   for distinct legal actions of the same position.
pub trait GameState: Clone {
    /// A move in this game.
    type Action: Clone + PartialEq + Debug;

    /// Legal actions for the player to move. Empty once the game is over.
    fn legal_actions(&self) -> Vec<Self::Action>;

    /// Apply `action`, returning the resulting position.
    fn make_move(&self, action: &Self::Action) -> Result<Self>;

    /// Outcome of the game, or `None` while it is still going.
    fn game_result(&self) -> Option<GameResult>;

    /// Player whose turn it is.
    fn to_move(&self) -> Player;

    /// Stable integer identifying `action`, used to key and rank branches.
    fn action_key(&self, action: &Self::Action) -> u32;

    /// Human-readable rendering of the position.
    fn render(&self) -> String;

    /// Whether the position is terminal.
    fn is_game_over(&self) -> bool {
        self.game_result().is_some()
    }
}
