//! Players and outcomes of a two-player game.

use serde::{Deserialize, Serialize};

/// One side of a two-player game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// Moves first.
    First,
    /// Moves second.
    Second,
}

impl Player {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Player::First => Player::Second,
            Player::Second => Player::First,
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Player::First => write!(f, "first player"),
            Player::Second => write!(f, "second player"),
        }
    }
}

/// Result of a finished game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// One player won.
    Winner(Player),
    /// Nobody won.
    Draw,
}

impl GameResult {
    /// Roll-out reward for `player`: 1 for a win, 0.5 for a draw, 0 for a loss.
    #[must_use]
    pub fn reward_for(self, player: Player) -> f64 {
        match self {
            GameResult::Winner(winner) if winner == player => 1.0,
            GameResult::Winner(_) => 0.0,
            GameResult::Draw => 0.5,
        }
    }
}
