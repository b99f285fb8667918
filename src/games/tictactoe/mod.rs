//! Tic-tac-toe for exercising the search.
//!
//! A small, fully observable two-player game:
//! - Players alternate placing marks on an n×n board (3×3 by default)
//! - Completing a row, column or diagonal wins
//! - A full board without a line is a draw
//!
//! Action keys are the row-major cell index, so a search report on the
//! 3×3 board has rows keyed `0..=8`.

mod game;

pub use game::{TicTacToe, TicTacToeMove};
