//! Tic-tac-toe on an n×n board.

use smallvec::SmallVec;

use crate::core::{GameResult, MctsError, Player, Result};
use crate::rules::GameState;

/// Cell value for the first player, drawn as `O`.
const FIRST: i8 = 1;
/// Cell value for the second player, drawn as `X`.
const SECOND: i8 = -1;
const EMPTY: i8 = 0;

fn cell_value(player: Player) -> i8 {
    match player {
        Player::First => FIRST,
        Player::Second => SECOND,
    }
}

/// Placing the mover's mark on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TicTacToeMove {
    pub row: usize,
    pub col: usize,
    pub player: Player,
}

impl TicTacToeMove {
    pub fn new(row: usize, col: usize, player: Player) -> Self {
        Self { row, col, player }
    }
}

/// A tic-tac-toe position.
///
/// Cells are stored row-major. The first player (`O`) moves first on an
/// empty board. A line is won by filling a whole row, column or diagonal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicTacToe {
    cells: SmallVec<[i8; 9]>,
    size: usize,
    to_move: Player,
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl TicTacToe {
    /// Empty 3×3 board, first player to move.
    pub fn new() -> Self {
        Self {
            cells: SmallVec::from_elem(EMPTY, 9),
            size: 3,
            to_move: Player::First,
        }
    }

    /// Empty `size`×`size` board, first player to move.
    pub fn with_size(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(MctsError::InvalidConfiguration {
                message: "board size must be at least 1".into(),
            });
        }
        Ok(Self {
            cells: SmallVec::from_elem(EMPTY, size * size),
            size,
            to_move: Player::First,
        })
    }

    /// Build a position from row-major cells (`1` = O, `-1` = X, `0` = empty).
    pub fn from_cells(size: usize, cells: &[i8], to_move: Player) -> Result<Self> {
        if size == 0 || cells.len() != size * size {
            return Err(MctsError::InvalidConfiguration {
                message: format!(
                    "expected {} cells for a {size}x{size} board, got {}",
                    size * size,
                    cells.len()
                ),
            });
        }
        if let Some(bad) = cells.iter().find(|c| !matches!(**c, FIRST | SECOND | EMPTY)) {
            return Err(MctsError::InvalidConfiguration {
                message: format!("invalid cell value {bad}"),
            });
        }
        Ok(Self {
            cells: SmallVec::from_slice(cells),
            size,
            to_move,
        })
    }

    /// Board width.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Owner of a cell, if any.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<Player> {
        match self.cells.get(row * self.size + col) {
            Some(&FIRST) => Some(Player::First),
            Some(&SECOND) => Some(Player::Second),
            _ => None,
        }
    }

    /// Whether `mv` may be played here.
    #[must_use]
    pub fn is_move_legal(&self, mv: &TicTacToeMove) -> bool {
        mv.player == self.to_move
            && mv.row < self.size
            && mv.col < self.size
            && self.cells[mv.row * self.size + mv.col] == EMPTY
            && self.game_result().is_none()
    }

    fn line_sum(&self, cells: impl Iterator<Item = usize>) -> i32 {
        cells.map(|i| i32::from(self.cells[i])).sum()
    }

    fn completes_line(&self, value: i8) -> bool {
        let n = self.size;
        let target = i32::from(value) * n as i32;

        (0..n).any(|r| self.line_sum((0..n).map(|c| r * n + c)) == target)
            || (0..n).any(|c| self.line_sum((0..n).map(|r| r * n + c)) == target)
            || self.line_sum((0..n).map(|i| i * n + i)) == target
            || self.line_sum((0..n).map(|i| i * n + (n - 1 - i))) == target
    }

    /// Board with cell indices in place of marks, for choosing moves by key.
    #[must_use]
    pub fn render_positions(&self) -> String {
        self.render_with(|idx| idx.to_string())
    }

    fn render_with(&self, mut cell: impl FnMut(usize) -> String) -> String {
        let n = self.size;
        let separator: String = (0..n)
            .map(|j| if j == 0 || j == n - 1 { "--" } else { "---" })
            .collect::<Vec<_>>()
            .join("+");

        (0..n)
            .map(|r| {
                (0..n)
                    .map(|c| cell(r * n + c))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join(&format!("\n{separator}\n"))
    }
}

impl GameState for TicTacToe {
    type Action = TicTacToeMove;

    fn legal_actions(&self) -> Vec<TicTacToeMove> {
        if self.game_result().is_some() {
            return Vec::new();
        }
        let player = self.to_move;
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == EMPTY)
            .map(|(i, _)| TicTacToeMove::new(i / self.size, i % self.size, player))
            .collect()
    }

    fn make_move(&self, action: &TicTacToeMove) -> Result<Self> {
        if !self.is_move_legal(action) {
            return Err(MctsError::IllegalMove {
                action: format!("{action:?}"),
                position: self.render(),
            });
        }
        let mut next = self.clone();
        next.cells[action.row * self.size + action.col] = cell_value(action.player);
        next.to_move = self.to_move.opponent();
        Ok(next)
    }

    fn game_result(&self) -> Option<GameResult> {
        if self.completes_line(FIRST) {
            Some(GameResult::Winner(Player::First))
        } else if self.completes_line(SECOND) {
            Some(GameResult::Winner(Player::Second))
        } else if self.cells.iter().all(|&c| c != EMPTY) {
            Some(GameResult::Draw)
        } else {
            None
        }
    }

    fn to_move(&self) -> Player {
        self.to_move
    }

    fn action_key(&self, action: &TicTacToeMove) -> u32 {
        (action.row * self.size + action.col) as u32
    }

    fn render(&self) -> String {
        self.render_with(|idx| {
            let mark = match self.cells[idx] {
                FIRST => "O",
                SECOND => "X",
                _ => " ",
            };
            mark.to_string()
        })
    }
}

impl std::fmt::Display for TicTacToe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.render())?;
        match self.to_move {
            Player::First => write!(f, "Next to move: O"),
            Player::Second => write!(f, "Next to move: X"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board() {
        let game = TicTacToe::new();
        assert_eq!(game.size(), 3);
        assert_eq!(game.to_move(), Player::First);
        assert_eq!(game.legal_actions().len(), 9);
        assert!(game.game_result().is_none());
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(TicTacToe::with_size(0).is_err());
        assert_eq!(TicTacToe::with_size(4).unwrap().legal_actions().len(), 16);
    }

    #[test]
    fn test_from_cells_validates() {
        assert!(TicTacToe::from_cells(3, &[0; 8], Player::First).is_err());
        assert!(TicTacToe::from_cells(3, &[0, 0, 0, 0, 2, 0, 0, 0, 0], Player::First).is_err());
    }

    #[test]
    fn test_action_key_row_major() {
        let game = TicTacToe::new();
        let keys: Vec<u32> = game
            .legal_actions()
            .iter()
            .map(|a| game.action_key(a))
            .collect();
        assert_eq!(keys, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_move_alternates_players() {
        let game = TicTacToe::new();
        let next = game
            .make_move(&TicTacToeMove::new(1, 1, Player::First))
            .unwrap();

        assert_eq!(next.cell(1, 1), Some(Player::First));
        assert_eq!(next.to_move(), Player::Second);
        assert_eq!(next.legal_actions().len(), 8);
        // The original position is untouched.
        assert_eq!(game.cell(1, 1), None);
    }

    #[test]
    fn test_illegal_moves() {
        let game = TicTacToe::new();
        let next = game
            .make_move(&TicTacToeMove::new(0, 0, Player::First))
            .unwrap();

        // Occupied cell.
        assert!(next.make_move(&TicTacToeMove::new(0, 0, Player::Second)).is_err());
        // Wrong player.
        assert!(next.make_move(&TicTacToeMove::new(0, 1, Player::First)).is_err());
        // Off the board.
        assert!(next.make_move(&TicTacToeMove::new(3, 0, Player::Second)).is_err());
    }

    #[test]
    fn test_row_column_and_diagonal_wins() {
        #[rustfmt::skip]
        let row = TicTacToe::from_cells(3, &[
            1, 1, 1,
            -1, -1, 0,
            0, 0, 0,
        ], Player::Second).unwrap();
        assert_eq!(row.game_result(), Some(GameResult::Winner(Player::First)));

        #[rustfmt::skip]
        let col = TicTacToe::from_cells(3, &[
            -1, 1, 1,
            -1, 1, 0,
            -1, 0, 0,
        ], Player::First).unwrap();
        assert_eq!(col.game_result(), Some(GameResult::Winner(Player::Second)));

        #[rustfmt::skip]
        let anti = TicTacToe::from_cells(3, &[
            -1, -1, 1,
            0, 1, 0,
            1, 0, 0,
        ], Player::Second).unwrap();
        assert_eq!(anti.game_result(), Some(GameResult::Winner(Player::First)));
        assert!(anti.legal_actions().is_empty());
    }

    #[test]
    fn test_draw() {
        #[rustfmt::skip]
        let full = TicTacToe::from_cells(3, &[
            1, -1, 1,
            1, -1, -1,
            -1, 1, 1,
        ], Player::Second).unwrap();
        assert_eq!(full.game_result(), Some(GameResult::Draw));
        assert!(full.is_game_over());
    }

    #[test]
    fn test_render() {
        let game = TicTacToe::new()
            .make_move(&TicTacToeMove::new(0, 0, Player::First))
            .unwrap()
            .make_move(&TicTacToeMove::new(1, 1, Player::Second))
            .unwrap();

        assert_eq!(game.render(), "O |   |  \n--+---+--\n  | X |  \n--+---+--\n  |   |  ");
        assert_eq!(
            game.render_positions(),
            "0 | 1 | 2\n--+---+--\n3 | 4 | 5\n--+---+--\n6 | 7 | 8"
        );
        assert!(game.to_string().ends_with("Next to move: O"));
    }
}
