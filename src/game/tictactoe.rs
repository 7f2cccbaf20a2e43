use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::MoveError;

/// Board side length. The engine is hardwired to 3x3; the line table below
/// would need regenerating for anything else.
pub const SIZE: u8 = 3;

/// The 8 winning lines: 3 rows, 3 columns, 2 diagonals, as cell indices.
const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    fn for_seat(seat: usize) -> Self {
        if seat == 0 {
            Mark::X
        } else {
            Mark::O
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Game continues; the returned seat moves next.
    Ongoing,
    /// The acting seat completed a line.
    Win(usize),
    /// Board full with no line.
    Draw,
}

/// Tic-tac-toe board state machine. Seats are indices into the session's
/// player list: seat 0 plays X, seat 1 plays O.
#[derive(Debug, Clone)]
pub struct TicTacToe {
    board: [Option<Mark>; 9],
    turn: usize,
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl TicTacToe {
    pub fn new() -> Self {
        Self {
            board: [None; 9],
            turn: 0,
        }
    }

    /// Seat expected to move next.
    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn cell(&self, x: u8, y: u8) -> Option<Mark> {
        self.board[Self::index(x, y)]
    }

    /// Apply a move for `seat` at column `x`, row `y` (both `0..3`).
    /// Rejections leave the board untouched.
    pub fn apply(&mut self, seat: usize, x: u8, y: u8) -> Result<Verdict, MoveError> {
        debug_assert!(x < SIZE && y < SIZE, "coordinates validated by carrier");

        if seat != self.turn {
            return Err(MoveError::NotYourTurn);
        }

        let idx = Self::index(x, y);
        if self.board[idx].is_some() {
            return Err(MoveError::CellOccupied);
        }

        let mark = Mark::for_seat(seat);
        self.board[idx] = Some(mark);
        self.turn = 1 - self.turn;

        if self.has_line(mark) {
            return Ok(Verdict::Win(seat));
        }
        if self.board.iter().all(|c| c.is_some()) {
            return Ok(Verdict::Draw);
        }
        Ok(Verdict::Ongoing)
    }

    /// Pick a random empty cell for the bot seat. Uniform over empty cells,
    /// no memory, no lookahead. `None` only on a full board, which a caller
    /// never sees because a full board is already terminal.
    pub fn random_empty_cell(&self, rng: &mut impl Rng) -> Option<(u8, u8)> {
        let empty: Vec<usize> = self
            .board
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(i, _)| i)
            .collect();
        if empty.is_empty() {
            return None;
        }
        let idx = empty[rng.random_range(0..empty.len())];
        Some(((idx % SIZE as usize) as u8, (idx / SIZE as usize) as u8))
    }

    /// Full-line scan over all 8 lines. No incremental shortcut; the board
    /// is 9 cells.
    fn has_line(&self, mark: Mark) -> bool {
        WIN_LINES
            .iter()
            .any(|line| line.iter().all(|&i| self.board[i] == Some(mark)))
    }

    /// Rows of `X`, `O` and `.` for display by the gateway.
    pub fn render(&self) -> Vec<String> {
        self.board
            .chunks(SIZE as usize)
            .map(|row| {
                row.iter()
                    .map(|c| c.map_or('.', |m| m.symbol()))
                    .collect()
            })
            .collect()
    }

    fn index(x: u8, y: u8) -> usize {
        usize::from(y) * usize::from(SIZE) + usize::from(x)
    }
}
