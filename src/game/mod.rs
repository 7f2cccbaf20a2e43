// Game engine modules

pub mod hangman;
pub mod rps;
pub mod session;
pub mod tictactoe;

use serde::{Deserialize, Serialize};

pub use session::{GameSession, SessionUpdate, TimeoutPolicy};

/// The game kinds the backend hosts. Also the discriminator column in the
/// stats table, so renames here are schema changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Tictactoe,
    Hangman,
    Rps,
}

impl GameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Tictactoe => "tictactoe",
            GameKind::Hangman => "hangman",
            GameKind::Rps => "rps",
        }
    }
}

/// Lifecycle of a session. Transitions are forward-only: once a session
/// leaves `InProgress` it never goes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Won,
    Drawn,
    Lost,
    TimedOut,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// A seat at the table. The bot seat is a first-class variant rather than a
/// sentinel user id, so move routing never compares against a live
/// connection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Player {
    Human { user_id: i64 },
    Bot,
}

impl Player {
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Player::Human { user_id } => Some(*user_id),
            Player::Bot => None,
        }
    }

    pub fn is(&self, user_id: i64) -> bool {
        matches!(self, Player::Human { user_id: id } if *id == user_id)
    }
}

/// Rejections surfaced to the acting player. None of these mutate the
/// session; validation always runs before any state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("it's not your turn")]
    NotYourTurn,
    #[error("you're not playing this game")]
    NotAPlayer,
    #[error("this spot is already taken")]
    CellOccupied,
    #[error("this game is over")]
    GameExpired,
    #[error("guesses must be a single letter a-z")]
    InvalidLetter,
    #[error("this game doesn't take that kind of move")]
    WrongGame,
}

/// A win or loss to persist for one user, emitted when a session reaches a
/// terminal state. Draws and timeouts emit nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatEvent {
    pub user_id: i64,
    pub kind: GameKind,
    pub won: bool,
}

impl StatEvent {
    pub fn win(user_id: i64, kind: GameKind) -> Self {
        Self {
            user_id,
            kind,
            won: true,
        }
    }

    pub fn loss(user_id: i64, kind: GameKind) -> Self {
        Self {
            user_id,
            kind,
            won: false,
        }
    }
}
