pub mod casual;
pub mod games;
pub mod health;
pub mod stats;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::{game::MoveError, AppState};

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/games", post(games::start_game))
        .route("/games/{session_id}", get(games::get_game))
        .route("/games/{session_id}/moves", post(games::submit_move))
        .route("/rps", post(casual::play_rps))
        .route("/flip", post(casual::flip_coin))
        .route("/guilds/{guild_id}/leaderboard", get(stats::leaderboard))
        .route(
            "/guilds/{guild_id}/users/{user_id}/stats",
            get(stats::user_stats),
        )
}

/// Rejection sent back to the gateway. Every variant leaves the session
/// untouched, so the gateway just relays the message to the acting player.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

impl From<MoveError> for ApiError {
    fn from(e: MoveError) -> Self {
        let status = match e {
            MoveError::NotYourTurn | MoveError::NotAPlayer => StatusCode::FORBIDDEN,
            MoveError::CellOccupied => StatusCode::CONFLICT,
            MoveError::GameExpired => StatusCode::GONE,
            MoveError::InvalidLetter | MoveError::WrongGame => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
