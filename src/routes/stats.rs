use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{db, game::GameKind, models::LeaderboardEntry, routes::ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub game: GameKind,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub guild_id: i64,
    pub game: GameKind,
    pub entries: Vec<LeaderboardEntry>,
}

/// Top players for one game kind in a guild.
pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
    Path(guild_id): Path<i64>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let default_limit = state.config.game.leaderboard_limit;
    let limit = params.limit.unwrap_or(default_limit).clamp(1, 100);

    let entries = db::queries::get_leaderboard(&state.db, guild_id, params.game, limit)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load leaderboard for guild {}: {}", guild_id, e);
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to load leaderboard",
            )
        })?;

    Ok(Json(LeaderboardResponse {
        guild_id,
        game: params.game,
        entries,
    }))
}

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub game: GameKind,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub guild_id: i64,
    pub user_id: i64,
    pub game: GameKind,
    pub wins: i32,
    pub losses: i32,
}

/// Win/loss record for one user; zeroes when they have never finished a game.
pub async fn user_stats(
    State(state): State<Arc<AppState>>,
    Path((guild_id, user_id)): Path<(i64, i64)>,
    Query(params): Query<StatsParams>,
) -> Result<Json<StatsResponse>, ApiError> {
    let (wins, losses) = db::queries::get_stats(&state.db, guild_id, user_id, params.game)
        .await
        .map_err(|e| {
            tracing::error!(
                "Failed to load stats for user {} in guild {}: {}",
                user_id,
                guild_id,
                e
            );
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "failed to load stats")
        })?;

    Ok(Json(StatsResponse {
        guild_id,
        user_id,
        game: params.game,
        wins,
        losses,
    }))
}
