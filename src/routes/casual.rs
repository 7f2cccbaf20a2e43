use std::sync::Arc;

use axum::{extract::State, Json};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    db,
    game::{
        rps::{self, Choice, RpsOutcome},
        GameKind,
    },
    routes::ApiError,
    AppState,
};

/// Instant games: one request, one resolved outcome, no session record.

#[derive(Debug, Deserialize)]
pub struct RpsRequest {
    pub guild_id: i64,
    pub user_id: i64,
    pub choice: Choice,
}

#[derive(Debug, Serialize)]
pub struct RpsResponse {
    pub player_choice: Choice,
    pub bot_choice: Choice,
    pub outcome: RpsOutcome,
    /// Running totals after this round; ties change nothing.
    pub wins: i32,
    pub losses: i32,
}

/// Rock-paper-scissors against the bot. Wins and losses land in the stats
/// store, ties are not recorded.
pub async fn play_rps(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RpsRequest>,
) -> Result<Json<RpsResponse>, ApiError> {
    let bot_choice = {
        let mut rng = rand::rng();
        Choice::random(&mut rng)
    };
    let outcome = rps::resolve(request.choice, bot_choice);

    let result = match outcome {
        RpsOutcome::Win => {
            db::queries::record_win(&state.db, request.guild_id, request.user_id, GameKind::Rps)
                .await
        }
        RpsOutcome::Loss => {
            db::queries::record_loss(&state.db, request.guild_id, request.user_id, GameKind::Rps)
                .await
        }
        RpsOutcome::Tie => Ok(()),
    };
    if let Err(e) = result {
        tracing::error!(
            "Failed to record rps outcome for user {} in guild {}: {}",
            request.user_id,
            request.guild_id,
            e
        );
    }

    let (wins, losses) =
        db::queries::get_stats(&state.db, request.guild_id, request.user_id, GameKind::Rps)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load rps stats: {}", e);
                ApiError::new(
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to load stats",
                )
            })?;

    Ok(Json(RpsResponse {
        player_choice: request.choice,
        bot_choice,
        outcome,
        wins,
        losses,
    }))
}

#[derive(Debug, Serialize)]
pub struct FlipResponse {
    pub result: &'static str,
}

/// Coin flip. Pure flavor, nothing recorded.
pub async fn flip_coin() -> Json<FlipResponse> {
    let heads = {
        let mut rng = rand::rng();
        rng.random_bool(0.5)
    };
    Json(FlipResponse {
        result: if heads { "Heads" } else { "Tails" },
    })
}
