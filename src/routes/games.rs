use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db,
    game::{tictactoe, GameSession, Player, SessionUpdate},
    routes::ApiError,
    AppState,
};

/// Game start event from the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StartGameRequest {
    Tictactoe {
        guild_id: i64,
        host_id: i64,
        /// Omitted to play against the bot.
        opponent_id: Option<i64>,
    },
    Hangman {
        guild_id: i64,
        /// 1-2 players, cooperative.
        player_ids: Vec<i64>,
    },
}

/// Move event from the gateway. The payload shape has to match the session's
/// game kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MovePayload {
    Place { x: u8, y: u8 },
    Guess { letter: char },
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveRequest {
    pub player_id: i64,
    #[serde(flatten)]
    pub payload: MovePayload,
}

/// Validate a start request and park the new session in the arena. Shared by
/// the REST handler and the WebSocket carrier.
pub(crate) fn start_session(
    state: &AppState,
    request: StartGameRequest,
) -> Result<SessionUpdate, ApiError> {
    let session = match request {
        StartGameRequest::Tictactoe {
            guild_id,
            host_id,
            opponent_id,
        } => {
            let opponent = match opponent_id {
                Some(id) if id == host_id => {
                    return Err(ApiError::unprocessable("you cannot play against yourself"));
                }
                Some(id) => Player::Human { user_id: id },
                None => Player::Bot,
            };
            GameSession::tictactoe(guild_id, host_id, opponent, state.config.tictactoe_policy())
        }
        StartGameRequest::Hangman {
            guild_id,
            player_ids,
        } => {
            if player_ids.is_empty() || player_ids.len() > 2 {
                return Err(ApiError::unprocessable("hangman takes 1 or 2 players"));
            }
            if player_ids.len() == 2 && player_ids[0] == player_ids[1] {
                return Err(ApiError::unprocessable("please challenge someone else"));
            }
            let word = {
                let mut rng = rand::rng();
                state.words.pick(&mut rng).to_string()
            };
            GameSession::hangman(
                guild_id,
                player_ids,
                &word,
                state.config.game.hangman_miss_budget,
                state.config.hangman_policy(),
            )
        }
    };

    tracing::info!(
        "Started {} session {} in guild {}",
        session.kind().as_str(),
        session.session_id(),
        session.guild_id()
    );

    let update = session.snapshot();
    state.sessions.insert(session.session_id(), session);
    Ok(update)
}

/// Route one move event through the session: validate, mutate, evaluate,
/// then persist any stat events. The arena guard is held only for the
/// synchronous part, so a slow stats write never blocks other sessions.
pub(crate) async fn apply_move(
    state: &AppState,
    session_id: Uuid,
    player_id: i64,
    payload: MovePayload,
) -> Result<SessionUpdate, ApiError> {
    let (guild_id, update) = {
        let mut entry = state
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| ApiError::not_found("no such game session"))?;
        let session = entry.value_mut();
        let now = Instant::now();

        let update = match payload {
            MovePayload::Place { x, y } => {
                if x >= tictactoe::SIZE || y >= tictactoe::SIZE {
                    return Err(ApiError::unprocessable("coordinates out of range"));
                }
                let mut rng = rand::rng();
                session.place(player_id, x, y, &mut rng, now)?
            }
            MovePayload::Guess { letter } => session.guess(player_id, letter, now)?,
        };
        (session.guild_id(), update)
    };

    if !update.stat_events.is_empty() {
        db::queries::record_stat_events(&state.db, guild_id, &update.stat_events).await;
    }

    Ok(update)
}

/// Fetch the current state of a session for a re-render.
pub(crate) fn session_snapshot(
    state: &AppState,
    session_id: Uuid,
) -> Result<SessionUpdate, ApiError> {
    state
        .sessions
        .get(&session_id)
        .map(|entry| entry.value().snapshot())
        .ok_or_else(|| ApiError::not_found("no such game session"))
}

pub async fn start_game(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartGameRequest>,
) -> Result<Json<SessionUpdate>, ApiError> {
    start_session(&state, request).map(Json)
}

pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionUpdate>, ApiError> {
    session_snapshot(&state, session_id).map(Json)
}

pub async fn submit_move(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<SessionUpdate>, ApiError> {
    apply_move(&state, session_id, request.player_id, request.payload)
        .await
        .map(Json)
}
