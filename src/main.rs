mod config;
mod db;
mod game;
mod models;
mod routes;
mod websocket;
mod words;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use axum::{routing::get, Router};
use config::Config;
use dashmap::DashMap;
use game::GameSession;
use sqlx::PgPool;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use words::WordList;

/// How often the sweeper looks for expired and reclaimable sessions
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(15);

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub db: PgPool,
    pub words: WordList,
    /// All live and recently concluded game sessions, keyed by session id
    pub sessions: DashMap<Uuid, GameSession>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "game_night_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Game Night backend server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Connect to database
    let db = db::create_pool(&config.database).await?;
    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("Database migrations completed");

    // Load the hangman word list
    let words = match &config.game.word_list_path {
        Some(path) => match WordList::load(path).await {
            Ok(words) => words,
            Err(e) => {
                tracing::warn!(
                    "Failed to load word list from {}: {}. Falling back to the built-in list.",
                    path,
                    e
                );
                WordList::builtin()
            }
        },
        None => WordList::builtin(),
    };

    // Create application state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        words,
        sessions: DashMap::new(),
    });

    // Spawn background task to time out idle sessions and drop concluded ones
    let sweep_state = state.clone();
    tokio::spawn(async move {
        session_sweep_task(sweep_state).await;
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // WebSocket endpoint for the gateway process
        .route("/ws", get(websocket::handle_websocket))
        // REST routes
        .merge(routes::create_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Background task that flips idle sessions to timed-out and drops concluded
/// sessions once their grace period is over. Timeouts record no stats; the
/// per-move status check makes a late move lose to the sweeper cleanly.
async fn session_sweep_task(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);

    loop {
        interval.tick().await;

        let now = Instant::now();
        let grace = state.config.session_grace();
        let mut sessions_to_remove = Vec::new();

        for mut entry in state.sessions.iter_mut() {
            let session = entry.value_mut();
            if session.expire_if_due(now) {
                tracing::info!(
                    "Session {} timed out after {}s of inactivity",
                    session.session_id(),
                    state.config.game.session_ttl_secs
                );
            }
            if session.reclaimable(now, grace) {
                sessions_to_remove.push(session.session_id());
            }
        }

        for session_id in sessions_to_remove {
            if state.sessions.remove(&session_id).is_some() {
                tracing::info!(
                    "Removed concluded session {} (grace period expired)",
                    session_id
                );
            }
        }
    }
}
