use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::game::{hangman, TimeoutPolicy};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub game: GameConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    /// Optional file with one hangman word per line; the built-in list is
    /// used when unset or unreadable.
    pub word_list_path: Option<String>,
    /// Inactivity deadline for a session, seconds.
    pub session_ttl_secs: u64,
    /// How long concluded sessions stay fetchable before the sweeper drops
    /// them, seconds.
    pub session_grace_secs: u64,
    pub hangman_miss_budget: u32,
    /// Whether an accepted move pushes the deadline out. Kept per game kind:
    /// tic-tac-toe always did, hangman did not.
    pub tictactoe_resets_deadline: bool,
    pub hangman_resets_deadline: bool,
    pub leaderboard_limit: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a number")?,
        };

        let server = ServerConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
        };

        let game = GameConfig {
            word_list_path: env::var("WORD_LIST_PATH").ok(),
            session_ttl_secs: env::var("SESSION_TTL_SECS")
                .unwrap_or_else(|_| "180".to_string())
                .parse()
                .unwrap_or(180),
            session_grace_secs: env::var("SESSION_GRACE_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap_or(120),
            hangman_miss_budget: env::var("HANGMAN_MISS_BUDGET")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(hangman::MISS_BUDGET),
            tictactoe_resets_deadline: env::var("TICTACTOE_RESETS_DEADLINE")
                .map(|v| v != "false")
                .unwrap_or(true),
            hangman_resets_deadline: env::var("HANGMAN_RESETS_DEADLINE")
                .map(|v| v == "true")
                .unwrap_or(false),
            leaderboard_limit: env::var("LEADERBOARD_LIMIT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
        };

        Ok(Config {
            database,
            server,
            game,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.game.session_ttl_secs)
    }

    pub fn session_grace(&self) -> Duration {
        Duration::from_secs(self.game.session_grace_secs)
    }

    pub fn tictactoe_policy(&self) -> TimeoutPolicy {
        TimeoutPolicy::new(self.session_ttl(), self.game.tictactoe_resets_deadline)
    }

    pub fn hangman_policy(&self) -> TimeoutPolicy {
        TimeoutPolicy::new(self.session_ttl(), self.game.hangman_resets_deadline)
    }
}
