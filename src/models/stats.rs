use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::game::GameKind;

/// One win/loss counter row, keyed by (guild, user, game). Created on the
/// first recorded outcome, incremented thereafter, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StatsRecord {
    pub guild_id: i64,
    pub user_id: i64,
    pub game: GameKind,
    pub wins: i32,
    pub losses: i32,
    pub updated_at: DateTime<Utc>,
}

/// Leaderboard row: wins descending, losses ascending as tie-break.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeaderboardEntry {
    pub user_id: i64,
    pub wins: i32,
    pub losses: i32,
}
