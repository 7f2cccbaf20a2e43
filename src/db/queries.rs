use sqlx::{PgPool, Result};

use crate::{
    game::{GameKind, StatEvent},
    models::{LeaderboardEntry, StatsRecord},
};

/// Record a win for (guild, user, game). Upsert increment: the row is
/// created on first use, and the increment commutes with concurrent
/// increments from other sessions.
pub async fn record_win(pool: &PgPool, guild_id: i64, user_id: i64, game: GameKind) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_stats (guild_id, user_id, game, wins, losses)
        VALUES ($1, $2, $3, 1, 0)
        ON CONFLICT (guild_id, user_id, game)
        DO UPDATE SET wins = user_stats.wins + 1, updated_at = NOW()
        "#,
    )
    .bind(guild_id)
    .bind(user_id)
    .bind(game)
    .execute(pool)
    .await?;

    Ok(())
}

/// Record a loss for (guild, user, game).
pub async fn record_loss(pool: &PgPool, guild_id: i64, user_id: i64, game: GameKind) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_stats (guild_id, user_id, game, wins, losses)
        VALUES ($1, $2, $3, 0, 1)
        ON CONFLICT (guild_id, user_id, game)
        DO UPDATE SET losses = user_stats.losses + 1, updated_at = NOW()
        "#,
    )
    .bind(guild_id)
    .bind(user_id)
    .bind(game)
    .execute(pool)
    .await?;

    Ok(())
}

/// Persist the stat events a terminal session emitted. Failures are logged
/// per event; a lost increment must not take the service down.
pub async fn record_stat_events(pool: &PgPool, guild_id: i64, events: &[StatEvent]) {
    for event in events {
        let result = if event.won {
            record_win(pool, guild_id, event.user_id, event.kind).await
        } else {
            record_loss(pool, guild_id, event.user_id, event.kind).await
        };
        if let Err(e) = result {
            tracing::error!(
                "Failed to record {} for user {} in guild {}: {}",
                if event.won { "win" } else { "loss" },
                event.user_id,
                guild_id,
                e
            );
        }
    }
}

/// Wins and losses for one user in one game, zeroes when no row exists.
pub async fn get_stats(
    pool: &PgPool,
    guild_id: i64,
    user_id: i64,
    game: GameKind,
) -> Result<(i32, i32)> {
    let record = sqlx::query_as::<_, StatsRecord>(
        "SELECT * FROM user_stats WHERE guild_id = $1 AND user_id = $2 AND game = $3",
    )
    .bind(guild_id)
    .bind(user_id)
    .bind(game)
    .fetch_optional(pool)
    .await?;

    Ok(record.map_or((0, 0), |r| (r.wins, r.losses)))
}

/// Top players for a game in a guild: wins descending, losses ascending as
/// tie-break.
pub async fn get_leaderboard(
    pool: &PgPool,
    guild_id: i64,
    game: GameKind,
    limit: i64,
) -> Result<Vec<LeaderboardEntry>> {
    sqlx::query_as::<_, LeaderboardEntry>(
        r#"
        SELECT user_id, wins, losses FROM user_stats
        WHERE guild_id = $1 AND game = $2
        ORDER BY wins DESC, losses ASC
        LIMIT $3
        "#,
    )
    .bind(guild_id)
    .bind(game)
    .bind(limit)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    // Exercises the real schema and ordering clause. Runs only when a
    // database is reachable; without DATABASE_URL the test is a no-op.
    #[tokio::test]
    async fn test_leaderboard_orders_by_wins_desc_then_losses_asc() {
        dotenvy::dotenv().ok();
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return;
        };

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("Failed to connect to test database");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        // Negative guild id keeps reruns and real data out of each other's way
        let guild_id = -rand::rng().random_range(1..i64::MAX);

        let records = [(1_i64, 3, 1), (2_i64, 3, 0), (3_i64, 5, 2)];
        for (user_id, wins, losses) in records {
            for _ in 0..wins {
                record_win(&pool, guild_id, user_id, GameKind::Tictactoe)
                    .await
                    .expect("Failed to record win");
            }
            for _ in 0..losses {
                record_loss(&pool, guild_id, user_id, GameKind::Tictactoe)
                    .await
                    .expect("Failed to record loss");
            }
        }

        let entries = get_leaderboard(&pool, guild_id, GameKind::Tictactoe, 10)
            .await
            .expect("Failed to fetch leaderboard");
        let order: Vec<i64> = entries.iter().map(|e| e.user_id).collect();
        assert_eq!(
            order,
            vec![3, 2, 1],
            "most wins first, fewest losses breaking the tie"
        );

        let (wins, losses) = get_stats(&pool, guild_id, 1, GameKind::Tictactoe)
            .await
            .expect("Failed to fetch stats");
        assert_eq!((wins, losses), (3, 1), "upserts accumulate per key");
    }
}
