use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool, Result};

use crate::config::DatabaseConfig;

pub mod queries;

/// A stuck database should fail a move fast rather than queue it behind the
/// pool; stat writes already tolerate failure.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
}

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    pool_options(config).connect(&config.url).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_options_follow_config() {
        let config = DatabaseConfig {
            url: "postgres://localhost/game_night".to_string(),
            max_connections: 7,
        };
        let options = pool_options(&config);
        assert_eq!(options.get_max_connections(), 7);
    }
}
