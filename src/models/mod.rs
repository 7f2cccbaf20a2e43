pub mod stats;

pub use stats::{LeaderboardEntry, StatsRecord};
