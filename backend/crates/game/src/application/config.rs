//! Application Configuration
//!
//! Policy knobs for the game engine.

use crate::domain::services::scoring::ScoringPolicy;
use crate::domain::services::selection::DEFAULT_HISTORY_WINDOW;
use crate::error::GameResult;
use std::time::Duration;

/// Game engine configuration
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Recently served listings a session will not see again
    pub history_window: usize,
    /// Listings in a challenge session
    pub challenge_listing_count: u32,
    /// Streak tolerance and challenge points curve
    pub scoring: ScoringPolicy,
    /// Leaderboard entries returned when no limit is given
    pub leaderboard_default_limit: usize,
    /// Upper bound on a requested leaderboard limit
    pub leaderboard_max_limit: usize,
    /// Maximum leaderboard name length in characters
    pub player_name_max_length: usize,
    /// Sessions untouched for longer than this are dropped
    pub session_idle_ttl: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            history_window: DEFAULT_HISTORY_WINDOW,
            challenge_listing_count: 10,
            scoring: ScoringPolicy::default(),
            leaderboard_default_limit: 10,
            leaderboard_max_limit: 100,
            player_name_max_length: 20,
            session_idle_ttl: Duration::from_secs(2 * 60 * 60),
        }
    }
}

impl GameConfig {
    /// Check policy values before the engine starts
    pub fn validate(&self) -> GameResult<()> {
        self.scoring.validate()
    }
}
