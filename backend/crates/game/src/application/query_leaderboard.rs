//! Query Leaderboard Use Case

use crate::application::config::GameConfig;
use crate::domain::entities::LeaderboardEntry;
use crate::domain::repository::LeaderboardRepository;
use crate::domain::value_objects::{Difficulty, GameMode};
use crate::error::GameResult;
use std::sync::Arc;

/// Query Leaderboard Use Case
///
/// Read-only; returns at most `limit` entries in rank order.
pub struct QueryLeaderboardUseCase<B>
where
    B: LeaderboardRepository,
{
    leaderboard: Arc<B>,
    config: Arc<GameConfig>,
}

impl<B> QueryLeaderboardUseCase<B>
where
    B: LeaderboardRepository,
{
    pub fn new(leaderboard: Arc<B>, config: Arc<GameConfig>) -> Self {
        Self { leaderboard, config }
    }

    pub async fn execute(
        &self,
        mode: GameMode,
        difficulty: Difficulty,
        limit: Option<usize>,
    ) -> GameResult<Vec<LeaderboardEntry>> {
        let limit = limit
            .unwrap_or(self.config.leaderboard_default_limit)
            .min(self.config.leaderboard_max_limit);

        let mut board = self.leaderboard.board(mode, difficulty).await?;
        board.truncate(limit);
        Ok(board)
    }
}
