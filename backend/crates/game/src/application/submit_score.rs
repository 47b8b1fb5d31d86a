//! Submit Leaderboard Entry Use Case

use crate::application::config::GameConfig;
use crate::domain::entities::LeaderboardEntry;
use crate::domain::repository::LeaderboardRepository;
use crate::domain::services::ranking;
use crate::domain::value_objects::{Difficulty, GameMode, PlayerName, SessionId};
use crate::error::{GameError, GameResult};
use crate::infra::memory::InMemorySessionStore;
use std::sync::Arc;

/// Input DTO for submit score
#[derive(Debug, Clone)]
pub struct SubmitScoreInput {
    pub name: String,
    pub score: i64,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    /// When set, the entry must match this finished session
    pub session_id: Option<SessionId>,
}

/// Output DTO for submit score
#[derive(Debug, Clone)]
pub struct SubmitScoreOutput {
    pub entry: LeaderboardEntry,
    /// 1-based position on the entry's board
    pub rank: usize,
}

/// Submit Score Use Case
pub struct SubmitScoreUseCase<B>
where
    B: LeaderboardRepository,
{
    leaderboard: Arc<B>,
    sessions: Arc<InMemorySessionStore>,
    config: Arc<GameConfig>,
}

impl<B> SubmitScoreUseCase<B>
where
    B: LeaderboardRepository,
{
    pub fn new(
        leaderboard: Arc<B>,
        sessions: Arc<InMemorySessionStore>,
        config: Arc<GameConfig>,
    ) -> Self {
        Self {
            leaderboard,
            sessions,
            config,
        }
    }

    pub async fn execute(&self, input: SubmitScoreInput) -> GameResult<SubmitScoreOutput> {
        let name = PlayerName::new(&input.name, self.config.player_name_max_length).map_err(|e| {
            tracing::warn!(reason = %e, "Leaderboard name rejected");
            GameError::InvalidEntry(e.to_string())
        })?;

        let upper_bound = ranking::max_score(
            input.mode,
            self.config.scoring.challenge_max_points,
            self.config.challenge_listing_count,
        );
        ranking::validate_score(input.mode, input.score, upper_bound)?;

        let entry = LeaderboardEntry::new(name, input.score, input.mode, input.difficulty);

        let Some(session_id) = &input.session_id else {
            return self.store(entry).await;
        };

        // held until the write completes so the session is submitted at most once
        let mut guard = self
            .sessions
            .lock_existing(session_id)
            .await
            .ok_or(GameError::SessionNotFound)?;
        let Some(session) = guard.as_mut() else {
            return Err(GameError::SessionNotFound);
        };

        if !session.is_complete() {
            return Err(GameError::InvalidEntry("the session is still in progress".into()));
        }
        if session.guesses.is_empty() {
            return Err(GameError::InvalidEntry("the session has no guesses".into()));
        }
        if session.leaderboard_entry.is_some() {
            return Err(GameError::InvalidEntry(
                "this session's score was already submitted".into(),
            ));
        }
        if session.mode != input.mode
            || session.difficulty != input.difficulty
            || session.cumulative_score != input.score
        {
            tracing::warn!(
                session_id = %session_id,
                claimed_score = input.score,
                actual_score = session.cumulative_score,
                "Leaderboard entry does not match session"
            );
            return Err(GameError::InvalidEntry(
                "score does not match the finished session".into(),
            ));
        }

        let output = self.store(entry).await?;
        session.leaderboard_entry = Some(output.entry.id);
        Ok(output)
    }

    async fn store(&self, entry: LeaderboardEntry) -> GameResult<SubmitScoreOutput> {
        let rank = self.leaderboard.insert(entry.clone()).await?;
        tracing::info!(
            entry_id = %entry.id,
            mode = %entry.game_mode,
            difficulty = %entry.difficulty,
            score = entry.score,
            rank,
            "Leaderboard entry accepted"
        );
        Ok(SubmitScoreOutput { entry, rank })
    }
}
