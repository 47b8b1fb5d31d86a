//! End Session Use Case

use crate::domain::entities::PlaySession;
use crate::domain::value_objects::{ChallengeCode, Difficulty, GameMode, SessionId, SessionState};
use crate::error::{GameError, GameResult};
use crate::infra::memory::InMemorySessionStore;
use std::sync::Arc;

/// Snapshot of a session returned by lifecycle operations
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub state: SessionState,
    pub cumulative_score: i64,
    pub guesses: u32,
    pub target_listings: Option<u32>,
    pub challenge_code: Option<ChallengeCode>,
    pub submitted: bool,
}

impl From<&PlaySession> for SessionSummary {
    fn from(session: &PlaySession) -> Self {
        Self {
            session_id: session.id.clone(),
            mode: session.mode,
            difficulty: session.difficulty,
            state: session.state,
            cumulative_score: session.cumulative_score,
            guesses: session.ordinal,
            target_listings: session.target_listings,
            challenge_code: session.challenge_code.clone(),
            submitted: session.leaderboard_entry.is_some(),
        }
    }
}

/// End Session Use Case
///
/// Zero mode is endless, so the player stops it explicitly. Streak and
/// challenge sessions only end by their own rules.
pub struct EndSessionUseCase {
    sessions: Arc<InMemorySessionStore>,
}

impl EndSessionUseCase {
    pub fn new(sessions: Arc<InMemorySessionStore>) -> Self {
        Self { sessions }
    }

    pub async fn execute(&self, session_id: SessionId) -> GameResult<SessionSummary> {
        let mut guard = self
            .sessions
            .lock_existing(&session_id)
            .await
            .ok_or(GameError::SessionNotFound)?;
        let Some(session) = guard.as_mut() else {
            return Err(GameError::SessionNotFound);
        };

        if session.is_complete() {
            return Ok(SessionSummary::from(&*session));
        }
        if session.mode != GameMode::Zero {
            return Err(GameError::InvalidInput(format!(
                "a {} session cannot be ended early",
                session.mode
            )));
        }

        session.finish();
        tracing::info!(
            session_id = %session.id,
            score = session.cumulative_score,
            guesses = session.ordinal,
            "Zero-mode session ended by player"
        );
        Ok(SessionSummary::from(&*session))
    }
}
