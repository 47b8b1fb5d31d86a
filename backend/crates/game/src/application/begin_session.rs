//! Begin Session Use Case

use crate::application::config::GameConfig;
use crate::application::end_session::SessionSummary;
use crate::domain::entities::PlaySession;
use crate::domain::repository::ChallengeRepository;
use crate::domain::value_objects::{ChallengeCode, Difficulty, GameMode, SessionId};
use crate::error::{GameError, GameResult};
use crate::infra::memory::InMemorySessionStore;
use std::sync::Arc;

/// Input DTO for begin session
#[derive(Debug, Clone)]
pub struct BeginSessionInput {
    pub session_id: SessionId,
    /// Defaults to zero, or challenge when a code is given
    pub mode: Option<GameMode>,
    pub difficulty: Option<Difficulty>,
    /// Join a shared challenge
    pub challenge_code: Option<String>,
}

/// Begin Session Use Case
///
/// Starting a session replaces any previous session under the same id.
pub struct BeginSessionUseCase<C>
where
    C: ChallengeRepository,
{
    challenges: Arc<C>,
    sessions: Arc<InMemorySessionStore>,
    config: Arc<GameConfig>,
}

impl<C> BeginSessionUseCase<C>
where
    C: ChallengeRepository,
{
    pub fn new(
        challenges: Arc<C>,
        sessions: Arc<InMemorySessionStore>,
        config: Arc<GameConfig>,
    ) -> Self {
        Self {
            challenges,
            sessions,
            config,
        }
    }

    pub async fn execute(&self, input: BeginSessionInput) -> GameResult<SessionSummary> {
        let session = match input.challenge_code.as_deref() {
            Some(raw) => self.join_challenge(&input, raw).await?,
            None => PlaySession::new(
                input.session_id.clone(),
                input.mode.unwrap_or(GameMode::Zero),
                input.difficulty.unwrap_or_default(),
                self.config.history_window,
                self.config.challenge_listing_count,
            ),
        };

        let mut guard = self.sessions.lock(&input.session_id).await;
        if let Some(previous) = guard.as_ref()
            && !previous.is_complete()
        {
            tracing::info!(
                session_id = %input.session_id,
                previous_mode = %previous.mode,
                guesses = previous.ordinal,
                "Replacing unfinished session"
            );
        }

        tracing::info!(
            session_id = %session.id,
            mode = %session.mode,
            difficulty = %session.difficulty,
            challenge = ?session.challenge_code.as_ref().map(|c| c.as_str()),
            "Session started"
        );
        let summary = SessionSummary::from(&session);
        *guard = Some(session);
        Ok(summary)
    }

    async fn join_challenge(
        &self,
        input: &BeginSessionInput,
        raw_code: &str,
    ) -> GameResult<PlaySession> {
        if let Some(mode) = input.mode
            && mode != GameMode::Challenge
        {
            return Err(GameError::InvalidInput(format!(
                "a challenge code cannot be played in {mode} mode"
            )));
        }

        let code = ChallengeCode::parse(raw_code)?;
        let challenge = self
            .challenges
            .get(&code)
            .await?
            .ok_or(GameError::ChallengeNotFound)?;

        Ok(PlaySession::new(
            input.session_id.clone(),
            GameMode::Challenge,
            challenge.difficulty,
            self.config.history_window,
            self.config.challenge_listing_count,
        )
        .with_challenge(code, challenge.listing_ids))
    }
}
