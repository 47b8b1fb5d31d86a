//! Submit Guess Use Case

use crate::application::config::GameConfig;
use crate::application::get_next_listing::serve_next;
use crate::domain::entities::{ChallengeStanding, GuessRecord, ListingView, PlaySession};
use crate::domain::repository::{ChallengeRepository, ListingProvider};
use crate::domain::value_objects::{SessionId, SessionState};
use crate::error::{GameError, GameResult};
use crate::infra::memory::InMemorySessionStore;
use chrono::Utc;
use kernel::id::ListingId;
use std::sync::Arc;

/// Input DTO for submit guess
#[derive(Debug, Clone)]
pub struct SubmitGuessInput {
    pub session_id: SessionId,
    pub listing_id: ListingId,
    pub guessed_price: i64,
}

/// Output DTO for submit guess
#[derive(Debug, Clone)]
pub struct SubmitGuessOutput {
    pub record: GuessRecord,
    pub cumulative_score: i64,
    pub ordinal: u32,
    pub continues: bool,
    pub state: SessionState,
    /// Next listing, already served; `None` once the session is complete
    /// or if serving failed (the caller can retry via get next listing)
    pub next_listing: Option<ListingView>,
}

/// Submit Guess Use Case
pub struct SubmitGuessUseCase<L, C>
where
    L: ListingProvider,
    C: ChallengeRepository,
{
    listings: Arc<L>,
    challenges: Arc<C>,
    sessions: Arc<InMemorySessionStore>,
    config: Arc<GameConfig>,
}

impl<L, C> SubmitGuessUseCase<L, C>
where
    L: ListingProvider,
    C: ChallengeRepository,
{
    pub fn new(
        listings: Arc<L>,
        challenges: Arc<C>,
        sessions: Arc<InMemorySessionStore>,
        config: Arc<GameConfig>,
    ) -> Self {
        Self {
            listings,
            challenges,
            sessions,
            config,
        }
    }

    pub async fn execute(&self, input: SubmitGuessInput) -> GameResult<SubmitGuessOutput> {
        let mut guard = self
            .sessions
            .lock_existing(&input.session_id)
            .await
            .ok_or(GameError::SessionNotFound)?;
        let Some(session) = guard.as_mut() else {
            return Err(GameError::SessionNotFound);
        };

        let record = session
            .apply_guess(input.listing_id, input.guessed_price, &self.config.scoring)
            .inspect_err(|e| {
                if matches!(e, GameError::StaleGuess) {
                    tracing::warn!(
                        session_id = %input.session_id,
                        listing_id = %input.listing_id,
                        current = ?session.current_listing_id(),
                        "Stale guess"
                    );
                }
            })?;

        tracing::info!(
            session_id = %session.id,
            mode = %session.mode,
            ordinal = session.ordinal,
            points = record.points_awarded,
            cumulative = session.cumulative_score,
            "Guess scored"
        );

        let next_listing = if session.is_complete() {
            self.on_complete(session).await;
            None
        } else {
            match serve_next(self.listings.as_ref(), session).await {
                Ok(view) => Some(view),
                Err(e) => {
                    tracing::warn!(
                        session_id = %session.id,
                        error = %e,
                        "Could not serve next listing"
                    );
                    None
                }
            }
        };

        Ok(SubmitGuessOutput {
            record,
            cumulative_score: session.cumulative_score,
            ordinal: session.ordinal,
            continues: !session.is_complete(),
            state: session.state,
            next_listing,
        })
    }

    async fn on_complete(&self, session: &PlaySession) {
        tracing::info!(
            session_id = %session.id,
            mode = %session.mode,
            score = session.cumulative_score,
            guesses = session.ordinal,
            "Session complete"
        );

        let Some(code) = &session.challenge_code else {
            return;
        };
        let standing = ChallengeStanding {
            session_id: session.id.clone(),
            score: session.cumulative_score,
            guesses: session.ordinal,
            finished_at: Utc::now(),
        };
        if let Err(e) = self.challenges.record_result(code, standing).await {
            tracing::warn!(challenge = %code, error = %e, "Could not record challenge standing");
        }
    }
}
