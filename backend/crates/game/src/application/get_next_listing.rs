//! Get Next Listing Use Case

use crate::application::config::GameConfig;
use crate::domain::entities::{ListingView, PlaySession};
use crate::domain::repository::ListingProvider;
use crate::domain::services::selection::select_listing;
use crate::domain::value_objects::{Difficulty, GameMode, SessionId, SessionState};
use crate::error::{GameError, GameResult};
use crate::infra::memory::InMemorySessionStore;
use std::sync::Arc;

/// Output DTO for get next listing
#[derive(Debug, Clone)]
pub struct GetNextListingOutput {
    pub listing: ListingView,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub state: SessionState,
    /// Guesses already accepted; the listing is number `ordinal + 1`
    pub ordinal: u32,
    pub cumulative_score: i64,
}

/// Get Next Listing Use Case
///
/// Returns the listing currently awaiting a guess, serving a new one if
/// none is pending. An unknown session id starts a zero-mode session.
pub struct GetNextListingUseCase<L>
where
    L: ListingProvider,
{
    listings: Arc<L>,
    sessions: Arc<InMemorySessionStore>,
    config: Arc<GameConfig>,
}

impl<L> GetNextListingUseCase<L>
where
    L: ListingProvider,
{
    pub fn new(
        listings: Arc<L>,
        sessions: Arc<InMemorySessionStore>,
        config: Arc<GameConfig>,
    ) -> Self {
        Self {
            listings,
            sessions,
            config,
        }
    }

    pub async fn execute(
        &self,
        session_id: SessionId,
        difficulty: Option<Difficulty>,
    ) -> GameResult<GetNextListingOutput> {
        let mut guard = self.sessions.lock(&session_id).await;
        let session = guard.get_or_insert_with(|| {
            let difficulty = difficulty.unwrap_or_default();
            tracing::info!(
                session_id = %session_id,
                %difficulty,
                "Zero-mode session started on first listing request"
            );
            PlaySession::new(
                session_id.clone(),
                GameMode::Zero,
                difficulty,
                self.config.history_window,
                self.config.challenge_listing_count,
            )
        });

        if session.is_complete() {
            return Err(GameError::SessionClosed);
        }
        if let Some(requested) = difficulty
            && requested != session.difficulty
        {
            tracing::debug!(
                session_id = %session_id,
                requested = %requested,
                fixed = %session.difficulty,
                "Difficulty is fixed for the session; ignoring request"
            );
        }

        let listing = match &session.current_listing {
            Some(current) => current.view(),
            None => serve_next(self.listings.as_ref(), session).await?,
        };

        Ok(GetNextListingOutput {
            listing,
            mode: session.mode,
            difficulty: session.difficulty,
            state: session.state,
            ordinal: session.ordinal,
            cumulative_score: session.cumulative_score,
        })
    }
}

/// Pick and serve the session's next listing.
///
/// Shared challenges follow their plan; everything else goes through the
/// anti-repetition selector on the session's tier, relaxing to the whole
/// catalog when the tier is empty.
pub(crate) async fn serve_next<L>(
    listings: &L,
    session: &mut PlaySession,
) -> GameResult<ListingView>
where
    L: ListingProvider,
{
    if session.is_complete() {
        return Err(GameError::SessionClosed);
    }

    if let Some(planned) = session.planned_next() {
        let listing = listings
            .get(planned)
            .await?
            .ok_or(GameError::NoListingsAvailable)?;
        session.history.push(listing.id);
        let view = listing.view();
        session.serve(listing)?;
        return Ok(view);
    }

    let mut candidates = listings.candidates(Some(session.difficulty)).await?;
    if candidates.is_empty() {
        tracing::warn!(
            difficulty = %session.difficulty,
            "No listings in tier; using the whole catalog"
        );
        candidates = listings.candidates(None).await?;
    }

    let listing = {
        let mut rng = rand::rng();
        select_listing(&candidates, &mut session.history, &mut rng).cloned()
    }
    .ok_or(GameError::NoListingsAvailable)?;

    tracing::debug!(
        session_id = %session.id,
        listing_id = %listing.id,
        ordinal = session.ordinal,
        "Listing served"
    );
    let view = listing.view();
    session.serve(listing)?;
    Ok(view)
}
