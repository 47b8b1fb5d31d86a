//! Shared Challenge Use Cases

use crate::application::config::GameConfig;
use crate::domain::entities::{Challenge, ChallengeStanding};
use crate::domain::repository::{ChallengeRepository, ListingProvider};
use crate::domain::value_objects::{ChallengeCode, Difficulty};
use crate::error::{GameError, GameResult};
use kernel::id::ListingId;
use rand::seq::IndexedRandom;
use std::sync::Arc;

/// Attempts at finding an unused code before giving up
const CODE_ATTEMPTS: usize = 8;

/// Create Challenge Use Case
///
/// Fixes a sequence of distinct listings under a short shareable code.
pub struct CreateChallengeUseCase<L, C>
where
    L: ListingProvider,
    C: ChallengeRepository,
{
    listings: Arc<L>,
    challenges: Arc<C>,
    config: Arc<GameConfig>,
}

impl<L, C> CreateChallengeUseCase<L, C>
where
    L: ListingProvider,
    C: ChallengeRepository,
{
    pub fn new(listings: Arc<L>, challenges: Arc<C>, config: Arc<GameConfig>) -> Self {
        Self {
            listings,
            challenges,
            config,
        }
    }

    pub async fn execute(&self, difficulty: Difficulty) -> GameResult<Challenge> {
        let count = self.config.challenge_listing_count as usize;
        let mut candidates = self.listings.candidates(Some(difficulty)).await?;
        if candidates.len() < count {
            tracing::warn!(
                %difficulty,
                available = candidates.len(),
                "Tier too small for a challenge; using the whole catalog"
            );
            candidates = self.listings.candidates(None).await?;
        }
        if candidates.len() < count {
            return Err(GameError::NoListingsAvailable);
        }

        let listing_ids: Vec<ListingId> = {
            let mut rng = rand::rng();
            candidates
                .choose_multiple(&mut rng, count)
                .map(|l| l.id)
                .collect()
        };

        for _ in 0..CODE_ATTEMPTS {
            let challenge =
                Challenge::new(ChallengeCode::generate(), difficulty, listing_ids.clone());
            if self.challenges.create(challenge.clone()).await? {
                tracing::info!(challenge = %challenge.code, %difficulty, "Challenge created");
                return Ok(challenge);
            }
        }
        Err(GameError::Internal("could not allocate a challenge code".into()))
    }
}

/// Output DTO for challenge standings
#[derive(Debug, Clone)]
pub struct ChallengeStandingsOutput {
    pub code: ChallengeCode,
    pub difficulty: Difficulty,
    pub listing_count: usize,
    pub standings: Vec<ChallengeStanding>,
}

/// Challenge Standings Use Case
pub struct ChallengeStandingsUseCase<C>
where
    C: ChallengeRepository,
{
    challenges: Arc<C>,
}

impl<C> ChallengeStandingsUseCase<C>
where
    C: ChallengeRepository,
{
    pub fn new(challenges: Arc<C>) -> Self {
        Self { challenges }
    }

    pub async fn execute(&self, raw_code: &str) -> GameResult<ChallengeStandingsOutput> {
        let code = ChallengeCode::parse(raw_code)?;
        let challenge = self
            .challenges
            .get(&code)
            .await?
            .ok_or(GameError::ChallengeNotFound)?;

        Ok(ChallengeStandingsOutput {
            standings: challenge.ranked_standings(),
            code: challenge.code,
            difficulty: challenge.difficulty,
            listing_count: challenge.listing_ids.len(),
        })
    }
}
