//! Repository Traits
//!
//! Interfaces for data access. Implementations are in the infrastructure layer.

use crate::domain::entities::{Challenge, ChallengeStanding, LeaderboardEntry, Listing};
use crate::domain::migration::{MigrationMarker, MigrationOutcome};
use crate::domain::value_objects::{ChallengeCode, Difficulty, GameMode};
use crate::error::GameResult;
use kernel::id::ListingId;

/// Source of immutable listings
#[trait_variant::make(ListingProvider: Send)]
pub trait LocalListingProvider {
    /// All listings of a tier, or the whole catalog for `None`
    async fn candidates(&self, difficulty: Option<Difficulty>) -> GameResult<Vec<Listing>>;

    /// Get a listing by ID
    async fn get(&self, id: ListingId) -> GameResult<Option<Listing>>;
}

/// Leaderboard repository trait
///
/// Writers are mutually exclusive; readers see a consistent snapshot.
#[trait_variant::make(LeaderboardRepository: Send)]
pub trait LocalLeaderboardRepository {
    /// Durably store an entry and return its 1-based rank on its board
    async fn insert(&self, entry: LeaderboardEntry) -> GameResult<usize>;

    /// Entries of one board in rank order
    async fn board(
        &self,
        mode: GameMode,
        difficulty: Difficulty,
    ) -> GameResult<Vec<LeaderboardEntry>>;

    /// Whether a legacy source with this digest has already been applied
    async fn is_migrated(&self, source_digest: &str) -> GameResult<bool>;

    /// Store migrated entries and the marker in one durable write
    async fn apply_migration(
        &self,
        entries: Vec<LeaderboardEntry>,
        marker: MigrationMarker,
    ) -> GameResult<MigrationOutcome>;
}

/// Shared challenge repository trait
#[trait_variant::make(ChallengeRepository: Send)]
pub trait LocalChallengeRepository {
    /// Store a new challenge; returns false if the code is taken
    async fn create(&self, challenge: Challenge) -> GameResult<bool>;

    async fn get(&self, code: &ChallengeCode) -> GameResult<Option<Challenge>>;

    /// Record a participant's finished run
    async fn record_result(
        &self,
        code: &ChallengeCode,
        standing: ChallengeStanding,
    ) -> GameResult<()>;
}
