//! Domain Entities
//!
//! Core business entities for the game domain.

use crate::domain::services::scoring::{self, ScoringPolicy};
use crate::domain::services::selection::SessionHistory;
use crate::domain::value_objects::{
    ChallengeCode, Difficulty, GameMode, PlayerName, SessionId, SessionState,
};
use crate::error::{GameError, GameResult};
use chrono::{DateTime, Utc};
use kernel::id::{EntryId, ListingId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Listing entity - a vehicle for sale with its real price
///
/// Supplied by the listing provider; never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub make: String,
    pub model: String,
    pub year: u16,
    /// Whole currency units
    pub price: i64,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Listing {
    /// Caller-visible projection with the price withheld
    pub fn view(&self) -> ListingView {
        ListingView {
            id: self.id,
            make: self.make.clone(),
            model: self.model.clone(),
            year: self.year,
            difficulty: self.difficulty,
            attributes: self.attributes.clone(),
            images: self.images.clone(),
        }
    }
}

/// Listing as shown while a guess is pending
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    pub id: ListingId,
    pub make: String,
    pub model: String,
    pub year: u16,
    pub difficulty: Difficulty,
    pub attributes: BTreeMap<String, String>,
    pub images: Vec<String>,
}

/// GuessRecord - one scored guess, append-only
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessRecord {
    pub listing_id: ListingId,
    pub guessed_price: i64,
    pub actual_price: i64,
    pub difference: i64,
    pub percentage_error: f64,
    pub points_awarded: i64,
    pub correct: bool,
    pub guessed_at: DateTime<Utc>,
}

/// PlaySession entity - one continuous play attempt
///
/// # Invariants
/// - `state == Complete` is terminal
/// - `current_listing` is `Some` only while a guess is pending
/// - `ordinal == guesses.len()`
#[derive(Debug, Clone)]
pub struct PlaySession {
    pub id: SessionId,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub state: SessionState,
    pub cumulative_score: i64,
    pub current_listing: Option<Listing>,
    pub ordinal: u32,
    pub guesses: Vec<GuessRecord>,
    pub history: SessionHistory,
    /// Number of listings that completes a challenge session
    pub target_listings: Option<u32>,
    /// Fixed listing sequence of a shared challenge
    pub plan: Vec<ListingId>,
    pub challenge_code: Option<ChallengeCode>,
    /// Set once the final score has been written to the leaderboard
    pub leaderboard_entry: Option<EntryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlaySession {
    /// Create a new session in `Created`
    pub fn new(
        id: SessionId,
        mode: GameMode,
        difficulty: Difficulty,
        history_window: usize,
        challenge_listings: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            mode,
            difficulty,
            state: SessionState::Created,
            cumulative_score: 0,
            current_listing: None,
            ordinal: 0,
            guesses: Vec::new(),
            history: SessionHistory::new(history_window),
            target_listings: (mode == GameMode::Challenge).then_some(challenge_listings),
            plan: Vec::new(),
            challenge_code: None,
            leaderboard_entry: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bind the session to a shared challenge's listing sequence
    pub fn with_challenge(mut self, code: ChallengeCode, plan: Vec<ListingId>) -> Self {
        self.target_listings = Some(plan.len() as u32);
        self.plan = plan;
        self.challenge_code = Some(code);
        self
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    pub fn current_listing_id(&self) -> Option<ListingId> {
        self.current_listing.as_ref().map(|l| l.id)
    }

    /// Planned listing for the next position, if this is a shared challenge
    pub fn planned_next(&self) -> Option<ListingId> {
        self.plan.get(self.ordinal as usize).copied()
    }

    /// Record `listing` as the one now being played
    pub fn serve(&mut self, listing: Listing) -> GameResult<()> {
        if self.is_complete() {
            return Err(GameError::SessionClosed);
        }
        self.state = SessionState::InProgress;
        self.current_listing = Some(listing);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Score a guess against the current listing and advance the session.
    ///
    /// Nothing is modified when an error is returned.
    pub fn apply_guess(
        &mut self,
        listing_id: ListingId,
        guessed_price: i64,
        policy: &ScoringPolicy,
    ) -> GameResult<GuessRecord> {
        if self.is_complete() {
            return Err(GameError::SessionClosed);
        }
        let current = match &self.current_listing {
            Some(listing) if listing.id == listing_id => listing,
            _ => return Err(GameError::StaleGuess),
        };

        let outcome = scoring::score(self.mode, guessed_price, current.price, policy)?;
        let now = Utc::now();
        let record = GuessRecord {
            listing_id,
            guessed_price,
            actual_price: current.price,
            difference: outcome.difference,
            percentage_error: outcome.percentage_error,
            points_awarded: outcome.points,
            correct: outcome.correct,
            guessed_at: now,
        };

        self.cumulative_score = self.cumulative_score.saturating_add(outcome.points);
        self.ordinal += 1;
        self.guesses.push(record.clone());
        self.current_listing = None;
        self.updated_at = now;

        let bound_reached = self
            .target_listings
            .is_some_and(|target| self.ordinal >= target);
        if !outcome.continues || bound_reached {
            self.state = SessionState::Complete;
        }
        Ok(record)
    }

    /// Player stops voluntarily
    pub fn finish(&mut self) {
        self.state = SessionState::Complete;
        self.current_listing = None;
        self.updated_at = Utc::now();
    }

    pub fn idle_for(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.updated_at
    }
}

/// LeaderboardEntry entity - immutable once stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: EntryId,
    pub name: PlayerName,
    pub score: i64,
    pub game_mode: GameMode,
    pub difficulty: Difficulty,
    pub timestamp: DateTime<Utc>,
}

impl LeaderboardEntry {
    pub fn new(name: PlayerName, score: i64, game_mode: GameMode, difficulty: Difficulty) -> Self {
        Self {
            id: EntryId::new(),
            name,
            score,
            game_mode,
            difficulty,
            timestamp: Utc::now(),
        }
    }
}

/// One participant's finished run of a shared challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeStanding {
    pub session_id: SessionId,
    pub score: i64,
    pub guesses: u32,
    pub finished_at: DateTime<Utc>,
}

/// Challenge entity - a fixed listing sequence shared under a code
#[derive(Debug, Clone)]
pub struct Challenge {
    pub code: ChallengeCode,
    pub difficulty: Difficulty,
    pub listing_ids: Vec<ListingId>,
    pub created_at: DateTime<Utc>,
    pub standings: Vec<ChallengeStanding>,
}

impl Challenge {
    pub fn new(code: ChallengeCode, difficulty: Difficulty, listing_ids: Vec<ListingId>) -> Self {
        Self {
            code,
            difficulty,
            listing_ids,
            created_at: Utc::now(),
            standings: Vec::new(),
        }
    }

    /// Record a finished run; a replayed session replaces its earlier standing
    pub fn record(&mut self, standing: ChallengeStanding) {
        self.standings
            .retain(|s| s.session_id != standing.session_id);
        self.standings.push(standing);
    }

    /// Highest points first, earlier finish wins ties
    pub fn ranked_standings(&self) -> Vec<ChallengeStanding> {
        let mut ranked = self.standings.clone();
        ranked.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.finished_at.cmp(&b.finished_at))
        });
        ranked
    }
}

#[cfg(test)]
pub(crate) fn test_listing(id: u128, price: i64) -> Listing {
    Listing {
        id: ListingId::from_u128(id),
        make: "Mazda".into(),
        model: format!("MX-5 #{id}"),
        year: 2015,
        price,
        difficulty: Difficulty::Medium,
        attributes: BTreeMap::from([("mileage".to_string(), "42000".to_string())]),
        images: vec![format!("https://img.example/{id}.jpg")],
    }
}
