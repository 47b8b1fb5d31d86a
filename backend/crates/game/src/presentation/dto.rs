//! API DTOs (Data Transfer Objects)

use crate::domain::entities::ListingView;
use crate::domain::value_objects::{Difficulty, GameMode, SessionState};
use chrono::{DateTime, Utc};
use kernel::id::{EntryId, ListingId};
use serde::{Deserialize, Serialize};

/// Request for POST /api/game/session
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginSessionRequest {
    pub session_id: String,
    #[serde(default)]
    pub mode: Option<GameMode>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub challenge_code: Option<String>,
}

/// Request for POST /api/game/session/end
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionRequest {
    pub session_id: String,
}

/// Session snapshot
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub state: SessionState,
    pub cumulative_score: i64,
    pub guesses: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_listings: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_code: Option<String>,
    pub submitted: bool,
}

/// Query for GET /api/game/listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    pub session_id: String,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

/// Response for GET /api/game/listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub listing: ListingView,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub state: SessionState,
    pub ordinal: u32,
    pub cumulative_score: i64,
}

/// Request for POST /api/game/guess
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessRequest {
    pub session_id: String,
    pub listing_id: ListingId,
    pub guessed_price: i64,
}

/// Response for POST /api/game/guess
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessResponse {
    pub listing_id: ListingId,
    pub guessed_price: i64,
    pub actual_price: i64,
    pub difference: i64,
    pub percentage_error: f64,
    pub points_awarded: i64,
    pub correct: bool,
    pub cumulative_score: i64,
    pub ordinal: u32,
    pub continues: bool,
    pub state: SessionState,
    pub next_listing: Option<ListingView>,
}

/// Request for POST /api/game/challenge
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChallengeRequest {
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

/// Response for POST /api/game/challenge
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub code: String,
    pub difficulty: Difficulty,
    pub listing_count: usize,
}

/// One row of a challenge's standings; session ids are not exposed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingResponse {
    pub rank: usize,
    pub score: i64,
    pub guesses: u32,
    pub finished_at: DateTime<Utc>,
}

/// Response for GET /api/game/challenge/{code}
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsResponse {
    pub code: String,
    pub difficulty: Difficulty,
    pub listing_count: usize,
    pub standings: Vec<StandingResponse>,
}

/// Request for POST /api/game/leaderboard
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScoreRequest {
    pub name: String,
    pub score: i64,
    #[serde(alias = "gameMode")]
    pub mode: GameMode,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response for POST /api/game/leaderboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScoreResponse {
    pub id: EntryId,
    pub name: String,
    pub score: i64,
    pub game_mode: GameMode,
    pub difficulty: Difficulty,
    pub timestamp: DateTime<Utc>,
    pub rank: usize,
}

/// Query for GET /api/game/leaderboard
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    pub mode: GameMode,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub rank: usize,
    pub name: String,
    pub score: i64,
    pub timestamp: DateTime<Utc>,
}

/// Response for GET /api/game/leaderboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub entries: Vec<LeaderboardRow>,
}
