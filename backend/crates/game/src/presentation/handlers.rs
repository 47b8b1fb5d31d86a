//! HTTP Handlers

use crate::application::begin_session::{BeginSessionInput, BeginSessionUseCase};
use crate::application::challenge::{ChallengeStandingsUseCase, CreateChallengeUseCase};
use crate::application::config::GameConfig;
use crate::application::end_session::{EndSessionUseCase, SessionSummary};
use crate::application::get_next_listing::GetNextListingUseCase;
use crate::application::query_leaderboard::QueryLeaderboardUseCase;
use crate::application::submit_guess::{SubmitGuessInput, SubmitGuessUseCase};
use crate::application::submit_score::{SubmitScoreInput, SubmitScoreUseCase};
use crate::domain::repository::{ChallengeRepository, LeaderboardRepository, ListingProvider};
use crate::domain::value_objects::SessionId;
use crate::error::GameResult;
use crate::infra::memory::InMemorySessionStore;
use crate::presentation::dto::{
    BeginSessionRequest, ChallengeResponse, CreateChallengeRequest, EndSessionRequest,
    GuessRequest, GuessResponse, LeaderboardQuery, LeaderboardResponse, LeaderboardRow,
    ListingQuery, ListingResponse, SessionResponse, StandingResponse, StandingsResponse,
    SubmitScoreRequest, SubmitScoreResponse,
};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;

/// Shared state for game handlers
pub struct GameAppState<L, B, C>
where
    L: ListingProvider + Send + Sync + 'static,
    B: LeaderboardRepository + Send + Sync + 'static,
    C: ChallengeRepository + Send + Sync + 'static,
{
    pub listings: Arc<L>,
    pub leaderboard: Arc<B>,
    pub challenges: Arc<C>,
    pub sessions: Arc<InMemorySessionStore>,
    pub config: Arc<GameConfig>,
}

impl<L, B, C> GameAppState<L, B, C>
where
    L: ListingProvider + Send + Sync + 'static,
    B: LeaderboardRepository + Send + Sync + 'static,
    C: ChallengeRepository + Send + Sync + 'static,
{
    pub fn new(
        listings: Arc<L>,
        leaderboard: Arc<B>,
        challenges: Arc<C>,
        config: GameConfig,
    ) -> Self {
        Self {
            listings,
            leaderboard,
            challenges,
            sessions: Arc::new(InMemorySessionStore::new()),
            config: Arc::new(config),
        }
    }
}

// Manual impl: repositories are shared through Arc and need not be Clone.
impl<L, B, C> Clone for GameAppState<L, B, C>
where
    L: ListingProvider + Send + Sync + 'static,
    B: LeaderboardRepository + Send + Sync + 'static,
    C: ChallengeRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            listings: self.listings.clone(),
            leaderboard: self.leaderboard.clone(),
            challenges: self.challenges.clone(),
            sessions: self.sessions.clone(),
            config: self.config.clone(),
        }
    }
}

impl From<SessionSummary> for SessionResponse {
    fn from(summary: SessionSummary) -> Self {
        Self {
            session_id: summary.session_id.to_string(),
            mode: summary.mode,
            difficulty: summary.difficulty,
            state: summary.state,
            cumulative_score: summary.cumulative_score,
            guesses: summary.guesses,
            target_listings: summary.target_listings,
            challenge_code: summary.challenge_code.map(String::from),
            submitted: summary.submitted,
        }
    }
}

/// POST /api/game/session
pub async fn begin_session<L, B, C>(
    State(state): State<GameAppState<L, B, C>>,
    Json(req): Json<BeginSessionRequest>,
) -> GameResult<impl IntoResponse>
where
    L: ListingProvider + Send + Sync + 'static,
    B: LeaderboardRepository + Send + Sync + 'static,
    C: ChallengeRepository + Send + Sync + 'static,
{
    let use_case = BeginSessionUseCase::new(
        state.challenges.clone(),
        state.sessions.clone(),
        state.config.clone(),
    );

    let input = BeginSessionInput {
        session_id: SessionId::new(req.session_id)?,
        mode: req.mode,
        difficulty: req.difficulty,
        challenge_code: req.challenge_code,
    };

    let summary = use_case.execute(input).await?;
    Ok((StatusCode::CREATED, Json(SessionResponse::from(summary))))
}

/// GET /api/game/listing
pub async fn next_listing<L, B, C>(
    State(state): State<GameAppState<L, B, C>>,
    Query(query): Query<ListingQuery>,
) -> GameResult<Json<ListingResponse>>
where
    L: ListingProvider + Send + Sync + 'static,
    B: LeaderboardRepository + Send + Sync + 'static,
    C: ChallengeRepository + Send + Sync + 'static,
{
    let use_case = GetNextListingUseCase::new(
        state.listings.clone(),
        state.sessions.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(SessionId::new(query.session_id)?, query.difficulty)
        .await?;

    Ok(Json(ListingResponse {
        listing: output.listing,
        mode: output.mode,
        difficulty: output.difficulty,
        state: output.state,
        ordinal: output.ordinal,
        cumulative_score: output.cumulative_score,
    }))
}

/// POST /api/game/guess
pub async fn submit_guess<L, B, C>(
    State(state): State<GameAppState<L, B, C>>,
    Json(req): Json<GuessRequest>,
) -> GameResult<Json<GuessResponse>>
where
    L: ListingProvider + Send + Sync + 'static,
    B: LeaderboardRepository + Send + Sync + 'static,
    C: ChallengeRepository + Send + Sync + 'static,
{
    let use_case = SubmitGuessUseCase::new(
        state.listings.clone(),
        state.challenges.clone(),
        state.sessions.clone(),
        state.config.clone(),
    );

    let input = SubmitGuessInput {
        session_id: SessionId::new(req.session_id)?,
        listing_id: req.listing_id,
        guessed_price: req.guessed_price,
    };

    let output = use_case.execute(input).await?;
    let record = output.record;

    Ok(Json(GuessResponse {
        listing_id: record.listing_id,
        guessed_price: record.guessed_price,
        actual_price: record.actual_price,
        difference: record.difference,
        percentage_error: record.percentage_error,
        points_awarded: record.points_awarded,
        correct: record.correct,
        cumulative_score: output.cumulative_score,
        ordinal: output.ordinal,
        continues: output.continues,
        state: output.state,
        next_listing: output.next_listing,
    }))
}

/// POST /api/game/session/end
pub async fn end_session<L, B, C>(
    State(state): State<GameAppState<L, B, C>>,
    Json(req): Json<EndSessionRequest>,
) -> GameResult<Json<SessionResponse>>
where
    L: ListingProvider + Send + Sync + 'static,
    B: LeaderboardRepository + Send + Sync + 'static,
    C: ChallengeRepository + Send + Sync + 'static,
{
    let use_case = EndSessionUseCase::new(state.sessions.clone());
    let summary = use_case.execute(SessionId::new(req.session_id)?).await?;
    Ok(Json(SessionResponse::from(summary)))
}

/// POST /api/game/challenge
pub async fn create_challenge<L, B, C>(
    State(state): State<GameAppState<L, B, C>>,
    Json(req): Json<CreateChallengeRequest>,
) -> GameResult<impl IntoResponse>
where
    L: ListingProvider + Send + Sync + 'static,
    B: LeaderboardRepository + Send + Sync + 'static,
    C: ChallengeRepository + Send + Sync + 'static,
{
    let use_case = CreateChallengeUseCase::new(
        state.listings.clone(),
        state.challenges.clone(),
        state.config.clone(),
    );

    let challenge = use_case.execute(req.difficulty.unwrap_or_default()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ChallengeResponse {
            code: challenge.code.to_string(),
            difficulty: challenge.difficulty,
            listing_count: challenge.listing_ids.len(),
        }),
    ))
}

/// GET /api/game/challenge/{code}
pub async fn challenge_standings<L, B, C>(
    State(state): State<GameAppState<L, B, C>>,
    Path(code): Path<String>,
) -> GameResult<Json<StandingsResponse>>
where
    L: ListingProvider + Send + Sync + 'static,
    B: LeaderboardRepository + Send + Sync + 'static,
    C: ChallengeRepository + Send + Sync + 'static,
{
    let use_case = ChallengeStandingsUseCase::new(state.challenges.clone());
    let output = use_case.execute(&code).await?;

    Ok(Json(StandingsResponse {
        code: output.code.to_string(),
        difficulty: output.difficulty,
        listing_count: output.listing_count,
        standings: output
            .standings
            .into_iter()
            .enumerate()
            .map(|(i, s)| StandingResponse {
                rank: i + 1,
                score: s.score,
                guesses: s.guesses,
                finished_at: s.finished_at,
            })
            .collect(),
    }))
}

/// POST /api/game/leaderboard
pub async fn submit_score<L, B, C>(
    State(state): State<GameAppState<L, B, C>>,
    Json(req): Json<SubmitScoreRequest>,
) -> GameResult<impl IntoResponse>
where
    L: ListingProvider + Send + Sync + 'static,
    B: LeaderboardRepository + Send + Sync + 'static,
    C: ChallengeRepository + Send + Sync + 'static,
{
    let use_case = SubmitScoreUseCase::new(
        state.leaderboard.clone(),
        state.sessions.clone(),
        state.config.clone(),
    );

    let input = SubmitScoreInput {
        name: req.name,
        score: req.score,
        mode: req.mode,
        difficulty: req.difficulty,
        session_id: req.session_id.map(SessionId::new).transpose()?,
    };

    let output = use_case.execute(input).await?;
    let entry = output.entry;

    Ok((
        StatusCode::CREATED,
        Json(SubmitScoreResponse {
            id: entry.id,
            name: entry.name.to_string(),
            score: entry.score,
            game_mode: entry.game_mode,
            difficulty: entry.difficulty,
            timestamp: entry.timestamp,
            rank: output.rank,
        }),
    ))
}

/// GET /api/game/leaderboard
pub async fn query_leaderboard<L, B, C>(
    State(state): State<GameAppState<L, B, C>>,
    Query(query): Query<LeaderboardQuery>,
) -> GameResult<Json<LeaderboardResponse>>
where
    L: ListingProvider + Send + Sync + 'static,
    B: LeaderboardRepository + Send + Sync + 'static,
    C: ChallengeRepository + Send + Sync + 'static,
{
    let use_case = QueryLeaderboardUseCase::new(state.leaderboard.clone(), state.config.clone());
    let entries = use_case
        .execute(query.mode, query.difficulty, query.limit)
        .await?;

    Ok(Json(LeaderboardResponse {
        mode: query.mode,
        difficulty: query.difficulty,
        entries: entries
            .into_iter()
            .enumerate()
            .map(|(i, e)| LeaderboardRow {
                rank: i + 1,
                name: e.name.to_string(),
                score: e.score,
                timestamp: e.timestamp,
            })
            .collect(),
    }))
}
