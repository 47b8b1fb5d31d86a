//! Game Router

use crate::domain::repository::{ChallengeRepository, LeaderboardRepository, ListingProvider};
use crate::presentation::handlers;
use axum::{
    Router,
    routing::{get, post},
};

pub use crate::presentation::handlers::GameAppState;

/// Create the game router; nest it under `/api/game`
pub fn game_router<L, B, C>(state: GameAppState<L, B, C>) -> Router
where
    L: ListingProvider + Send + Sync + 'static,
    B: LeaderboardRepository + Send + Sync + 'static,
    C: ChallengeRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/session", post(handlers::begin_session::<L, B, C>))
        .route("/session/end", post(handlers::end_session::<L, B, C>))
        .route("/listing", get(handlers::next_listing::<L, B, C>))
        .route("/guess", post(handlers::submit_guess::<L, B, C>))
        .route("/challenge", post(handlers::create_challenge::<L, B, C>))
        .route(
            "/challenge/{code}",
            get(handlers::challenge_standings::<L, B, C>),
        )
        .route(
            "/leaderboard",
            get(handlers::query_leaderboard::<L, B, C>).post(handlers::submit_score::<L, B, C>),
        )
        .with_state(state)
}
