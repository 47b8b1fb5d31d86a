//! Game Error Types
//!
//! Game-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Game-specific result type alias
pub type GameResult<T> = Result<T, GameError>;

/// Hint attached to errors the player fixes by starting over.
const START_NEW_GAME: &str = "Start a new game";

/// Game-specific error variants
///
/// Client errors carry messages that are safe to show to the player as-is.
#[derive(Debug, Error)]
pub enum GameError {
    /// Malformed guess, price or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Leaderboard submission failed validation
    #[error("Invalid leaderboard entry: {0}")]
    InvalidEntry(String),

    /// Guess names a listing other than the one currently being played
    #[error("Guess does not match the current listing")]
    StaleGuess,

    /// Session already reached its terminal state
    #[error("Session is already complete")]
    SessionClosed,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Challenge not found")]
    ChallengeNotFound,

    /// Listing provider has nothing to serve, even with repetition allowed
    #[error("No listings available")]
    NoListingsAvailable,

    /// Durable write of the leaderboard failed; nothing was consumed
    #[error("Failed to persist leaderboard: {0}")]
    PersistenceFailure(String),

    /// Legacy leaderboard could not be migrated; the store is untouched
    #[error("Legacy migration failed: {0}")]
    MigrationFailed(String),

    /// Stored leaderboard was written by a newer schema
    #[error("Unsupported leaderboard schema version {found} (supported: {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GameError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::InvalidInput(_) => ErrorKind::BadRequest,
            GameError::InvalidEntry(_) | GameError::MigrationFailed(_) => {
                ErrorKind::UnprocessableEntity
            }
            GameError::StaleGuess => ErrorKind::Conflict,
            GameError::SessionClosed => ErrorKind::Gone,
            GameError::SessionNotFound | GameError::ChallengeNotFound => ErrorKind::NotFound,
            GameError::NoListingsAvailable | GameError::PersistenceFailure(_) => {
                ErrorKind::ServiceUnavailable
            }
            GameError::UnsupportedSchema { .. } | GameError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Whether the player recovers by starting a fresh session
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            GameError::StaleGuess | GameError::SessionClosed | GameError::SessionNotFound
        )
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        if self.is_user_correctable() {
            err.with_action(START_NEW_GAME)
        } else {
            err
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            GameError::PersistenceFailure(msg) => {
                tracing::error!(message = %msg, "Leaderboard persistence failure");
            }
            GameError::MigrationFailed(msg) => {
                tracing::error!(message = %msg, "Legacy leaderboard migration failed");
            }
            GameError::UnsupportedSchema { found, supported } => {
                tracing::error!(found, supported, "Unsupported leaderboard schema");
            }
            GameError::Internal(msg) => {
                tracing::error!(message = %msg, "Game internal error");
            }
            GameError::NoListingsAvailable => {
                tracing::warn!("No listings available");
            }
            GameError::StaleGuess => {
                tracing::warn!("Stale or out-of-order guess rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Game error");
            }
        }
    }
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
