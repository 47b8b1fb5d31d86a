//! Price-guessing game engine
//!
//! Clean architecture structure:
//! - `domain/` - Entities, value objects, pure services (scoring, selection,
//!   ranking, legacy transform) and repository traits
//! - `application/` - Use cases, one per engine operation
//! - `infra/` - Listing catalog, in-memory session/challenge stores, JSON leaderboard
//! - `presentation/` - HTTP DTOs, handlers and router
//!
//! ## Concurrency model
//! - Every operation on a session holds that session's own async mutex, so
//!   guesses against one session are serialized while other sessions proceed
//! - The leaderboard is a single-writer / multi-reader store; each accepted
//!   entry is fsynced to disk before the submission returns

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

pub use application::config::GameConfig;
pub use error::{GameError, GameResult};
pub use infra::catalog::CatalogListingProvider;
pub use infra::json_file::JsonLeaderboardRepository;
pub use infra::memory::{InMemoryChallengeStore, InMemorySessionStore};
pub use presentation::router::{GameAppState, game_router};

pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}

#[cfg(test)]
mod tests;
