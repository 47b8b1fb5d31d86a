//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Listing, PlaySession, LeaderboardEntry, Challenge)
//! - Domain value objects (GameMode, Difficulty, SessionId, PlayerName)
//! - Domain services (scoring, anti-repetition selection, ranking)
//! - Legacy leaderboard transform
//! - Repository traits (interfaces)

pub mod entities;
pub mod migration;
pub mod repository;
pub mod services;
pub mod value_objects;
