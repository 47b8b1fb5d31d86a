//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.
//! One use case per engine operation.

pub mod begin_session;
pub mod challenge;
pub mod config;
pub mod end_session;
pub mod get_next_listing;
pub mod migrate_legacy;
pub mod query_leaderboard;
pub mod submit_guess;
pub mod submit_score;
