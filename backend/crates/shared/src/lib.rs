//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of the game vocabulary:
//! - Common error types and result aliases
//! - Typed identifiers for listings and leaderboard entries
//!
//! Only things with a consistent meaning across every crate belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
