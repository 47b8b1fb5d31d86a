//! Presentation Layer
//!
//! HTTP handlers and DTOs for the game API.

pub mod dto;
pub mod handlers;
pub mod router;
