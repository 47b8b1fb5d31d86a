//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no game vocabulary:
//! - Hashing and random codes (SHA-256, human-readable share codes)
//! - Durable file writes (tmp file + fsync + atomic rename, timestamped backups)
//! - Text normalization for player-supplied strings

pub mod crypto;
pub mod fs;
pub mod text;
