//! Infrastructure Layer
//!
//! Implementations of repository traits plus the in-memory session store.

pub mod catalog;
pub mod json_file;
pub mod memory;
