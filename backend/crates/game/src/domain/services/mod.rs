//! Domain Services
//!
//! Pure domain logic: no I/O, no clocks except where passed in.

pub mod ranking;
pub mod scoring;
pub mod selection;
