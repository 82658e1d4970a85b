//! Waytrail Engine - progression, unlocking, grading, and reward collection
//! behind an HTTP API.
//!
//! The domain crate holds the pure rules; this crate wires them to storage,
//! identity, clock/random, and barcode ports and exposes the game-mode
//! operations over axum.

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

#[cfg(test)]
pub mod test_fixtures;
