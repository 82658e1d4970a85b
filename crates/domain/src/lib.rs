//! Waytrail Domain - core types, value objects, and progression invariants.
//!
//! Pure and synchronous: no I/O, no async, no ambient identity, randomness
//! injected via closure. The engine crate orchestrates these types behind
//! storage and identity ports.

pub mod entities;
pub mod error;
pub mod ids;
pub mod progression;
pub mod value_objects;

pub use entities::{
    Campaign, CampaignProgress, CollectError, CompletionOutcome, MarkerSource, Question,
    QuestionAttempt, QuestionKind, Route, RouteMarker, DEFAULT_QUESTION_POINTS,
};
pub use error::DomainError;
pub use ids::{
    AttemptId, CampaignId, CampaignMarkerId, ProgressId, QuestionId, RouteId, RouteMarkerId,
    UserId, WaypointId,
};
pub use progression::{
    grade, resolve_markers, GradedAnswer, GraphMarker, MarkerSnapshot, MarkerStatus,
    ProgressionGraph,
};
pub use value_objects::{distance_meters, is_within_radius, GeoPoint, VerificationCode};
