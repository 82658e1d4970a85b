//! Domain entities.

mod attempt;
mod campaign;
mod progress;
mod question;
mod route_marker;

pub use attempt::QuestionAttempt;
pub use campaign::{Campaign, Route};
pub use progress::{CampaignProgress, CollectError, CompletionOutcome};
pub use question::{Question, QuestionKind, DEFAULT_QUESTION_POINTS};
pub use route_marker::{MarkerSource, RouteMarker};
