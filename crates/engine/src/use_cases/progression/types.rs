//! Progression use-case result types (domain representation).

use serde::{Deserialize, Serialize};
use waytrail_domain::{AttemptId, MarkerStatus, ProgressId, RouteId, RouteMarkerId};

/// Result of grading and recording one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    pub attempt_id: AttemptId,
    pub is_correct: bool,
    pub points_earned: u32,
}

/// Result of a marker completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    pub progress_id: ProgressId,
    /// True when this call was a no-op because the marker was already done.
    pub already_completed: bool,
    pub campaign_finished: bool,
    /// Clue guiding the user onward, if the marker carries one.
    pub hint_to_next: Option<String>,
}

/// One marker in an unlock snapshot, enriched for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerView {
    pub marker_id: RouteMarkerId,
    pub route_id: RouteId,
    pub name: String,
    pub status: MarkerStatus,
    pub distance_meters: f64,
    /// Sequence gate satisfied (distinguishes "complete previous markers
    /// first" from "get closer" when locked).
    pub reachable: bool,
    /// Within the unlock radius.
    pub in_range: bool,
    /// The clue currently relevant for this marker.
    pub hint: Option<String>,
    pub question_count: usize,
}

/// Snapshot of every marker for one user at one location. Derived, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockView {
    pub progress_id: ProgressId,
    pub total_score: u32,
    pub is_completed: bool,
    pub markers: Vec<MarkerView>,
}
