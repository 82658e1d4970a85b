//! Progression algorithms: traversal graph, unlock resolution, grading.

pub mod grading;
pub mod graph;
pub mod unlock;

pub use grading::{grade, GradedAnswer};
pub use graph::{GraphMarker, ProgressionGraph};
pub use unlock::{resolve_markers, MarkerSnapshot, MarkerStatus};
