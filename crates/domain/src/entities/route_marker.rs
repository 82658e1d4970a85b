//! Geolocated markers along a route.

use serde::{Deserialize, Serialize};

use crate::value_objects::GeoPoint;
use crate::{CampaignMarkerId, Question, RouteId, RouteMarkerId, WaypointId};

/// Where a marker's position and descriptive content come from.
///
/// A marker references exactly one of a shared heritage waypoint or a
/// campaign-specific marker. The storage layer resolves the reference to a
/// position and display content before the core sees the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarkerSource {
    Waypoint { id: WaypointId },
    CampaignMarker { id: CampaignMarkerId },
}

/// A single stop on a route: a position, display content, the clue to the
/// next stop, and zero or more questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMarker {
    id: RouteMarkerId,
    route_id: RouteId,
    /// Marker sequence within the route; unique per route.
    order_index: u32,
    source: MarkerSource,
    name: String,
    description: String,
    position: GeoPoint,
    /// Shown after this marker's questions are all answered, guiding the
    /// user to the next marker. The first marker of the first route is
    /// reached via the route's starting hint instead.
    hint_to_next: Option<String>,
    questions: Vec<Question>,
}

impl RouteMarker {
    pub fn new(
        route_id: RouteId,
        order_index: u32,
        source: MarkerSource,
        name: impl Into<String>,
        position: GeoPoint,
    ) -> Self {
        Self {
            id: RouteMarkerId::new(),
            route_id,
            order_index,
            source,
            name: name.into(),
            description: String::new(),
            position,
            hint_to_next: None,
            questions: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: RouteMarkerId) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_hint_to_next(mut self, hint: impl Into<String>) -> Self {
        self.hint_to_next = Some(hint.into());
        self
    }

    pub fn with_questions(mut self, mut questions: Vec<Question>) -> Self {
        questions.sort_by_key(|q| q.order_index());
        self.questions = questions;
        self
    }

    pub fn id(&self) -> RouteMarkerId {
        self.id
    }

    pub fn route_id(&self) -> RouteId {
        self.route_id
    }

    pub fn order_index(&self) -> u32 {
        self.order_index
    }

    pub fn source(&self) -> MarkerSource {
        self.source
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn position(&self) -> GeoPoint {
        self.position
    }

    pub fn hint_to_next(&self) -> Option<&str> {
        self.hint_to_next.as_deref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}
