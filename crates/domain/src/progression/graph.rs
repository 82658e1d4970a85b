//! Campaign traversal graph.
//!
//! Built once per campaign from its routes, markers, and questions, then
//! queried read-only on every unlock recomputation and completion event.
//! Traversal is strictly in-order both within and across routes: a later
//! route's markers are never reachable until the entire earlier route is
//! finished.

use std::collections::{HashMap, HashSet};

use crate::entities::Campaign;
use crate::error::DomainError;
use crate::value_objects::GeoPoint;
use crate::{CampaignId, RouteId, RouteMarkerId};

/// A marker as seen by the traversal graph.
#[derive(Debug, Clone)]
pub struct GraphMarker {
    id: RouteMarkerId,
    route_id: RouteId,
    position: GeoPoint,
    hint_to_next: Option<String>,
}

impl GraphMarker {
    pub fn id(&self) -> RouteMarkerId {
        self.id
    }

    pub fn route_id(&self) -> RouteId {
        self.route_id
    }

    pub fn position(&self) -> GeoPoint {
        self.position
    }

    pub fn hint_to_next(&self) -> Option<&str> {
        self.hint_to_next.as_deref()
    }
}

#[derive(Debug, Clone)]
struct GraphRoute {
    id: RouteId,
    starting_hint: Option<String>,
    markers: Vec<GraphMarker>,
}

/// In-memory traversal index over a campaign's routes and markers.
#[derive(Debug, Clone)]
pub struct ProgressionGraph {
    campaign_id: CampaignId,
    routes: Vec<GraphRoute>,
    /// marker id -> (route position, marker position within route)
    index: HashMap<RouteMarkerId, (usize, usize)>,
}

impl ProgressionGraph {
    /// Build the graph from a campaign aggregate.
    ///
    /// Routes and markers are already held in traversal order by the
    /// entities; duplicate marker ids are a data error and rejected.
    pub fn build(campaign: &Campaign) -> Result<Self, DomainError> {
        let mut routes = Vec::with_capacity(campaign.routes().len());
        let mut index = HashMap::new();

        for (route_pos, route) in campaign.routes().iter().enumerate() {
            let mut markers = Vec::with_capacity(route.markers().len());
            for (marker_pos, m) in route.markers().iter().enumerate() {
                if index.insert(m.id(), (route_pos, marker_pos)).is_some() {
                    return Err(DomainError::constraint(format!(
                        "duplicate marker id {} in campaign {}",
                        m.id(),
                        campaign.id()
                    )));
                }
                markers.push(GraphMarker {
                    id: m.id(),
                    route_id: route.id(),
                    position: m.position(),
                    hint_to_next: m.hint_to_next().map(str::to_owned),
                });
            }
            routes.push(GraphRoute {
                id: route.id(),
                starting_hint: route.starting_hint().map(str::to_owned),
                markers,
            });
        }

        Ok(Self {
            campaign_id: campaign.id(),
            routes,
            index,
        })
    }

    pub fn campaign_id(&self) -> CampaignId {
        self.campaign_id
    }

    pub fn contains(&self, marker_id: RouteMarkerId) -> bool {
        self.index.contains_key(&marker_id)
    }

    pub fn marker_count(&self) -> usize {
        self.index.len()
    }

    /// All markers in traversal order.
    pub fn markers(&self) -> impl Iterator<Item = &GraphMarker> {
        self.routes.iter().flat_map(|r| r.markers.iter())
    }

    /// The first route of the campaign, if any.
    pub fn first_route(&self) -> Option<RouteId> {
        self.routes.first().map(|r| r.id)
    }

    /// Route owning the given marker. Unknown markers fail closed.
    pub fn route_of(&self, marker_id: RouteMarkerId) -> Option<RouteId> {
        self.index
            .get(&marker_id)
            .map(|&(route_pos, _)| self.routes[route_pos].id)
    }

    /// The route after the given one in campaign order, if any.
    pub fn next_route_after(&self, route_id: RouteId) -> Option<RouteId> {
        let pos = self.routes.iter().position(|r| r.id == route_id)?;
        self.routes.get(pos + 1).map(|r| r.id)
    }

    /// True iff every marker with a strictly lower order within the same
    /// route is completed, and every marker of every prior route is
    /// completed. Unknown markers are never reachable.
    pub fn is_marker_reachable(
        &self,
        marker_id: RouteMarkerId,
        completed: &HashSet<RouteMarkerId>,
    ) -> bool {
        let Some(&(route_pos, marker_pos)) = self.index.get(&marker_id) else {
            return false;
        };
        let prior_routes_done = self.routes[..route_pos]
            .iter()
            .all(|r| r.markers.iter().all(|m| completed.contains(&m.id)));
        let prior_markers_done = self.routes[route_pos].markers[..marker_pos]
            .iter()
            .all(|m| completed.contains(&m.id));
        prior_routes_done && prior_markers_done
    }

    /// True iff every marker of the route is completed.
    pub fn is_route_complete(
        &self,
        route_id: RouteId,
        completed: &HashSet<RouteMarkerId>,
    ) -> bool {
        self.routes
            .iter()
            .find(|r| r.id == route_id)
            .is_some_and(|r| r.markers.iter().all(|m| completed.contains(&m.id)))
    }

    /// True iff the completed set covers every marker of every route.
    pub fn is_campaign_fully_complete(&self, completed: &HashSet<RouteMarkerId>) -> bool {
        self.marker_count() > 0 && self.markers().all(|m| completed.contains(&m.id))
    }

    /// The clue currently relevant for a marker.
    ///
    /// After completion, the marker's own `hint_to_next`. Before completion,
    /// the preceding marker's `hint_to_next` guides the user toward it; the
    /// very first marker of the first route falls back to the route's
    /// starting hint.
    pub fn hint_for_marker(
        &self,
        marker_id: RouteMarkerId,
        completed: &HashSet<RouteMarkerId>,
    ) -> Option<&str> {
        let &(route_pos, marker_pos) = self.index.get(&marker_id)?;
        if completed.contains(&marker_id) {
            return self.routes[route_pos].markers[marker_pos].hint_to_next();
        }
        if marker_pos > 0 {
            return self.routes[route_pos].markers[marker_pos - 1].hint_to_next();
        }
        if route_pos > 0 {
            return self.routes[route_pos - 1]
                .markers
                .last()
                .and_then(|m| m.hint_to_next());
        }
        self.routes[route_pos].starting_hint.as_deref()
    }
}
