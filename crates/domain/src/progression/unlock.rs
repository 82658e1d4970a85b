//! Per-marker unlock classification.
//!
//! Derived state only: recomputed from scratch on every location update or
//! completion event, never persisted. O(markers) per call with no I/O so the
//! client can poll it freely.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::progression::ProgressionGraph;
use crate::value_objects::{distance_meters, GeoPoint};
use crate::{RouteId, RouteMarkerId};

/// Gameplay status of a marker for one user at one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStatus {
    Locked,
    Unlocked,
    Completed,
}

/// One marker's classification within an unlock snapshot.
///
/// `reachable` and `in_range` are exposed separately because both map to
/// `Locked` but the caller must distinguish "sequence not yet satisfied"
/// from "too far" when choosing the hint message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerSnapshot {
    pub marker_id: RouteMarkerId,
    pub route_id: RouteId,
    pub status: MarkerStatus,
    pub distance_meters: f64,
    /// Sequence gate: all prior markers (and prior routes) completed.
    pub reachable: bool,
    /// Proximity gate: within the unlock radius.
    pub in_range: bool,
}

/// Classify every marker of the campaign for the given user position.
pub fn resolve_markers(
    graph: &ProgressionGraph,
    user_location: GeoPoint,
    completed: &HashSet<RouteMarkerId>,
    radius_m: f64,
) -> Vec<MarkerSnapshot> {
    graph
        .markers()
        .map(|m| {
            let distance = distance_meters(user_location, m.position());
            let reachable = graph.is_marker_reachable(m.id(), completed);
            let in_range = distance <= radius_m;
            let status = if completed.contains(&m.id()) {
                MarkerStatus::Completed
            } else if reachable && in_range {
                MarkerStatus::Unlocked
            } else {
                MarkerStatus::Locked
            };
            MarkerSnapshot {
                marker_id: m.id(),
                route_id: m.route_id(),
                status,
                distance_meters: distance,
                reachable,
                in_range,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Campaign, MarkerSource, Route, RouteMarker};
    use crate::{CampaignId, WaypointId};

    const NEAR: GeoPoint = GeoPoint {
        lat: 1.28151,
        lng: 103.84401,
    };
    const FAR: GeoPoint = GeoPoint {
        lat: 1.2900,
        lng: 103.8500,
    };

    fn marker_at(route_id: RouteId, order: u32, position: GeoPoint) -> RouteMarker {
        RouteMarker::new(
            route_id,
            order,
            MarkerSource::Waypoint {
                id: WaypointId::new(),
            },
            format!("marker-{order}"),
            position,
        )
    }

    /// One route: first marker near the user, second marker far away.
    fn campaign() -> Campaign {
        let campaign_id = CampaignId::new();
        let r = Route::new(campaign_id, 0, "route");
        let r_id = r.id();
        let r = r.with_markers(vec![
            marker_at(r_id, 0, NEAR),
            marker_at(r_id, 1, FAR),
        ]);
        Campaign::new("unlock test")
            .with_id(campaign_id)
            .with_routes(vec![r])
    }

    #[test]
    fn test_reachable_marker_in_range_unlocks() {
        let c = campaign();
        let g = ProgressionGraph::build(&c).expect("valid campaign");
        let user = GeoPoint::new(1.2815, 103.8440);

        let snapshots = resolve_markers(&g, user, &HashSet::new(), 20.0);
        assert_eq!(snapshots.len(), 2);

        assert_eq!(snapshots[0].status, MarkerStatus::Unlocked);
        assert!(snapshots[0].reachable);
        assert!(snapshots[0].in_range);
        assert!(snapshots[0].distance_meters < 20.0);
    }

    #[test]
    fn test_locked_reasons_are_distinguishable() {
        let c = campaign();
        let g = ProgressionGraph::build(&c).expect("valid campaign");
        let user = GeoPoint::new(1.2815, 103.8440);

        let snapshots = resolve_markers(&g, user, &HashSet::new(), 20.0);

        // Second marker: sequence not satisfied AND out of range.
        assert_eq!(snapshots[1].status, MarkerStatus::Locked);
        assert!(!snapshots[1].reachable);
        assert!(!snapshots[1].in_range);

        // Complete the first marker; the second becomes reachable but is
        // still out of range - "too far", not "out of sequence".
        let done: HashSet<_> = [snapshots[0].marker_id].into();
        let snapshots = resolve_markers(&g, user, &done, 20.0);
        assert_eq!(snapshots[1].status, MarkerStatus::Locked);
        assert!(snapshots[1].reachable);
        assert!(!snapshots[1].in_range);
    }

    #[test]
    fn test_completed_marker_stays_completed_out_of_range() {
        let c = campaign();
        let g = ProgressionGraph::build(&c).expect("valid campaign");
        // User has wandered far from the first marker.
        let user = GeoPoint::new(1.30, 103.90);

        let first = g.markers().next().expect("campaign has markers").id();
        let done: HashSet<_> = [first].into();
        let snapshots = resolve_markers(&g, user, &done, 20.0);
        assert_eq!(snapshots[0].status, MarkerStatus::Completed);
        assert!(!snapshots[0].in_range);
    }

    #[test]
    fn test_radius_is_honored() {
        let c = campaign();
        let g = ProgressionGraph::build(&c).expect("valid campaign");
        let user = GeoPoint::new(1.2815, 103.8440);

        // With a sub-meter radius even the nearby marker stays locked.
        let snapshots = resolve_markers(&g, user, &HashSet::new(), 0.5);
        assert_eq!(snapshots[0].status, MarkerStatus::Locked);
        assert!(snapshots[0].reachable);
        assert!(!snapshots[0].in_range);
    }
}
