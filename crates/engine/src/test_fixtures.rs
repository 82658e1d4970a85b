//! Shared fixtures for use-case tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use uuid::Uuid;
use waytrail_domain::{
    Campaign, CampaignId, CampaignProgress, GeoPoint, MarkerSource, Question, QuestionKind, Route,
    RouteMarker, RouteMarkerId, UserId, VerificationCode, WaypointId,
};

use crate::infrastructure::ports::{ClockPort, RandomPort};

/// Where the simulated user stands (Merlion Park, Singapore).
pub const USER_LOCATION: GeoPoint = GeoPoint {
    lat: 1.2868,
    lng: 103.8545,
};

/// A few meters from [`USER_LOCATION`], inside any sane unlock radius.
pub const NEAR_MARKER: GeoPoint = GeoPoint {
    lat: 1.28681,
    lng: 103.85452,
};

/// Roughly a kilometer away, outside the unlock radius.
pub const FAR_MARKER: GeoPoint = GeoPoint {
    lat: 1.2790,
    lng: 103.8500,
};

/// Build a campaign with the given number of markers per route.
///
/// The very first marker sits beside [`USER_LOCATION`]; every other marker is
/// far away. Each marker carries one ten-point question whose answer is
/// "answer", a hint to the next stop, and the first route a starting hint.
pub fn campaign_with(route_sizes: &[usize]) -> Campaign {
    let campaign_id = CampaignId::new();
    let routes = route_sizes
        .iter()
        .enumerate()
        .map(|(route_idx, &size)| {
            let mut route = Route::new(campaign_id, route_idx as u32, format!("route-{route_idx}"));
            if route_idx == 0 {
                route = route.with_starting_hint("starting hint");
            }
            let route_id = route.id();
            let markers = (0..size)
                .map(|marker_idx| {
                    let position = if route_idx == 0 && marker_idx == 0 {
                        NEAR_MARKER
                    } else {
                        FAR_MARKER
                    };
                    let marker = RouteMarker::new(
                        route_id,
                        marker_idx as u32,
                        MarkerSource::Waypoint {
                            id: WaypointId::new(),
                        },
                        format!("marker-{route_idx}-{marker_idx}"),
                        position,
                    )
                    .with_hint_to_next(format!("hint after {route_idx}-{marker_idx}"));
                    let question = Question::new(
                        marker.id(),
                        0,
                        QuestionKind::TextInput,
                        "what is the answer?",
                        "answer",
                    );
                    marker.with_questions(vec![question])
                })
                .collect();
            route.with_markers(markers)
        })
        .collect();
    Campaign::new("fixture campaign")
        .with_id(campaign_id)
        .with_routes(routes)
}

pub fn marker_ids(campaign: &Campaign) -> Vec<RouteMarkerId> {
    campaign
        .routes()
        .iter()
        .flat_map(|r| r.markers().iter().map(|m| m.id()))
        .collect()
}

pub fn fresh_progress(campaign: &Campaign, user_id: UserId) -> CampaignProgress {
    CampaignProgress::start(
        user_id,
        campaign.id(),
        campaign.routes().first().map(|r| r.id()),
        VerificationCode::generate_with(|| 7),
        fixture_instant(),
    )
}

pub fn fixture_instant() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

struct FixedClock;

impl ClockPort for FixedClock {
    fn now(&self) -> chrono::DateTime<Utc> {
        fixture_instant()
    }
}

pub fn fixed_clock() -> Arc<dyn ClockPort> {
    Arc::new(FixedClock)
}

/// Deterministic counter-based randomness source.
#[derive(Default)]
pub struct SeqRandom {
    counter: AtomicUsize,
}

impl RandomPort for SeqRandom {
    fn gen_index(&self, upper: usize) -> usize {
        self.counter.fetch_add(1, Ordering::Relaxed) % upper.max(1)
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}
