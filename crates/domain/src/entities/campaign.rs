//! Campaigns and their ordered routes.
//!
//! A campaign is immutable once published as far as this core is concerned;
//! editing is an admin-tooling concern outside the engine.

use serde::{Deserialize, Serialize};

use crate::{CampaignId, RouteId, RouteMarker};

/// An ordered sub-sequence of markers within a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    id: RouteId,
    campaign_id: CampaignId,
    /// Route sequence within the campaign.
    order_index: u32,
    name: String,
    /// Guidance shown before the first marker of the first route.
    starting_hint: Option<String>,
    markers: Vec<RouteMarker>,
}

impl Route {
    pub fn new(campaign_id: CampaignId, order_index: u32, name: impl Into<String>) -> Self {
        Self {
            id: RouteId::new(),
            campaign_id,
            order_index,
            name: name.into(),
            starting_hint: None,
            markers: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: RouteId) -> Self {
        self.id = id;
        self
    }

    pub fn with_starting_hint(mut self, hint: impl Into<String>) -> Self {
        self.starting_hint = Some(hint.into());
        self
    }

    pub fn with_markers(mut self, mut markers: Vec<RouteMarker>) -> Self {
        markers.sort_by_key(|m| m.order_index());
        self.markers = markers;
        self
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn campaign_id(&self) -> CampaignId {
        self.campaign_id
    }

    pub fn order_index(&self) -> u32 {
        self.order_index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn starting_hint(&self) -> Option<&str> {
        self.starting_hint.as_deref()
    }

    /// Markers in traversal order.
    pub fn markers(&self) -> &[RouteMarker] {
        &self.markers
    }
}

/// A themed, ordered set of routes a user can undertake.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    id: CampaignId,
    name: String,
    description: String,
    routes: Vec<Route>,
}

impl Campaign {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CampaignId::new(),
            name: name.into(),
            description: String::new(),
            routes: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: CampaignId) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_routes(mut self, mut routes: Vec<Route>) -> Self {
        routes.sort_by_key(|r| r.order_index());
        self.routes = routes;
        self
    }

    pub fn id(&self) -> CampaignId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Routes in traversal order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
