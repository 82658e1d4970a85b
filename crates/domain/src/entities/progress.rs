//! Campaign progress - the authoritative per-user, per-campaign record.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::DomainError;
use crate::progression::ProgressionGraph;
use crate::value_objects::VerificationCode;
use crate::{CampaignId, ProgressId, RouteId, RouteMarkerId, UserId};

/// Result of a `complete_marker` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Marker newly completed. `campaign_finished` is true when this was the
    /// last marker of the last route.
    Completed { campaign_finished: bool },
    /// Marker was already completed; nothing changed and nothing must be
    /// persisted or double-counted.
    AlreadyCompleted,
}

/// Why a points-collection transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CollectError {
    #[error("campaign is not completed")]
    NotCompleted,
    #[error("points already collected")]
    AlreadyCollected,
}

/// Per-user, per-campaign progression state.
///
/// Gameplay moves `InProgress` -> `Completed` (terminal); points collection is
/// an orthogonal one-shot flag that can only flip once the record is
/// completed. Mutations for one record must be serialized by the storage
/// layer; `revision` supports optimistic compare-and-swap there.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignProgress {
    id: ProgressId,
    user_id: UserId,
    campaign_id: CampaignId,
    current_route_id: Option<RouteId>,
    current_marker_index: u32,
    completed_route_ids: HashSet<RouteId>,
    completed_marker_ids: HashSet<RouteMarkerId>,
    total_score: u32,
    is_completed: bool,
    verification_code: VerificationCode,
    points_collected: bool,
    collected_by: Option<UserId>,
    collected_at: Option<DateTime<Utc>>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    last_activity_at: DateTime<Utc>,
    /// Optimistic-concurrency counter, bumped on every mutation.
    revision: u64,
}

impl CampaignProgress {
    /// Start a fresh record at the first route of the campaign.
    pub fn start(
        user_id: UserId,
        campaign_id: CampaignId,
        first_route_id: Option<RouteId>,
        verification_code: VerificationCode,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ProgressId::new(),
            user_id,
            campaign_id,
            current_route_id: first_route_id,
            current_marker_index: 0,
            completed_route_ids: HashSet::new(),
            completed_marker_ids: HashSet::new(),
            total_score: 0,
            is_completed: false,
            verification_code,
            points_collected: false,
            collected_by: None,
            collected_at: None,
            started_at: now,
            completed_at: None,
            last_activity_at: now,
            revision: 0,
        }
    }

    // === Accessors ===

    pub fn id(&self) -> ProgressId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn campaign_id(&self) -> CampaignId {
        self.campaign_id
    }

    pub fn current_route_id(&self) -> Option<RouteId> {
        self.current_route_id
    }

    pub fn current_marker_index(&self) -> u32 {
        self.current_marker_index
    }

    pub fn completed_route_ids(&self) -> &HashSet<RouteId> {
        &self.completed_route_ids
    }

    pub fn completed_marker_ids(&self) -> &HashSet<RouteMarkerId> {
        &self.completed_marker_ids
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn verification_code(&self) -> &VerificationCode {
        &self.verification_code
    }

    pub fn points_collected(&self) -> bool {
        self.points_collected
    }

    pub fn collected_by(&self) -> Option<UserId> {
        self.collected_by
    }

    pub fn collected_at(&self) -> Option<DateTime<Utc>> {
        self.collected_at
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_activity_at
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    // === Transitions ===

    /// Add correctly-earned points to the running total.
    ///
    /// The storage layer performs the durable increment atomically; this
    /// keeps the in-memory view consistent with it.
    pub fn add_points(&mut self, points: u32, now: DateTime<Utc>) {
        self.total_score = self.total_score.saturating_add(points);
        self.touch(now);
    }

    /// Complete a marker, advancing the cursor and route bookkeeping.
    ///
    /// Idempotent: completing an already-completed marker is a successful
    /// no-op. Reachability is re-checked here because the client-side unlock
    /// gate can be stale or bypassed.
    pub fn complete_marker(
        &mut self,
        graph: &ProgressionGraph,
        marker_id: RouteMarkerId,
        now: DateTime<Utc>,
    ) -> Result<CompletionOutcome, DomainError> {
        if graph.campaign_id() != self.campaign_id {
            return Err(DomainError::constraint(
                "progression graph belongs to a different campaign",
            ));
        }
        if self.completed_marker_ids.contains(&marker_id) {
            return Ok(CompletionOutcome::AlreadyCompleted);
        }
        let route_id = graph
            .route_of(marker_id)
            .ok_or_else(|| DomainError::not_found("RouteMarker", marker_id.to_string()))?;
        if !graph.is_marker_reachable(marker_id, &self.completed_marker_ids) {
            return Err(DomainError::invalid_transition(format!(
                "marker {marker_id} is not reachable yet"
            )));
        }

        self.completed_marker_ids.insert(marker_id);
        self.current_marker_index = self.current_marker_index.saturating_add(1);

        if graph.is_route_complete(route_id, &self.completed_marker_ids) {
            self.completed_route_ids.insert(route_id);
            self.current_route_id = graph.next_route_after(route_id);
        }

        let campaign_finished = graph.is_campaign_fully_complete(&self.completed_marker_ids);
        if campaign_finished && !self.is_completed {
            self.is_completed = true;
            self.completed_at = Some(now);
        }
        self.touch(now);

        Ok(CompletionOutcome::Completed { campaign_finished })
    }

    /// One-shot transition recording the physical reward handoff.
    ///
    /// Only valid on a completed record, and never twice. There is no
    /// un-collect operation.
    pub fn mark_points_collected(
        &mut self,
        admin_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<(), CollectError> {
        if !self.is_completed {
            return Err(CollectError::NotCompleted);
        }
        if self.points_collected {
            return Err(CollectError::AlreadyCollected);
        }
        self.points_collected = true;
        self.collected_by = Some(admin_id);
        self.collected_at = Some(now);
        self.touch(now);
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity_at = now;
        self.revision += 1;
    }
}
