//! Progression use cases - the authoritative game-state transitions.
//!
//! Everything here is invoked synchronously by the HTTP layer: a location
//! poll recomputes the unlock snapshot, a submission records an attempt, a
//! completed marker advances the cursor. Mutations of one progress record
//! are serialized through the storage port's compare-and-swap and atomic
//! increment; this module never read-modify-writes a score.

mod types;

pub use types::{AttemptResult, CompletionResult, MarkerView, UnlockView};

use std::sync::Arc;

use waytrail_domain::{
    grade, resolve_markers, CampaignId, CampaignProgress, CompletionOutcome, DomainError, GeoPoint,
    ProgressId, ProgressionGraph, QuestionAttempt, QuestionId, RouteMarkerId, UserId,
};

use crate::infrastructure::ports::{
    AttemptRepo, CampaignRepo, ClockPort, IdentityRepo, ProgressRepo, RandomPort, RepoError,
};
use crate::infrastructure::settings::ScoringPolicy;
use crate::use_cases::collection::mint_unique_code;

/// How many times a compare-and-swap update is retried before giving up.
const MAX_UPDATE_RETRIES: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum ProgressionError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("operation not permitted for this user")]
    Unauthorized,

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("campaign data is invalid: {0}")]
    InvalidCampaign(String),

    #[error(transparent)]
    Storage(#[from] RepoError),
}

/// Progression state machine and unlock resolution.
pub struct ProgressionUseCases {
    campaigns: Arc<dyn CampaignRepo>,
    progress: Arc<dyn ProgressRepo>,
    attempts: Arc<dyn AttemptRepo>,
    identity: Arc<dyn IdentityRepo>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
    unlock_radius_m: f64,
    scoring_policy: ScoringPolicy,
}

impl ProgressionUseCases {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        campaigns: Arc<dyn CampaignRepo>,
        progress: Arc<dyn ProgressRepo>,
        attempts: Arc<dyn AttemptRepo>,
        identity: Arc<dyn IdentityRepo>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        unlock_radius_m: f64,
        scoring_policy: ScoringPolicy,
    ) -> Self {
        Self {
            campaigns,
            progress,
            attempts,
            identity,
            clock,
            random,
            unlock_radius_m,
            scoring_policy,
        }
    }

    /// Start a campaign, or resume the user's active record.
    ///
    /// Restarting a completed campaign creates a fresh record with a fresh
    /// verification code; the completed record and its collection history
    /// are retained.
    pub async fn start_campaign(
        &self,
        user_id: UserId,
        campaign_id: CampaignId,
    ) -> Result<CampaignProgress, ProgressionError> {
        let campaign = self
            .campaigns
            .get_graph(campaign_id)
            .await?
            .ok_or(ProgressionError::NotFound("Campaign"))?;

        if let Some(existing) = self
            .progress
            .get_active_for_user_campaign(user_id, campaign_id)
            .await?
        {
            if !existing.is_completed() {
                tracing::debug!(%user_id, %campaign_id, "resuming active progress");
                return Ok(existing);
            }
        }

        let first_route_id = campaign.routes().first().map(|r| r.id());
        for _ in 0..MAX_UPDATE_RETRIES {
            let code = mint_unique_code(self.progress.as_ref(), self.random.as_ref()).await?;
            let record = CampaignProgress::start(
                user_id,
                campaign_id,
                first_route_id,
                code,
                self.clock.now(),
            );

            match self.progress.insert(&record).await {
                Ok(()) => {
                    tracing::info!(%user_id, %campaign_id, progress_id = %record.id(), "campaign started");
                    return Ok(record);
                }
                // Either a concurrent start claimed the (user, campaign)
                // pair, or another insert raced us to the code after the
                // mint pre-check. Hand back the winner's record in the first
                // case; re-mint and retry in the second.
                Err(RepoError::ConstraintViolation(_)) => {
                    if let Some(existing) = self
                        .progress
                        .get_active_for_user_campaign(user_id, campaign_id)
                        .await?
                    {
                        if !existing.is_completed() {
                            return Ok(existing);
                        }
                    }
                    tracing::debug!(%user_id, %campaign_id, "insert lost a code race, redrawing");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ProgressionError::Storage(RepoError::storage(
            "start_campaign",
            "progress insert kept conflicting",
        )))
    }

    /// Recompute the per-marker unlock snapshot for the user's position.
    ///
    /// O(markers), no persisted state of its own; cheap enough for the
    /// client's poll interval.
    pub async fn unlock_snapshot(
        &self,
        user_id: UserId,
        campaign_id: CampaignId,
        location: GeoPoint,
    ) -> Result<UnlockView, ProgressionError> {
        let record = self
            .progress
            .get_active_for_user_campaign(user_id, campaign_id)
            .await?
            .ok_or(ProgressionError::NotFound("CampaignProgress"))?;
        let campaign = self
            .campaigns
            .get_graph(campaign_id)
            .await?
            .ok_or(ProgressionError::NotFound("Campaign"))?;
        let graph = build_graph(&campaign)?;

        let completed = record.completed_marker_ids();
        let snapshots = resolve_markers(&graph, location, completed, self.unlock_radius_m);

        let names: std::collections::HashMap<RouteMarkerId, (&str, usize)> = campaign
            .routes()
            .iter()
            .flat_map(|r| r.markers().iter())
            .map(|m| (m.id(), (m.name(), m.questions().len())))
            .collect();

        let markers = snapshots
            .into_iter()
            .map(|s| {
                let (name, question_count) = names
                    .get(&s.marker_id)
                    .map(|(n, c)| ((*n).to_owned(), *c))
                    .unwrap_or_default();
                let hint = graph
                    .hint_for_marker(s.marker_id, completed)
                    .map(str::to_owned);
                MarkerView {
                    marker_id: s.marker_id,
                    route_id: s.route_id,
                    name,
                    status: s.status,
                    distance_meters: s.distance_meters,
                    reachable: s.reachable,
                    in_range: s.in_range,
                    hint,
                    question_count,
                }
            })
            .collect();

        Ok(UnlockView {
            progress_id: record.id(),
            total_score: record.total_score(),
            is_completed: record.is_completed(),
            markers,
        })
    }

    /// Grade a submission, append the immutable attempt, and add any earned
    /// points to the running total.
    ///
    /// Never advances the marker cursor - that happens only via
    /// [`Self::complete_marker`]. The attempt row is persisted before the
    /// score increment so a storage failure can never award unrecorded
    /// points.
    pub async fn record_attempt(
        &self,
        user_id: UserId,
        progress_id: ProgressId,
        question_id: QuestionId,
        raw_answer: &str,
    ) -> Result<AttemptResult, ProgressionError> {
        let record = self
            .progress
            .get(progress_id)
            .await?
            .ok_or(ProgressionError::NotFound("CampaignProgress"))?;
        if record.user_id() != user_id {
            return Err(ProgressionError::Unauthorized);
        }
        let question = self
            .campaigns
            .get_question(question_id)
            .await?
            .ok_or(ProgressionError::NotFound("Question"))?;

        let graded = grade(&question, raw_answer);
        let mut points = graded.points_earned;
        if points > 0
            && self.scoring_policy == ScoringPolicy::FirstCorrectOnly
            && self
                .attempts
                .has_correct_attempt(progress_id, question_id)
                .await?
        {
            points = 0;
        }

        let attempt = QuestionAttempt::new(
            user_id,
            question_id,
            progress_id,
            raw_answer,
            graded.is_correct,
            points,
            self.clock.now(),
        );
        self.attempts.append(&attempt).await?;
        if points > 0 {
            self.progress.add_score(progress_id, points).await?;
        }

        tracing::debug!(
            %progress_id,
            %question_id,
            is_correct = graded.is_correct,
            points,
            "attempt recorded"
        );
        Ok(AttemptResult {
            attempt_id: attempt.id(),
            is_correct: graded.is_correct,
            points_earned: points,
        })
    }

    /// Complete a marker, advancing route and campaign state.
    ///
    /// Idempotent: a repeat call reports `already_completed` and persists
    /// nothing. Reachability is re-checked against the stored record because
    /// the client's unlock gate can be stale or bypassed. Concurrent
    /// completions are resolved by compare-and-swap retry.
    pub async fn complete_marker(
        &self,
        user_id: UserId,
        progress_id: ProgressId,
        marker_id: RouteMarkerId,
    ) -> Result<CompletionResult, ProgressionError> {
        let mut last_conflict: Option<RepoError> = None;

        for _ in 0..MAX_UPDATE_RETRIES {
            let mut record = self
                .progress
                .get(progress_id)
                .await?
                .ok_or(ProgressionError::NotFound("CampaignProgress"))?;
            if record.user_id() != user_id {
                return Err(ProgressionError::Unauthorized);
            }
            let campaign = self
                .campaigns
                .get_graph(record.campaign_id())
                .await?
                .ok_or(ProgressionError::NotFound("Campaign"))?;
            let graph = build_graph(&campaign)?;

            let expected_revision = record.revision();
            let outcome = record
                .complete_marker(&graph, marker_id, self.clock.now())
                .map_err(|e| match e {
                    DomainError::NotFound { .. } => ProgressionError::NotFound("RouteMarker"),
                    DomainError::InvalidTransition(msg) => {
                        ProgressionError::InvalidTransition(msg)
                    }
                    other => ProgressionError::InvalidCampaign(other.to_string()),
                })?;

            let hint_to_next = graph
                .hint_for_marker(marker_id, record.completed_marker_ids())
                .map(str::to_owned);

            match outcome {
                CompletionOutcome::AlreadyCompleted => {
                    return Ok(CompletionResult {
                        progress_id,
                        already_completed: true,
                        campaign_finished: record.is_completed(),
                        hint_to_next,
                    });
                }
                CompletionOutcome::Completed { campaign_finished } => {
                    match self.progress.update(&record, expected_revision).await {
                        Ok(()) => {
                            tracing::info!(
                                %progress_id,
                                %marker_id,
                                campaign_finished,
                                "marker completed"
                            );
                            return Ok(CompletionResult {
                                progress_id,
                                already_completed: false,
                                campaign_finished,
                                hint_to_next,
                            });
                        }
                        Err(e) if e.is_conflict() => {
                            tracing::debug!(%progress_id, "completion raced, retrying");
                            last_conflict = Some(e);
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        }

        Err(last_conflict
            .map(ProgressionError::Storage)
            .unwrap_or(ProgressionError::NotFound("CampaignProgress")))
    }

    /// A user's progress records, oldest first.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CampaignProgress>, ProgressionError> {
        Ok(self.progress.list_for_user(user_id).await?)
    }

    /// All progress records for a campaign. Admin-only.
    pub async fn list_for_campaign(
        &self,
        admin_id: UserId,
        campaign_id: CampaignId,
    ) -> Result<Vec<CampaignProgress>, ProgressionError> {
        self.require_admin(admin_id).await?;
        Ok(self.progress.list_for_campaign(campaign_id).await?)
    }

    /// Attempt history for a progress record, visible to its owner or an
    /// admin.
    pub async fn attempts_for_progress(
        &self,
        requester_id: UserId,
        progress_id: ProgressId,
    ) -> Result<Vec<QuestionAttempt>, ProgressionError> {
        let record = self
            .progress
            .get(progress_id)
            .await?
            .ok_or(ProgressionError::NotFound("CampaignProgress"))?;
        if record.user_id() != requester_id {
            self.require_admin(requester_id).await?;
        }
        Ok(self.attempts.list_for_progress(progress_id).await?)
    }

    async fn require_admin(&self, user_id: UserId) -> Result<(), ProgressionError> {
        let user = self
            .identity
            .get_user(user_id)
            .await?
            .ok_or(ProgressionError::Unauthorized)?;
        if !user.is_admin() {
            return Err(ProgressionError::Unauthorized);
        }
        Ok(())
    }
}

fn build_graph(
    campaign: &waytrail_domain::Campaign,
) -> Result<ProgressionGraph, ProgressionError> {
    ProgressionGraph::build(campaign).map_err(|e| ProgressionError::InvalidCampaign(e.to_string()))
}
