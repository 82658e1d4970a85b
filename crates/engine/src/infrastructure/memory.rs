//! In-memory storage adapter.
//!
//! Backs the repository ports with `DashMap`s. Entry locks give the same
//! per-record atomicity the port contracts demand from a real database:
//! `add_score` increments under the entry lock and `update` is a
//! compare-and-swap on the record's revision.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use waytrail_domain::{
    Campaign, CampaignId, CampaignProgress, ProgressId, Question, QuestionAttempt, QuestionId,
    UserId, VerificationCode,
};

use super::ports::{
    AttemptRepo, CampaignRepo, ClockPort, IdentityRepo, ProgressRepo, RepoError, UserRecord,
};

/// Process-local store implementing every repository port.
pub struct MemoryStore {
    clock: Arc<dyn ClockPort>,
    campaigns: DashMap<CampaignId, Campaign>,
    questions: DashMap<QuestionId, Question>,
    progress: DashMap<ProgressId, CampaignProgress>,
    code_index: DashMap<String, ProgressId>,
    /// (user, campaign) -> their non-completed record. Claimed atomically on
    /// insert and released when the record's completing update lands.
    active_index: DashMap<(UserId, CampaignId), ProgressId>,
    attempts: DashMap<ProgressId, Vec<QuestionAttempt>>,
    users: DashMap<UserId, UserRecord>,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self {
            clock,
            campaigns: DashMap::new(),
            questions: DashMap::new(),
            progress: DashMap::new(),
            code_index: DashMap::new(),
            active_index: DashMap::new(),
            attempts: DashMap::new(),
            users: DashMap::new(),
        }
    }

    /// Load a campaign graph, indexing its questions for direct lookup.
    pub fn put_campaign(&self, campaign: Campaign) {
        for route in campaign.routes() {
            for marker in route.markers() {
                for question in marker.questions() {
                    self.questions.insert(question.id(), question.clone());
                }
            }
        }
        self.campaigns.insert(campaign.id(), campaign);
    }

    pub fn put_user(&self, user: UserRecord) {
        self.users.insert(user.id, user);
    }
}

#[async_trait]
impl CampaignRepo for MemoryStore {
    async fn get_graph(&self, id: CampaignId) -> Result<Option<Campaign>, RepoError> {
        Ok(self.campaigns.get(&id).map(|c| c.clone()))
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, RepoError> {
        Ok(self.questions.get(&id).map(|q| q.clone()))
    }
}

#[async_trait]
impl ProgressRepo for MemoryStore {
    async fn get(&self, id: ProgressId) -> Result<Option<CampaignProgress>, RepoError> {
        Ok(self.progress.get(&id).map(|p| p.clone()))
    }

    async fn get_active_for_user_campaign(
        &self,
        user_id: UserId,
        campaign_id: CampaignId,
    ) -> Result<Option<CampaignProgress>, RepoError> {
        if let Some(id) = self.active_index.get(&(user_id, campaign_id)).map(|e| *e) {
            return self.get(id).await;
        }
        // No active record; fall back to the most recently started one.
        let mut candidates: Vec<CampaignProgress> = self
            .progress
            .iter()
            .filter(|p| p.user_id() == user_id && p.campaign_id() == campaign_id)
            .map(|p| p.clone())
            .collect();
        candidates.sort_by_key(|p| p.started_at());
        Ok(candidates.pop())
    }

    async fn get_by_verification_code(
        &self,
        code: &VerificationCode,
    ) -> Result<Option<CampaignProgress>, RepoError> {
        let Some(id) = self.code_index.get(code.as_str()).map(|id| *id) else {
            return Ok(None);
        };
        self.get(id).await
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CampaignProgress>, RepoError> {
        let mut records: Vec<CampaignProgress> = self
            .progress
            .iter()
            .filter(|p| p.user_id() == user_id)
            .map(|p| p.clone())
            .collect();
        records.sort_by_key(|p| p.started_at());
        Ok(records)
    }

    async fn list_for_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<CampaignProgress>, RepoError> {
        let mut records: Vec<CampaignProgress> = self
            .progress
            .iter()
            .filter(|p| p.campaign_id() == campaign_id)
            .map(|p| p.clone())
            .collect();
        records.sort_by_key(|p| p.started_at());
        Ok(records)
    }

    async fn insert(&self, progress: &CampaignProgress) -> Result<(), RepoError> {
        // DashMap entries give atomic claims on the (user, campaign) pair and
        // the code namespace; concurrent inserts cannot both pass a check.
        let pair = (progress.user_id(), progress.campaign_id());
        if !progress.is_completed() {
            match self.active_index.entry(pair) {
                Entry::Occupied(_) => {
                    return Err(RepoError::constraint(format!(
                        "active progress already exists for user {} in campaign {}",
                        progress.user_id(),
                        progress.campaign_id()
                    )));
                }
                Entry::Vacant(slot) => {
                    slot.insert(progress.id());
                }
            }
        }
        let code = progress.verification_code().as_str().to_owned();
        match self.code_index.entry(code) {
            Entry::Occupied(_) => {
                self.active_index.remove_if(&pair, |_, id| *id == progress.id());
                return Err(RepoError::constraint(format!(
                    "verification code {} already assigned",
                    progress.verification_code()
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(progress.id());
            }
        }
        self.progress.insert(progress.id(), progress.clone());
        Ok(())
    }

    async fn update(
        &self,
        progress: &CampaignProgress,
        expected_revision: u64,
    ) -> Result<(), RepoError> {
        let mut entry = self
            .progress
            .get_mut(&progress.id())
            .ok_or_else(|| RepoError::not_found("CampaignProgress", progress.id()))?;
        if entry.revision() != expected_revision {
            return Err(RepoError::conflict("CampaignProgress", progress.id()));
        }
        *entry = progress.clone();
        drop(entry);
        if progress.is_completed() {
            self.active_index.remove_if(
                &(progress.user_id(), progress.campaign_id()),
                |_, id| *id == progress.id(),
            );
        }
        Ok(())
    }

    async fn add_score(&self, id: ProgressId, points: u32) -> Result<(), RepoError> {
        let mut entry = self
            .progress
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("CampaignProgress", id))?;
        entry.add_points(points, self.clock.now());
        Ok(())
    }
}

#[async_trait]
impl AttemptRepo for MemoryStore {
    async fn append(&self, attempt: &QuestionAttempt) -> Result<(), RepoError> {
        self.attempts
            .entry(attempt.progress_id())
            .or_default()
            .push(attempt.clone());
        Ok(())
    }

    async fn list_for_progress(
        &self,
        progress_id: ProgressId,
    ) -> Result<Vec<QuestionAttempt>, RepoError> {
        Ok(self
            .attempts
            .get(&progress_id)
            .map(|a| a.clone())
            .unwrap_or_default())
    }

    async fn has_correct_attempt(
        &self,
        progress_id: ProgressId,
        question_id: QuestionId,
    ) -> Result<bool, RepoError> {
        Ok(self
            .attempts
            .get(&progress_id)
            .is_some_and(|a| a.iter().any(|x| x.question_id() == question_id && x.is_correct())))
    }
}

#[async_trait]
impl IdentityRepo for MemoryStore {
    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }
}
