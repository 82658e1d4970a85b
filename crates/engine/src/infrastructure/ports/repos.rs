//! Repository port traits for storage access.
//!
//! The storage collaborator must provide uniqueness-checked inserts and
//! single-row atomic updates; the engine does not implement its own locking.

use async_trait::async_trait;
use waytrail_domain::{
    Campaign, CampaignId, CampaignProgress, ProgressId, Question, QuestionAttempt, QuestionId,
    UserId, VerificationCode,
};

use super::error::RepoError;
use super::types::UserRecord;

// =============================================================================
// Campaign Graph (read-only for this engine)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignRepo: Send + Sync {
    /// Fetch the full Campaign -> Routes -> RouteMarkers -> Questions graph,
    /// with marker positions already resolved from their waypoint or
    /// campaign-marker source.
    async fn get_graph(&self, id: CampaignId) -> Result<Option<Campaign>, RepoError>;

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, RepoError>;
}

// =============================================================================
// Progress Records
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressRepo: Send + Sync {
    async fn get(&self, id: ProgressId) -> Result<Option<CampaignProgress>, RepoError>;

    /// The non-completed record for the pair when one exists, otherwise the
    /// most recently started one. At most one non-completed record exists
    /// per (user, campaign).
    async fn get_active_for_user_campaign(
        &self,
        user_id: UserId,
        campaign_id: CampaignId,
    ) -> Result<Option<CampaignProgress>, RepoError>;

    async fn get_by_verification_code(
        &self,
        code: &VerificationCode,
    ) -> Result<Option<CampaignProgress>, RepoError>;

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CampaignProgress>, RepoError>;

    async fn list_for_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<CampaignProgress>, RepoError>;

    /// Uniqueness-checked insert: fails with `ConstraintViolation` when a
    /// non-completed record already exists for the (user, campaign) pair or
    /// the verification code is taken.
    async fn insert(&self, progress: &CampaignProgress) -> Result<(), RepoError>;

    /// Single-row compare-and-swap on the record's revision. Fails with
    /// `Conflict` when the stored revision differs from `expected_revision`.
    async fn update(
        &self,
        progress: &CampaignProgress,
        expected_revision: u64,
    ) -> Result<(), RepoError>;

    /// Atomic score increment; never read-modify-write at the caller.
    async fn add_score(&self, id: ProgressId, points: u32) -> Result<(), RepoError>;
}

// =============================================================================
// Question Attempts (append-only)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptRepo: Send + Sync {
    async fn append(&self, attempt: &QuestionAttempt) -> Result<(), RepoError>;

    async fn list_for_progress(
        &self,
        progress_id: ProgressId,
    ) -> Result<Vec<QuestionAttempt>, RepoError>;

    /// Whether a correct attempt already exists for the question on this
    /// record. Used by the `first_correct_only` scoring policy.
    async fn has_correct_attempt(
        &self,
        progress_id: ProgressId,
        question_id: QuestionId,
    ) -> Result<bool, RepoError>;
}

// =============================================================================
// Identity (role resolution only - auth lives outside this engine)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityRepo: Send + Sync {
    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>, RepoError>;
}
