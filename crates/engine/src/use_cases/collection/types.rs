//! Collection use-case payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use waytrail_domain::{CampaignId, ProgressId, UserId};

/// Claims embedded in a scannable token.
///
/// The token is a transport encoding, not a credential: verification
/// re-reads the progress record and cross-checks every claim against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub progress_id: ProgressId,
    pub user_id: UserId,
    pub campaign_id: CampaignId,
    pub issued_at: DateTime<Utc>,
}

/// A freshly issued scannable token plus its display forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub progress_id: ProgressId,
    pub token: String,
    /// Human-enterable fallback for when scanning fails.
    pub verification_code: String,
    /// Admin scanner URL the QR image encodes.
    pub url: String,
    pub qr_svg: String,
}

/// What the admin sees after a successful verification, before deciding to
/// hand over the reward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationView {
    pub progress_id: ProgressId,
    pub user_id: UserId,
    pub username: String,
    pub campaign_id: CampaignId,
    pub total_score: u32,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub points_collected: bool,
    pub collected_at: Option<DateTime<Utc>>,
    pub verification_code: String,
}
