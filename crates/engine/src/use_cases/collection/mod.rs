//! Reward collection - verification codes, scannable tokens, and the
//! one-shot points handoff.
//!
//! Verification fails closed: a token or code only ever resolves through the
//! stored progress record, and every claim inside a token is cross-checked
//! against that record before anything is shown to the admin.

mod types;

pub use types::{IssuedToken, TokenClaims, VerificationView};

use std::sync::Arc;

use waytrail_domain::{
    value_objects::CODE_ALPHABET, CampaignProgress, CollectError, ProgressId, UserId,
    VerificationCode,
};

use crate::infrastructure::ports::{
    BarcodeError, BarcodePort, ClockPort, IdentityRepo, ProgressRepo, RandomPort, RepoError,
};

/// How many candidate codes are drawn before giving up on a collision storm.
const MAX_CODE_ATTEMPTS: usize = 10;

/// Compare-and-swap retries for the collection transition.
const MAX_UPDATE_RETRIES: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("operation not permitted for this user")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("token is not valid: {0}")]
    InvalidToken(String),

    #[error("token claims do not match the stored record")]
    DataMismatch,

    #[error("campaign is not completed")]
    InvalidState,

    #[error("points already collected")]
    AlreadyCollected,

    #[error(transparent)]
    Barcode(#[from] BarcodeError),

    #[error(transparent)]
    Storage(#[from] RepoError),
}

/// Draw verification codes until one is unclaimed.
///
/// The storage insert still enforces uniqueness; this pre-check only keeps
/// the expected number of insert retries near zero.
pub(crate) async fn mint_unique_code(
    progress: &dyn ProgressRepo,
    random: &dyn RandomPort,
) -> Result<VerificationCode, RepoError> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = VerificationCode::generate_with(|| random.gen_index(CODE_ALPHABET.len()));
        if progress.get_by_verification_code(&code).await?.is_none() {
            return Ok(code);
        }
        tracing::debug!(%code, "verification code collision, redrawing");
    }
    Err(RepoError::storage(
        "mint_unique_code",
        "could not find an unclaimed verification code",
    ))
}

/// Encode claims as a QR-transportable token.
pub fn encode_token(claims: &TokenClaims) -> Result<String, CollectionError> {
    let json = serde_json::to_vec(claims)
        .map_err(|e| CollectionError::InvalidToken(e.to_string()))?;
    Ok(hex::encode(json))
}

/// Decode a token back into its claims.
pub fn decode_token(token: &str) -> Result<TokenClaims, CollectionError> {
    let bytes =
        hex::decode(token.trim()).map_err(|e| CollectionError::InvalidToken(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| CollectionError::InvalidToken(e.to_string()))
}

/// Reward verification and collection.
pub struct CollectionUseCases {
    progress: Arc<dyn ProgressRepo>,
    identity: Arc<dyn IdentityRepo>,
    barcode: Arc<dyn BarcodePort>,
    clock: Arc<dyn ClockPort>,
    public_base_url: String,
}

impl CollectionUseCases {
    pub fn new(
        progress: Arc<dyn ProgressRepo>,
        identity: Arc<dyn IdentityRepo>,
        barcode: Arc<dyn BarcodePort>,
        clock: Arc<dyn ClockPort>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            progress,
            identity,
            barcode,
            clock,
            public_base_url: public_base_url.into(),
        }
    }

    /// Issue a scannable token for the user's own progress record.
    pub async fn issue_token(
        &self,
        user_id: UserId,
        progress_id: ProgressId,
    ) -> Result<IssuedToken, CollectionError> {
        let record = self.owned_record(user_id, progress_id).await?;

        let claims = TokenClaims {
            progress_id: record.id(),
            user_id: record.user_id(),
            campaign_id: record.campaign_id(),
            issued_at: self.clock.now(),
        };
        let token = encode_token(&claims)?;
        let url = format!(
            "{}/admin/qr-scanner?token={token}",
            self.public_base_url.trim_end_matches('/')
        );
        let qr_svg = self.barcode.render_svg(&url)?;

        Ok(IssuedToken {
            progress_id: record.id(),
            token,
            verification_code: record.verification_code().as_str().to_owned(),
            url,
            qr_svg,
        })
    }

    /// Resolve a scanned token or a hand-typed code to a verification view.
    /// Admin-only.
    pub async fn verify(
        &self,
        admin_id: UserId,
        input: &str,
    ) -> Result<VerificationView, CollectionError> {
        self.require_admin(admin_id).await?;

        let record = if let Ok(code) = VerificationCode::parse(input) {
            self.progress
                .get_by_verification_code(&code)
                .await?
                .ok_or(CollectionError::NotFound("CampaignProgress"))?
        } else {
            let claims = decode_token(input)?;
            let record = self
                .progress
                .get(claims.progress_id)
                .await?
                .ok_or(CollectionError::NotFound("CampaignProgress"))?;
            if record.user_id() != claims.user_id || record.campaign_id() != claims.campaign_id {
                tracing::warn!(
                    progress_id = %claims.progress_id,
                    "token claims disagree with stored record"
                );
                return Err(CollectionError::DataMismatch);
            }
            record
        };

        let user = self
            .identity
            .get_user(record.user_id())
            .await?
            .ok_or(CollectionError::NotFound("User"))?;

        Ok(VerificationView {
            progress_id: record.id(),
            user_id: user.id,
            username: user.username,
            campaign_id: record.campaign_id(),
            total_score: record.total_score(),
            is_completed: record.is_completed(),
            completed_at: record.completed_at(),
            points_collected: record.points_collected(),
            collected_at: record.collected_at(),
            verification_code: record.verification_code().as_str().to_owned(),
        })
    }

    /// Record the physical reward handoff. Admin-only, one-shot.
    pub async fn mark_points_collected(
        &self,
        admin_id: UserId,
        progress_id: ProgressId,
    ) -> Result<VerificationView, CollectionError> {
        self.require_admin(admin_id).await?;

        let mut last_conflict: Option<RepoError> = None;
        for _ in 0..MAX_UPDATE_RETRIES {
            let mut record = self
                .progress
                .get(progress_id)
                .await?
                .ok_or(CollectionError::NotFound("CampaignProgress"))?;
            let expected_revision = record.revision();
            record
                .mark_points_collected(admin_id, self.clock.now())
                .map_err(|e| match e {
                    CollectError::NotCompleted => CollectionError::InvalidState,
                    CollectError::AlreadyCollected => CollectionError::AlreadyCollected,
                })?;

            match self.progress.update(&record, expected_revision).await {
                Ok(()) => {
                    tracing::info!(%progress_id, %admin_id, "points collected");
                    let user = self
                        .identity
                        .get_user(record.user_id())
                        .await?
                        .ok_or(CollectionError::NotFound("User"))?;
                    return Ok(VerificationView {
                        progress_id: record.id(),
                        user_id: user.id,
                        username: user.username,
                        campaign_id: record.campaign_id(),
                        total_score: record.total_score(),
                        is_completed: record.is_completed(),
                        completed_at: record.completed_at(),
                        points_collected: record.points_collected(),
                        collected_at: record.collected_at(),
                        verification_code: record.verification_code().as_str().to_owned(),
                    });
                }
                Err(e) if e.is_conflict() => {
                    tracing::debug!(%progress_id, "collection raced, retrying");
                    last_conflict = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_conflict
            .map(CollectionError::Storage)
            .unwrap_or(CollectionError::NotFound("CampaignProgress")))
    }

    async fn owned_record(
        &self,
        user_id: UserId,
        progress_id: ProgressId,
    ) -> Result<CampaignProgress, CollectionError> {
        let record = self
            .progress
            .get(progress_id)
            .await?
            .ok_or(CollectionError::NotFound("CampaignProgress"))?;
        if record.user_id() != user_id {
            return Err(CollectionError::Unauthorized);
        }
        Ok(record)
    }

    async fn require_admin(&self, user_id: UserId) -> Result<(), CollectionError> {
        let user = self
            .identity
            .get_user(user_id)
            .await?
            .ok_or(CollectionError::Unauthorized)?;
        if !user.is_admin() {
            return Err(CollectionError::Unauthorized);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use waytrail_domain::{CampaignId, ProgressionGraph};

    use super::*;
    use crate::infrastructure::ports::{
        MockBarcodePort, MockIdentityRepo, MockProgressRepo, UserRecord, UserRole,
    };
    use crate::test_fixtures::{campaign_with, fixed_clock, fresh_progress, marker_ids, SeqRandom};

    fn admin_record(id: UserId) -> UserRecord {
        UserRecord {
            id,
            username: "counter-staff".into(),
            role: UserRole::Admin,
        }
    }

    fn player_record(id: UserId) -> UserRecord {
        UserRecord {
            id,
            username: "walker".into(),
            role: UserRole::Player,
        }
    }

    fn use_cases(
        progress: MockProgressRepo,
        identity: MockIdentityRepo,
        barcode: MockBarcodePort,
    ) -> CollectionUseCases {
        CollectionUseCases::new(
            Arc::new(progress),
            Arc::new(identity),
            Arc::new(barcode),
            fixed_clock(),
            "https://waytrail.example",
        )
    }

    fn completed_progress(user_id: UserId) -> CampaignProgress {
        let campaign = campaign_with(&[2]);
        let graph = ProgressionGraph::build(&campaign).expect("valid campaign");
        let mut record = fresh_progress(&campaign, user_id);
        for id in marker_ids(&campaign) {
            record
                .complete_marker(&graph, id, Utc::now())
                .expect("in-order completion succeeds");
        }
        record
    }

    #[test]
    fn test_token_roundtrip() {
        let claims = TokenClaims {
            progress_id: ProgressId::new(),
            user_id: UserId::new(),
            campaign_id: CampaignId::new(),
            issued_at: Utc::now(),
        };
        let token = encode_token(&claims).expect("claims encode");
        let decoded = decode_token(&token).expect("token decodes");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(matches!(
            decode_token("not-hex-at-all"),
            Err(CollectionError::InvalidToken(_))
        ));
        // Valid hex, but not claims JSON.
        assert!(matches!(
            decode_token(&hex::encode(b"[1,2,3]")),
            Err(CollectionError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn test_mint_redraws_on_collision() {
        let user_id = UserId::new();
        let taken = fresh_progress(&campaign_with(&[1]), user_id);

        let mut progress = MockProgressRepo::new();
        let mut calls = 0u32;
        progress
            .expect_get_by_verification_code()
            .times(2)
            .returning(move |_| {
                calls += 1;
                if calls == 1 {
                    Ok(Some(taken.clone()))
                } else {
                    Ok(None)
                }
            });

        let random = SeqRandom::default();
        let code = mint_unique_code(&progress, &random)
            .await
            .expect("second draw is free");
        assert_eq!(code.as_str().len(), 6);
    }

    #[tokio::test]
    async fn test_issue_token_encodes_scanner_url() {
        let user_id = UserId::new();
        let record = fresh_progress(&campaign_with(&[1]), user_id);
        let record_id = record.id();
        let code = record.verification_code().as_str().to_owned();

        let mut progress = MockProgressRepo::new();
        progress
            .expect_get()
            .returning(move |_| Ok(Some(record.clone())));

        let mut barcode = MockBarcodePort::new();
        barcode
            .expect_render_svg()
            .withf(|payload| payload.starts_with("https://waytrail.example/admin/qr-scanner?token="))
            .returning(|_| Ok("<svg/>".into()));

        let uc = use_cases(progress, MockIdentityRepo::new(), barcode);
        let issued = uc
            .issue_token(user_id, record_id)
            .await
            .expect("token issued");

        assert_eq!(issued.verification_code, code);
        assert!(issued.url.ends_with(&issued.token));
        assert_eq!(issued.qr_svg, "<svg/>");
        let claims = decode_token(&issued.token).expect("token decodes");
        assert_eq!(claims.progress_id, record_id);
        assert_eq!(claims.user_id, user_id);
    }

    #[tokio::test]
    async fn test_issue_token_for_foreign_record_is_unauthorized() {
        let record = fresh_progress(&campaign_with(&[1]), UserId::new());
        let record_id = record.id();

        let mut progress = MockProgressRepo::new();
        progress
            .expect_get()
            .returning(move |_| Ok(Some(record.clone())));

        let uc = use_cases(progress, MockIdentityRepo::new(), MockBarcodePort::new());
        let err = uc
            .issue_token(UserId::new(), record_id)
            .await
            .expect_err("not the owner");
        assert!(matches!(err, CollectionError::Unauthorized));
    }

    #[tokio::test]
    async fn test_verify_by_code_shows_record() {
        let admin_id = UserId::new();
        let player_id = UserId::new();
        let record = completed_progress(player_id);
        let code = record.verification_code().as_str().to_owned();
        let score = record.total_score();

        let mut progress = MockProgressRepo::new();
        progress
            .expect_get_by_verification_code()
            .withf({
                let code = code.clone();
                move |c| c.as_str() == code
            })
            .returning(move |_| Ok(Some(record.clone())));

        let mut identity = MockIdentityRepo::new();
        identity.expect_get_user().returning(move |id| {
            Ok(Some(if id == admin_id {
                admin_record(admin_id)
            } else {
                player_record(player_id)
            }))
        });

        let uc = use_cases(progress, identity, MockBarcodePort::new());
        // Lowercase with padding still resolves; codes are normalized.
        let view = uc
            .verify(admin_id, &format!(" {} ", code.to_lowercase()))
            .await
            .expect("verification succeeds");

        assert_eq!(view.user_id, player_id);
        assert_eq!(view.username, "walker");
        assert_eq!(view.total_score, score);
        assert!(view.is_completed);
        assert!(!view.points_collected);
    }

    #[tokio::test]
    async fn test_verify_requires_admin() {
        let caller = UserId::new();
        let mut identity = MockIdentityRepo::new();
        identity
            .expect_get_user()
            .returning(move |id| Ok(Some(player_record(id))));

        let uc = use_cases(MockProgressRepo::new(), identity, MockBarcodePort::new());
        let err = uc
            .verify(caller, "AB2CD3")
            .await
            .expect_err("players cannot verify");
        assert!(matches!(err, CollectionError::Unauthorized));
    }

    #[tokio::test]
    async fn test_verify_rejects_mismatched_token_claims() {
        let admin_id = UserId::new();
        let record = completed_progress(UserId::new());
        let record_id = record.id();

        let token = encode_token(&TokenClaims {
            progress_id: record_id,
            // Claims forged for a different user.
            user_id: UserId::new(),
            campaign_id: record.campaign_id(),
            issued_at: Utc::now(),
        })
        .expect("claims encode");

        let mut progress = MockProgressRepo::new();
        progress
            .expect_get()
            .returning(move |_| Ok(Some(record.clone())));

        let mut identity = MockIdentityRepo::new();
        identity
            .expect_get_user()
            .returning(move |id| Ok(Some(admin_record(id))));

        let uc = use_cases(progress, identity, MockBarcodePort::new());
        let err = uc
            .verify(admin_id, &token)
            .await
            .expect_err("forged claims fail closed");
        assert!(matches!(err, CollectionError::DataMismatch));
    }

    #[tokio::test]
    async fn test_collect_persists_one_shot_transition() {
        let admin_id = UserId::new();
        let player_id = UserId::new();
        let record = completed_progress(player_id);
        let record_id = record.id();
        let expected = record.revision();

        let mut progress = MockProgressRepo::new();
        progress
            .expect_get()
            .returning(move |_| Ok(Some(record.clone())));
        progress
            .expect_update()
            .once()
            .withf(move |p, rev| {
                *rev == expected && p.points_collected() && p.collected_by() == Some(admin_id)
            })
            .returning(|_, _| Ok(()));

        let mut identity = MockIdentityRepo::new();
        identity.expect_get_user().returning(move |id| {
            Ok(Some(if id == admin_id {
                admin_record(admin_id)
            } else {
                player_record(player_id)
            }))
        });

        let uc = use_cases(progress, identity, MockBarcodePort::new());
        let view = uc
            .mark_points_collected(admin_id, record_id)
            .await
            .expect("collection succeeds");
        assert!(view.points_collected);
        assert!(view.collected_at.is_some());
    }

    #[tokio::test]
    async fn test_collect_twice_is_refused() {
        let admin_id = UserId::new();
        let mut record = completed_progress(UserId::new());
        record
            .mark_points_collected(UserId::new(), Utc::now())
            .expect("fixture collection");
        let record_id = record.id();

        let mut progress = MockProgressRepo::new();
        progress
            .expect_get()
            .returning(move |_| Ok(Some(record.clone())));
        progress.expect_update().never();

        let mut identity = MockIdentityRepo::new();
        identity
            .expect_get_user()
            .returning(move |id| Ok(Some(admin_record(id))));

        let uc = use_cases(progress, identity, MockBarcodePort::new());
        let err = uc
            .mark_points_collected(admin_id, record_id)
            .await
            .expect_err("one-shot flag holds");
        assert!(matches!(err, CollectionError::AlreadyCollected));
    }

    #[tokio::test]
    async fn test_collect_before_completion_is_refused() {
        let admin_id = UserId::new();
        let record = fresh_progress(&campaign_with(&[1]), UserId::new());
        let record_id = record.id();

        let mut progress = MockProgressRepo::new();
        progress
            .expect_get()
            .returning(move |_| Ok(Some(record.clone())));
        progress.expect_update().never();

        let mut identity = MockIdentityRepo::new();
        identity
            .expect_get_user()
            .returning(move |id| Ok(Some(admin_record(id))));

        let uc = use_cases(progress, identity, MockBarcodePort::new());
        let err = uc
            .mark_points_collected(admin_id, record_id)
            .await
            .expect_err("cannot collect an unfinished campaign");
        assert!(matches!(err, CollectionError::InvalidState));
    }
}
