//! HTTP routes.
//!
//! The caller's identity arrives in the `X-User-Id` header; authentication
//! itself is terminated upstream. Every authorization decision is re-made in
//! the use cases, so a forged header can at most act as that user.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use waytrail_domain::{
    CampaignId, CampaignProgress, GeoPoint, ProgressId, QuestionAttempt, QuestionId, RouteMarkerId,
    UserId,
};

use crate::app::App;
use crate::use_cases::collection::{CollectionError, IssuedToken, VerificationView};
use crate::use_cases::progression::{
    AttemptResult, CompletionResult, ProgressionError, UnlockView,
};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/campaigns/{id}/start", post(start_campaign))
        .route("/api/campaigns/{id}/unlocks", get(unlock_snapshot))
        .route("/api/campaigns/{id}/progress", get(list_campaign_progress))
        .route("/api/progress/{id}/attempts", get(list_attempts).post(record_attempt))
        .route("/api/progress/{id}/complete-marker", post(complete_marker))
        .route("/api/progress/{id}/qrcode", get(issue_qrcode))
        .route("/api/users/me/progress", get(list_my_progress))
        .route("/api/admin/verify", post(verify))
        .route("/api/admin/progress/{id}/collect", post(collect_points))
}

async fn health() -> &'static str {
    "OK"
}

fn caller(headers: &HeaderMap) -> Result<UserId, ApiError> {
    let raw = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("X-User-Id header is required".to_string()))?;
    let uuid = Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::BadRequest("X-User-Id is not a valid UUID".to_string()))?;
    Ok(UserId::from_uuid(uuid))
}

// =============================================================================
// Progression
// =============================================================================

async fn start_campaign(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<CampaignProgress>, ApiError> {
    let user_id = caller(&headers)?;
    let record = app
        .use_cases
        .progression
        .start_campaign(user_id, CampaignId::from_uuid(id))
        .await?;
    Ok(Json(record))
}

#[derive(Deserialize)]
struct LocationQuery {
    lat: f64,
    lng: f64,
}

async fn unlock_snapshot(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(location): Query<LocationQuery>,
) -> Result<Json<UnlockView>, ApiError> {
    let user_id = caller(&headers)?;
    let view = app
        .use_cases
        .progression
        .unlock_snapshot(
            user_id,
            CampaignId::from_uuid(id),
            GeoPoint::new(location.lat, location.lng),
        )
        .await?;
    Ok(Json(view))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttemptRequest {
    question_id: Uuid,
    answer: String,
}

async fn record_attempt(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<AttemptRequest>,
) -> Result<Json<AttemptResult>, ApiError> {
    let user_id = caller(&headers)?;
    let result = app
        .use_cases
        .progression
        .record_attempt(
            user_id,
            ProgressId::from_uuid(id),
            QuestionId::from_uuid(req.question_id),
            &req.answer,
        )
        .await?;
    Ok(Json(result))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteMarkerRequest {
    marker_id: Uuid,
}

async fn complete_marker(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteMarkerRequest>,
) -> Result<Json<CompletionResult>, ApiError> {
    let user_id = caller(&headers)?;
    let result = app
        .use_cases
        .progression
        .complete_marker(
            user_id,
            ProgressId::from_uuid(id),
            RouteMarkerId::from_uuid(req.marker_id),
        )
        .await?;
    Ok(Json(result))
}

async fn list_attempts(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<QuestionAttempt>>, ApiError> {
    let user_id = caller(&headers)?;
    let attempts = app
        .use_cases
        .progression
        .attempts_for_progress(user_id, ProgressId::from_uuid(id))
        .await?;
    Ok(Json(attempts))
}

async fn list_my_progress(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
) -> Result<Json<Vec<CampaignProgress>>, ApiError> {
    let user_id = caller(&headers)?;
    let records = app.use_cases.progression.list_for_user(user_id).await?;
    Ok(Json(records))
}

async fn list_campaign_progress(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CampaignProgress>>, ApiError> {
    let user_id = caller(&headers)?;
    let records = app
        .use_cases
        .progression
        .list_for_campaign(user_id, CampaignId::from_uuid(id))
        .await?;
    Ok(Json(records))
}

// =============================================================================
// Collection
// =============================================================================

async fn issue_qrcode(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<IssuedToken>, ApiError> {
    let user_id = caller(&headers)?;
    let issued = app
        .use_cases
        .collection
        .issue_token(user_id, ProgressId::from_uuid(id))
        .await?;
    Ok(Json(issued))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest {
    /// A scanned token or a hand-typed verification code.
    input: String,
}

async fn verify(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerificationView>, ApiError> {
    let admin_id = caller(&headers)?;
    let view = app.use_cases.collection.verify(admin_id, &req.input).await?;
    Ok(Json(view))
}

async fn collect_points(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<VerificationView>, ApiError> {
    let admin_id = caller(&headers)?;
    let view = app
        .use_cases
        .collection
        .mark_points_collected(admin_id, ProgressId::from_uuid(id))
        .await?;
    Ok(Json(view))
}

// =============================================================================
// Error mapping
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    Unauthorized,
    Conflict(String),
    Internal(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::NotFound => {
                (axum::http::StatusCode::NOT_FOUND, "Not found").into_response()
            }
            ApiError::BadRequest(msg) => {
                (axum::http::StatusCode::BAD_REQUEST, msg).into_response()
            }
            ApiError::Unauthorized => {
                (axum::http::StatusCode::FORBIDDEN, "Forbidden").into_response()
            }
            ApiError::Conflict(msg) => {
                (axum::http::StatusCode::CONFLICT, msg).into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error",
                )
                    .into_response()
            }
        }
    }
}

impl From<ProgressionError> for ApiError {
    fn from(e: ProgressionError) -> Self {
        match e {
            ProgressionError::NotFound(_) => ApiError::NotFound,
            ProgressionError::Unauthorized => ApiError::Unauthorized,
            ProgressionError::InvalidTransition(msg) => ApiError::Conflict(msg),
            ProgressionError::InvalidCampaign(msg) => ApiError::Internal(msg),
            ProgressionError::Storage(e) if e.is_conflict() => ApiError::Conflict(e.to_string()),
            ProgressionError::Storage(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<CollectionError> for ApiError {
    fn from(e: CollectionError) -> Self {
        match e {
            CollectionError::NotFound(_) => ApiError::NotFound,
            CollectionError::Unauthorized => ApiError::Unauthorized,
            CollectionError::InvalidToken(msg) => ApiError::BadRequest(msg),
            CollectionError::DataMismatch
            | CollectionError::InvalidState
            | CollectionError::AlreadyCollected => ApiError::Conflict(e.to_string()),
            CollectionError::Barcode(e) => ApiError::Internal(e.to_string()),
            CollectionError::Storage(e) if e.is_conflict() => ApiError::Conflict(e.to_string()),
            CollectionError::Storage(e) => ApiError::Internal(e.to_string()),
        }
    }
}
