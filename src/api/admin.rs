//! Admin endpoints: login, listings, review and deletion.

use axum::Json;
use axum::extract::State;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::AppState;
use super::extract::{JsonBody, PathParam};
use crate::db::{ActivityRequest, RequestStatus};
use crate::error::{ApiError, ApiResult};
use crate::telemetry::OperationTimer;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Plain `{message}` response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// A request as returned by the listing endpoints.
#[derive(Debug, Serialize)]
pub struct RequestView {
    pub id: i64,
    pub full_name: String,
    pub group_name: String,
    pub supervisor: String,
    pub activity: String,
    pub file_name: String,
    pub file_type: String,
    pub file_content: String,
    pub status: RequestStatus,
    /// ISO-8601, UTC.
    pub created_at: String,
}

impl From<ActivityRequest> for RequestView {
    fn from(r: ActivityRequest) -> Self {
        Self {
            id: r.id,
            full_name: r.full_name,
            group_name: r.group_name,
            supervisor: r.supervisor,
            activity: r.activity,
            file_name: r.file_name,
            file_type: r.file_type,
            file_content: r.file_content,
            status: r.status,
            created_at: r.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

/// POST /api/admin/login
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let timer = OperationTimer::new("admin_login");
    let result = if state.admin.verify(&body.password) {
        info!("Admin login succeeded");
        Ok(Json(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
        }))
    } else {
        warn!("Admin login failed");
        crate::metrics::record_login_failure();
        Err(ApiError::Unauthorized("Invalid password".to_string()))
    };
    timer.observe(result)
}

/// GET /api/admin/requests/pending
#[instrument(skip(state))]
pub async fn list_pending(State(state): State<AppState>) -> ApiResult<Json<Vec<RequestView>>> {
    let timer = OperationTimer::new("list_pending");
    timer
        .observe(list_with_status(&state, RequestStatus::Pending).await)
        .map(Json)
}

/// GET /api/admin/requests/approved
#[instrument(skip(state))]
pub async fn list_approved(State(state): State<AppState>) -> ApiResult<Json<Vec<RequestView>>> {
    let timer = OperationTimer::new("list_approved");
    timer
        .observe(list_with_status(&state, RequestStatus::Approved).await)
        .map(Json)
}

async fn list_with_status(state: &AppState, status: RequestStatus) -> ApiResult<Vec<RequestView>> {
    let mut session = state.db.session().await?;
    let rows = session.requests().list_by_status(status).await?;
    Ok(rows.into_iter().map(RequestView::from).collect())
}

/// PUT /api/admin/requests/{id}
#[instrument(skip(state, body))]
pub async fn update_status(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<UpdateStatusRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let timer = OperationTimer::new("update_status");
    timer
        .observe(apply_status(&state, id, &body.status).await)
        .map(Json)
}

async fn apply_status(state: &AppState, id: i64, requested: &str) -> ApiResult<MessageResponse> {
    let mut session = state.db.write_session().await?;
    let current = session
        .requests()
        .find_by_id(id)
        .await?
        .ok_or_else(ApiError::request_not_found)?;

    let next = requested
        .parse::<RequestStatus>()
        .ok()
        .filter(|next| next.is_review_outcome())
        .ok_or_else(|| ApiError::BadRequest("Invalid status".to_string()))?;

    if !session.requests().update_status(id, next).await? {
        return Err(ApiError::request_not_found());
    }
    session.commit().await?;

    crate::metrics::record_review(next.as_str());
    info!(id, from = %current.status, to = %next, "Request reviewed");

    Ok(MessageResponse {
        message: format!("Request {next}"),
    })
}

/// DELETE /api/admin/requests/{id}
#[instrument(skip(state))]
pub async fn delete_request(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let timer = OperationTimer::new("delete_request");
    timer.observe(remove(&state, id).await).map(Json)
}

async fn remove(state: &AppState, id: i64) -> ApiResult<MessageResponse> {
    let mut session = state.db.write_session().await?;
    if !session.requests().delete(id).await? {
        return Err(ApiError::request_not_found());
    }
    session.commit().await?;

    info!(id, "Request deleted");
    Ok(MessageResponse {
        message: "Request deleted".to_string(),
    })
}
