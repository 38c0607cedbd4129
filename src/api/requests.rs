//! Public submission endpoint.

use axum::Json;
use axum::extract::multipart::{Field, Multipart};
use axum::extract::State;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::AppState;
use super::extract::Upload;
use crate::db::NewActivityRequest;
use crate::error::{ApiError, ApiResult};
use crate::telemetry::OperationTimer;

/// MIME types accepted for the attached document.
pub const ALLOWED_FILE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "application/pdf"];

/// Strip parameters and case from a content type, e.g.
/// `"Application/PDF; name=x"` becomes `"application/pdf"`.
pub fn normalize_content_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether a (normalized) content type may be stored.
pub fn is_allowed_file_type(content_type: &str) -> bool {
    ALLOWED_FILE_TYPES.contains(&content_type)
}

/// Response for a stored request.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
    pub message: String,
}

/// The uploaded document.
struct UploadedFile {
    name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// Form fields gathered from the multipart body.
#[derive(Default)]
struct Submission {
    full_name: Option<String>,
    group_name: Option<String>,
    supervisor: Option<String>,
    activity: Option<String>,
    file: Option<UploadedFile>,
}

impl Submission {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            match name.as_str() {
                "full_name" => submission.full_name = Some(text(field).await?),
                "group_name" => submission.group_name = Some(text(field).await?),
                "supervisor" => submission.supervisor = Some(text(field).await?),
                "activity" => submission.activity = Some(text(field).await?),
                "file" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field.content_type().map(normalize_content_type);
                    let bytes = field.bytes().await.map_err(bad_multipart)?;
                    submission.file = Some(UploadedFile {
                        name: file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                _ => {}
            }
        }

        Ok(submission)
    }

    /// Check required fields and the file type, producing the row to insert.
    fn into_new_request(self) -> ApiResult<NewActivityRequest> {
        let full_name = required(self.full_name, "full_name")?;
        let activity = required(self.activity, "activity")?;
        let file = self
            .file
            .ok_or_else(|| ApiError::BadRequest("file is required".to_string()))?;

        let file_type = match file.content_type {
            Some(ct) if is_allowed_file_type(&ct) => ct,
            _ => {
                return Err(ApiError::BadRequest(
                    "Only JPG, PNG and PDF files are allowed".to_string(),
                ));
            }
        };

        Ok(NewActivityRequest {
            full_name,
            group_name: self.group_name.unwrap_or_default(),
            supervisor: self.supervisor.unwrap_or_default(),
            activity,
            file_name: file.name,
            file_content: STANDARD.encode(&file.bytes),
            file_type,
        })
    }
}

fn required(value: Option<String>, field: &str) -> ApiResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!("{field} is required"))),
    }
}

async fn text(field: Field<'_>) -> ApiResult<String> {
    field.text().await.map_err(bad_multipart)
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Invalid multipart body: {e}"))
}

/// POST /api/requests
#[instrument(skip(state, multipart))]
pub async fn create_request(
    State(state): State<AppState>,
    Upload(multipart): Upload,
) -> ApiResult<Json<CreatedResponse>> {
    let timer = OperationTimer::new("create_request");
    timer.observe(create(&state, multipart).await).map(Json)
}

async fn create(state: &AppState, multipart: Multipart) -> ApiResult<CreatedResponse> {
    let new_request = Submission::read(multipart).await?.into_new_request()?;

    let id = store(state, &new_request)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to create request: {e}")))?;

    crate::metrics::record_submission();
    info!(id, file_type = %new_request.file_type, "Request submitted");

    Ok(CreatedResponse {
        id,
        message: "Request submitted successfully".to_string(),
    })
}

async fn store(state: &AppState, new_request: &NewActivityRequest) -> Result<i64, crate::db::DbError> {
    let mut session = state.db.write_session().await?;
    match session.requests().create(new_request).await {
        Ok(id) => {
            session.commit().await?;
            Ok(id)
        }
        Err(e) => {
            if let Err(rollback_err) = session.rollback().await {
                warn!(error = %rollback_err, "Rollback after failed insert also failed");
            }
            Err(e)
        }
    }
}
