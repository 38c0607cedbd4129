//! REST API.
//!
//! Handlers are stateless: each takes [`AppState`] by value, opens its own
//! database session and releases it before returning.
//!
//! | Method | Path                             | Handler                    |
//! |--------|----------------------------------|----------------------------|
//! | GET    | `/`                              | [`root`]                   |
//! | POST   | `/api/requests`                  | [`requests::create_request`] |
//! | POST   | `/api/admin/login`               | [`admin::login`]           |
//! | GET    | `/api/admin/requests/pending`    | [`admin::list_pending`]    |
//! | GET    | `/api/admin/requests/approved`   | [`admin::list_approved`]   |
//! | PUT    | `/api/admin/requests/:id`        | [`admin::update_status`]   |
//! | DELETE | `/api/admin/requests/:id`        | [`admin::delete_request`]  |

pub mod admin;
pub mod auth;
pub mod extract;
pub mod requests;

pub use auth::AdminSecret;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{CorsConfig, UploadConfig};
use crate::db::Database;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub admin: AdminSecret,
}

impl AppState {
    pub fn new(db: Database, admin: AdminSecret) -> Self {
        Self { db, admin }
    }
}

/// GET /
pub async fn root() -> Json<admin::MessageResponse> {
    Json(admin::MessageResponse {
        message: "Activity Registry API is running".to_string(),
    })
}

/// Build the API router with CORS, tracing and the upload size cap applied.
pub fn router(state: AppState, cors: &CorsConfig, uploads: &UploadConfig) -> Router {
    Router::new()
        .route("/", get(root))
        .route(
            "/api/requests",
            post(requests::create_request).layer(DefaultBodyLimit::max(uploads.max_body_bytes)),
        )
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/requests/pending", get(admin::list_pending))
        .route("/api/admin/requests/approved", get(admin::list_approved))
        .route(
            "/api/admin/requests/:id",
            put(admin::update_status).delete(admin::delete_request),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors))
        .with_state(state)
}

/// CORS for the configured front-end origins.
///
/// Credentials are allowed, so methods and headers mirror the preflight
/// request instead of using a wildcard.
fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
