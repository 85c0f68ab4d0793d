mod api;
mod pages;

pub use api::*;
pub use pages::*;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::{RepositoryError, WorkflowError};
use crate::state::AppState;
use crate::storage::MAX_FILE_BYTES;

const MAX_REQUEST_BYTES: usize = 3 * MAX_FILE_BYTES + 1024 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    let uploads = ServeDir::new(&state.config.upload_folder);
    let public = ServeDir::new(&state.config.public_folder);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/approve", get(approve_page))
        .route(
            "/api/submissions",
            get(list_submissions).post(submit_handler),
        )
        .route("/api/calendar", get(calendar))
        .route("/api/approve", post(approve_handler))
        .nest_service("/uploads", uploads)
        .fallback_service(public)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub(crate) fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "success": false, "error": message.into() })),
    )
        .into_response()
}

impl IntoResponse for WorkflowError {
    fn into_response(self) -> Response {
        match self {
            WorkflowError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, msg),
            WorkflowError::Repository(RepositoryError::InvalidQuery(msg)) => {
                json_error(StatusCode::BAD_REQUEST, msg)
            }
            WorkflowError::Storage(err) => {
                tracing::error!(error = %err, "storage failure");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store uploaded files.")
            }
            WorkflowError::Repository(err) => {
                tracing::error!(error = %err, "repository failure");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error.")
            }
        }
    }
}
