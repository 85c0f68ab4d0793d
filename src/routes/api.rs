use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::moderation::{SubmissionRequest, UploadedFile};
use crate::state::AppState;
use crate::storage::MAX_FILE_BYTES;

use super::json_error;

pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Response {
    let request = match read_submission_form(multipart).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match state.workflow.submit(request).await {
        Ok(outcome) => {
            let message = outcome.message();
            if let Some(task) = outcome.notification {
                task.detach();
            }
            Json(json!({ "success": true, "message": message })).into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn read_submission_form(mut multipart: Multipart) -> Result<SubmissionRequest, Response> {
    let mut request = SubmissionRequest::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "presentationFile" | "paperFile" | "logoFile" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let mut bytes = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                    if bytes.len() + chunk.len() > MAX_FILE_BYTES {
                        tracing::warn!(field = %name, "upload exceeds size limit");
                        return Err(json_error(
                            StatusCode::PAYLOAD_TOO_LARGE,
                            format!("{} exceeds the 10 MiB limit", name),
                        ));
                    }
                    bytes.extend_from_slice(&chunk);
                }

                // Browsers send an empty, unnamed part when no file was chosen.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }

                let slot = match name.as_str() {
                    "presentationFile" => &mut request.presentation,
                    "paperFile" => &mut request.paper,
                    _ => &mut request.logo,
                };
                if slot.is_some() {
                    return Err(json_error(
                        StatusCode::BAD_REQUEST,
                        format!("only one {} may be uploaded", name),
                    ));
                }
                *slot = Some(UploadedFile {
                    file_name,
                    bytes: bytes.into(),
                });
            }
            "fullName" | "email" | "projectTitle" | "projectDescription" | "videoLink" => {
                let value = field.text().await.map_err(multipart_error)?;
                let slot = match name.as_str() {
                    "fullName" => &mut request.full_name,
                    "email" => &mut request.email,
                    "projectTitle" => &mut request.project_title,
                    "projectDescription" => &mut request.project_description,
                    _ => &mut request.video_link,
                };
                *slot = Some(value);
            }
            _ => {
                tracing::debug!(field = %name, "ignoring unexpected form field");
            }
        }
    }

    Ok(request)
}

fn multipart_error(err: MultipartError) -> Response {
    tracing::warn!(error = %err, "failed to read multipart form");
    json_error(err.status(), err.body_text())
}

#[derive(Deserialize)]
pub struct ListQuery {
    status: Option<String>,
}

pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Response {
    let Some(status) = query.status else {
        return json_error(StatusCode::BAD_REQUEST, "status is required");
    };

    match state.workflow.list_by_status(&status).await {
        Ok(submissions) => Json(submissions).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn calendar(State(state): State<Arc<AppState>>) -> Response {
    match state.workflow.calendar().await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Deserialize)]
pub struct ApproveRequest {
    #[serde(rename = "studentId")]
    student_id: Option<Value>,
}

pub async fn approve_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ApproveRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            return json_error(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let student_id = match payload.student_id {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => return json_error(StatusCode::BAD_REQUEST, "studentId is required"),
    };

    match state.workflow.approve(&student_id).await {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(e) => e.into_response(),
    }
}
