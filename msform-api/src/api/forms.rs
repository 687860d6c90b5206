//! Form submission API handlers
//!
//! POST /api/forms, GET /api/forms, GET /api/forms/:id, POST /api/forms/validate

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use msform_common::db::Submission;
use serde::Serialize;
use uuid::Uuid;

use super::SubmissionPayload;
use crate::error::{ApiError, ApiResult};
use crate::intake;
use crate::validation::{self, FieldErrors};
use crate::AppState;

/// POST /api/forms response
#[derive(Debug, Serialize)]
pub struct CreateFormResponse {
    pub id: Uuid,
}

/// POST /api/forms/validate response
#[derive(Debug, Serialize)]
pub struct ValidateFormResponse {
    pub valid: bool,
    pub personal: FieldErrors,
    pub address: FieldErrors,
    pub documents: FieldErrors,
}

/// POST /api/forms
///
/// Returns 201 with the new id only.
pub async fn submit_form(
    State(state): State<AppState>,
    SubmissionPayload(raw): SubmissionPayload,
) -> ApiResult<(StatusCode, Json<CreateFormResponse>)> {
    let file_count = raw.files.len();

    let id = intake::submit(&state.service, raw).await.map_err(|e| {
        if matches!(e, ApiError::Validation(_)) {
            tracing::warn!(error = %e, files = file_count, "Submission rejected");
        }
        e
    })?;

    Ok((StatusCode::CREATED, Json(CreateFormResponse { id })))
}

/// GET /api/forms/:id
///
/// An id that is not a UUID cannot exist, so it is reported as 404 too.
pub async fn get_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Submission>> {
    let uuid = Uuid::parse_str(&id).map_err(|_| ApiError::NotFound(id.clone()))?;

    match state.service.get_by_id(uuid).await? {
        Some(submission) => Ok(Json(submission)),
        None => Err(ApiError::NotFound(id)),
    }
}

/// GET /api/forms
pub async fn list_forms(State(state): State<AppState>) -> ApiResult<Json<Vec<Submission>>> {
    Ok(Json(state.service.get_all().await?))
}

/// POST /api/forms/validate
///
/// Runs the wizard's per-step checks without persisting anything.
pub async fn validate_form(
    SubmissionPayload(raw): SubmissionPayload,
) -> Json<ValidateFormResponse> {
    let submission = intake::assemble(raw);

    let personal = validation::validate_personal(
        &submission.first_name,
        &submission.last_name,
        &submission.email,
        submission.phone.as_deref(),
    );
    let address = validation::validate_address(&submission.address);
    let documents = validation::validate_documents(&submission.files);

    Json(ValidateFormResponse {
        valid: personal.is_empty() && address.is_empty() && documents.is_empty(),
        personal,
        address,
        documents,
    })
}

/// Build form routes
pub fn form_routes() -> Router<AppState> {
    Router::new()
        .route("/api/forms", post(submit_form).get(list_forms))
        .route("/api/forms/validate", post(validate_form))
        .route("/api/forms/:id", get(get_form))
}
