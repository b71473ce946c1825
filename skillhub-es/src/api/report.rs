//! Skill event reporting endpoint

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use skillhub_common::{db::settings, Error};
use tracing::error;

use crate::services::{RequestIdentity, SkillEventRequest, SkillEventResult, SubmitLimits};
use crate::AppState;

/// Error payload carrying enough context to log or display
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// POST /api/projects/:project_id/skills/:skill_id
///
/// Report one skill achievement event. The body is optional; an absent
/// body means "no event-specific data supplied" and the event is recorded
/// for the caller at recording time.
pub async fn report_skill(
    State(state): State<AppState>,
    Path((project_id, skill_id)): Path<(String, String)>,
    Extension(identity): Extension<RequestIdentity>,
    request: Option<Json<SkillEventRequest>>,
) -> Result<Json<SkillEventResult>, (StatusCode, Json<ErrorResponse>)> {
    // Runtime-configurable limit, read once per submission
    let max_length = settings::get_max_self_report_message_length(&state.db)
        .await
        .map_err(to_response)?;

    let limits = SubmitLimits {
        max_self_report_message_length: max_length,
    };
    let request = request.map(|Json(r)| r);

    let result = state
        .submitter
        .submit(&project_id, &skill_id, &identity, request.as_ref(), limits)
        .await
        .map_err(to_response)?;

    Ok(Json(result))
}

/// Map submission failures onto HTTP status codes
fn to_response(err: Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        Error::Validation { .. } => StatusCode::BAD_REQUEST,
        Error::Auth(_) => StatusCode::UNAUTHORIZED,
        Error::SkillNotFound { .. } => StatusCode::NOT_FOUND,
        _ => {
            error!("Skill event submission failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}
