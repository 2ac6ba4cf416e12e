use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    Extension,
};
use chrono::Utc;
use validator::Validate;

use crate::dto::attendance_dto::{MarkAttendanceRequest, MarkAttendanceResponse};
use crate::middleware::auth::Principal;
use crate::AppState;

#[axum::debug_handler]
pub async fn mark_attendance(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<MarkAttendanceRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let confirmation = state
        .attendance_service
        .mark(&req.code, principal.id, Utc::now())
        .await?;
    Ok(Json(MarkAttendanceResponse {
        marked: true,
        subject: confirmation.subject,
        classroom: confirmation.classroom,
    })
    .into_response())
}
