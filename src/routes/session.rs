use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
    Extension,
};
use chrono::{Duration, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::dto::session_dto::{
    CreateSessionRequest, CreateSessionResponse, ListSessionsResponse, SessionSummary,
};
use crate::middleware::auth::Principal;
use crate::AppState;

#[axum::debug_handler]
pub async fn open_session(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateSessionRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let config = crate::config::get_config();
    let minutes = req.duration_minutes.unwrap_or(config.default_session_minutes);
    let window = Duration::minutes(minutes);

    let session = state
        .session_service
        .open_session(principal.id, &req.subject, &req.classroom, window)
        .await?;

    tracing::info!(
        session_id = %session.id,
        owner_id = %principal.id,
        subject = %session.subject,
        "attendance session opened"
    );

    Ok(Json(CreateSessionResponse {
        session_id: session.id,
        code: session.code,
        subject: session.subject,
        classroom: session.classroom,
        created_at: session.created_at,
        expires_at: session.expires_at,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn get_session_detail(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(session_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let detail = state
        .session_service
        .session_detail(session_id, principal.id, Utc::now())
        .await?;
    Ok(Json(detail).into_response())
}

#[axum::debug_handler]
pub async fn close_session(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(session_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let session = state
        .session_service
        .close_session(session_id, principal.id)
        .await?;
    Ok(Json(serde_json::json!({
        "session_id": session.id,
        "status": session.status,
    }))
    .into_response())
}

#[axum::debug_handler]
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> crate::error::Result<Response> {
    let sessions = state.session_service.list_sessions(principal.id).await?;
    let sessions = sessions
        .into_iter()
        .map(|s| SessionSummary {
            id: s.id,
            subject: s.subject,
            classroom: s.classroom,
            status: s.status,
            marked_count: s.marked_students.len(),
            created_at: s.created_at,
            expires_at: s.expires_at,
        })
        .collect();
    Ok(Json(ListSessionsResponse { sessions }).into_response())
}
