use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    Extension,
};

use crate::middleware::auth::Principal;
use crate::AppState;

#[axum::debug_handler]
pub async fn get_report(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> crate::error::Result<Response> {
    let report = state.report_service.report_for(principal.id).await?;
    Ok(Json(report).into_response())
}
