pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    attendance_service::AttendanceService, report_service::ReportService,
    session_service::SessionService,
};
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub session_service: SessionService,
    pub attendance_service: AttendanceService,
    pub report_service: ReportService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let session_service = SessionService::new(pool.clone(), config.session_code_length);
        let attendance_service = AttendanceService::new(pool.clone(), session_service.clone());
        let report_service = ReportService::new(pool.clone());

        Self {
            pool,
            session_service,
            attendance_service,
            report_service,
        }
    }
}

/// Full application router. The HTTP layer maps 1:1 onto the engine's
/// operations; every semantic lives in the services.
pub fn build_router(state: AppState) -> Router {
    let config = crate::config::get_config();

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let instructor_api = Router::new()
        .route(
            "/api/sessions",
            get(routes::session::list_sessions).post(routes::session::open_session),
        )
        .route("/api/sessions/:id", get(routes::session::get_session_detail))
        .route("/api/sessions/:id/close", post(routes::session::close_session))
        .route("/api/reports", get(routes::report::get_report))
        .layer(axum::middleware::from_fn(middleware::auth::require_instructor))
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::new_rps_state(config.instructor_rps),
            middleware::rate_limit::rps_middleware,
        ));

    let student_api = Router::new()
        .route("/api/attendance/mark", post(routes::attendance::mark_attendance))
        .layer(axum::middleware::from_fn(middleware::auth::require_student))
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::new_rps_state(config.public_rps),
            middleware::rate_limit::rps_middleware,
        ));

    base_routes
        .merge(instructor_api)
        .merge(student_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
