use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, max = 120))]
    pub subject: String,
    #[validate(length(min = 1, max = 120))]
    pub classroom: String,
    /// Attendance window in minutes; falls back to the configured default.
    #[validate(range(min = 1, max = 480))]
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: uuid::Uuid,
    pub code: String,
    pub subject: String,
    pub classroom: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: uuid::Uuid,
    pub subject: String,
    pub classroom: String,
    pub status: String,
    pub marked_count: usize,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSessionsResponse {
    pub sessions: Vec<SessionSummary>,
}
