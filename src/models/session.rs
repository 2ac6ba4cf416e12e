use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_EXPIRED: &str = "expired";

/// One instructor-initiated attendance window. Rows are never deleted; the
/// full history is the system of record for reporting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceSession {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub subject: String,
    pub classroom: String,
    /// Scan token, unique across every session ever created. A stale scan
    /// must never resolve to a different session, so codes are not reused
    /// even after expiry.
    pub code: String,
    /// 'active' or 'expired'. The transition is monotonic and happens at
    /// most once, enforced by a compare-and-set on this column.
    pub status: String,
    /// Set semantics: a student id appears at most once. Only the
    /// conditional-update in the marking service may append to it.
    pub marked_students: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    /// Fixed at creation: created_at + the requested window. Expiry is a
    /// pure function of `now` against this instant; no timer is involved.
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceSession {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status == STATUS_ACTIVE && now < self.expires_at
    }

    pub fn is_marked(&self, student_id: Uuid) -> bool {
        self.marked_students.contains(&student_id)
    }
}
