use crate::error::{Error, Result};
use crate::models::session::{AttendanceSession, STATUS_ACTIVE, STATUS_EXPIRED};
use crate::models::user::User;
use crate::utils::code::generate_session_code;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Attempts at inserting a freshly generated code before the collision is
/// surfaced as a conflict instead of retried silently forever.
const MAX_CODE_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct SessionService {
    pool: PgPool,
    code_length: usize,
}

impl SessionService {
    pub fn new(pool: PgPool, code_length: usize) -> Self {
        Self { pool, code_length }
    }

    /// Opens a new attendance window. The expiry instant is fixed at
    /// creation; nothing ever moves it. A generated code that collides with
    /// any session ever created is rejected by the unique constraint and a
    /// fresh code is tried.
    pub async fn open_session(
        &self,
        owner_id: Uuid,
        subject: &str,
        classroom: &str,
        window: Duration,
    ) -> Result<AttendanceSession> {
        for attempt in 0..MAX_CODE_ATTEMPTS {
            let code = generate_session_code(self.code_length);
            let now = Utc::now();
            let expires_at = now + window;

            let inserted = sqlx::query_as::<_, AttendanceSession>(
                r#"
                INSERT INTO attendance_sessions
                    (id, owner_id, subject, classroom, code, status, marked_students, created_at, expires_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, '{}', $7, $8, $7)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(subject)
            .bind(classroom)
            .bind(&code)
            .bind(STATUS_ACTIVE)
            .bind(now)
            .bind(expires_at)
            .fetch_one(&self.pool)
            .await;

            match inserted {
                Ok(session) => return Ok(session),
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    tracing::warn!(attempt, "session code collision, regenerating");
                    continue;
                }
                Err(other) => return Err(other.into()),
            }
        }
        Err(Error::Conflict(
            "Could not allocate a unique session code".to_string(),
        ))
    }

    pub async fn get_session(&self, session_id: Uuid) -> Result<AttendanceSession> {
        let session = sqlx::query_as::<_, AttendanceSession>(
            r#"SELECT * FROM attendance_sessions WHERE id = $1"#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Session not found".to_string()))?;
        Ok(session)
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<AttendanceSession>> {
        let session = sqlx::query_as::<_, AttendanceSession>(
            r#"SELECT * FROM attendance_sessions WHERE code = $1"#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    /// Compare-and-set expiry. Idempotent: concurrent expirers cannot
    /// double-transition, and an already-expired session is left untouched.
    /// Returns the session as stored after the call.
    pub async fn expire(&self, session_id: Uuid) -> Result<AttendanceSession> {
        let updated = sqlx::query_as::<_, AttendanceSession>(
            r#"
            UPDATE attendance_sessions
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = $3
            RETURNING *
            "#,
        )
        .bind(session_id)
        .bind(STATUS_EXPIRED)
        .bind(STATUS_ACTIVE)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(session) => {
                tracing::info!(session_id = %session_id, "session expired");
                Ok(session)
            }
            // Lost the CAS or already expired; the stored row is authoritative.
            None => self.get_session(session_id).await,
        }
    }

    /// Owner-initiated early close. Anyone else gets a typed rejection.
    pub async fn close_session(
        &self,
        session_id: Uuid,
        owner_id: Uuid,
    ) -> Result<AttendanceSession> {
        let session = self.get_session(session_id).await?;
        if session.owner_id != owner_id {
            return Err(Error::Forbidden(
                "Only the session owner may close it".to_string(),
            ));
        }
        self.expire(session_id).await
    }

    /// Owner-only detail view. An elapsed window is expired lazily here so
    /// the caller always sees truthful status without waiting for the
    /// housekeeping sweep.
    pub async fn session_detail(
        &self,
        session_id: Uuid,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<SessionDetail> {
        let mut session = self.get_session(session_id).await?;
        if session.owner_id != owner_id {
            return Err(Error::Forbidden(
                "Only the session owner may view it".to_string(),
            ));
        }
        if session.status == STATUS_ACTIVE && !session.is_active(now) {
            session = self.expire(session_id).await?;
        }

        let students = self.resolve_students(&session.marked_students).await?;
        Ok(SessionDetail {
            id: session.id,
            subject: session.subject,
            classroom: session.classroom,
            status: session.status,
            created_at: session.created_at,
            expires_at: session.expires_at,
            students,
        })
    }

    /// All sessions owned by an instructor, newest first.
    pub async fn list_sessions(&self, owner_id: Uuid) -> Result<Vec<AttendanceSession>> {
        let sessions = sqlx::query_as::<_, AttendanceSession>(
            r#"
            SELECT * FROM attendance_sessions
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    /// Housekeeping bulk transition for elapsed windows. Correctness never
    /// depends on this running; every access point re-checks the window.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE attendance_sessions
            SET status = $1, updated_at = NOW()
            WHERE status = $2 AND expires_at <= $3
            "#,
        )
        .bind(STATUS_EXPIRED)
        .bind(STATUS_ACTIVE)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn resolve_students(&self, student_ids: &[Uuid]) -> Result<Vec<StudentSummary>> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }
        let users = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = ANY($1)"#)
            .bind(student_ids)
            .fetch_all(&self.pool)
            .await?;

        // Preserve roster data where it exists; a student removed from the
        // roster after marking still counts.
        let mut students = Vec::with_capacity(student_ids.len());
        for id in student_ids {
            match users.iter().find(|u| u.id == *id) {
                Some(user) => students.push(StudentSummary {
                    id: user.id,
                    name: user.name.clone(),
                    email: user.email.clone(),
                }),
                None => students.push(StudentSummary {
                    id: *id,
                    name: String::new(),
                    email: String::new(),
                }),
            }
        }
        Ok(students)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetail {
    pub id: Uuid,
    pub subject: String,
    pub classroom: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub students: Vec<StudentSummary>,
}
