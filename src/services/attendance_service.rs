use crate::error::{Error, Result};
use crate::models::session::{AttendanceSession, STATUS_ACTIVE};
use crate::services::session_service::SessionService;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Bounded retry budget for the conditional write. A lost race re-reads and
/// re-evaluates; only an exhausted budget surfaces as a conflict.
const MAX_MARK_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkConfirmation {
    pub subject: String,
    pub classroom: String,
}

/// Outcome of evaluating a fetched session against a mark attempt, before
/// any write. Pure, so the decision table is testable without a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkDecision {
    /// Session is active and the student is absent; attempt the
    /// conditional write.
    Attempt,
    /// Window elapsed or already closed; expire idempotently and reject.
    Expired,
    /// Student already a member; recoverable no-op, never a mutation.
    AlreadyMarked,
}

pub fn evaluate_mark(
    session: &AttendanceSession,
    student_id: Uuid,
    now: DateTime<Utc>,
) -> MarkDecision {
    if !session.is_active(now) {
        return MarkDecision::Expired;
    }
    if session.is_marked(student_id) {
        return MarkDecision::AlreadyMarked;
    }
    MarkDecision::Attempt
}

#[derive(Clone)]
pub struct AttendanceService {
    pool: PgPool,
    sessions: SessionService,
}

impl AttendanceService {
    pub fn new(pool: PgPool, sessions: SessionService) -> Self {
        Self { pool, sessions }
    }

    /// Records a student's presence against the session behind `code`,
    /// exactly once. Many students scan within the same few seconds, so the
    /// read-decide-write sequence is re-validated inside a single atomic
    /// conditional update; a matched-nothing result means the row changed
    /// under us and the whole evaluation starts over from a fresh read.
    pub async fn mark(
        &self,
        code: &str,
        student_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<MarkConfirmation> {
        for attempt in 0..MAX_MARK_ATTEMPTS {
            let session = self
                .sessions
                .find_by_code(code)
                .await?
                .ok_or_else(|| Error::NotFound("Invalid attendance code".to_string()))?;

            match evaluate_mark(&session, student_id, now) {
                MarkDecision::Expired => {
                    // A stale scan must never succeed even if nobody has
                    // persisted the transition yet.
                    self.sessions.expire(session.id).await?;
                    return Err(Error::Expired(
                        "This attendance code has expired".to_string(),
                    ));
                }
                MarkDecision::AlreadyMarked => {
                    tracing::info!(
                        session_id = %session.id,
                        student_id = %student_id,
                        "duplicate mark ignored"
                    );
                    return Err(Error::AlreadyMarked(
                        "Attendance already recorded for this session".to_string(),
                    ));
                }
                MarkDecision::Attempt => {}
            }

            let updated = sqlx::query_as::<_, AttendanceSession>(
                r#"
                UPDATE attendance_sessions
                SET marked_students = array_append(marked_students, $2), updated_at = NOW()
                WHERE id = $1
                  AND status = $3
                  AND expires_at > $4
                  AND NOT (marked_students @> ARRAY[$2]::uuid[])
                RETURNING *
                "#,
            )
            .bind(session.id)
            .bind(student_id)
            .bind(STATUS_ACTIVE)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

            if let Some(session) = updated {
                tracing::info!(
                    session_id = %session.id,
                    student_id = %student_id,
                    "attendance marked"
                );
                return Ok(MarkConfirmation {
                    subject: session.subject,
                    classroom: session.classroom,
                });
            }

            // The predicate matched nothing: a concurrent mark, expiry, or
            // close landed between our read and write. Re-fetch rather than
            // guessing which one it was.
            tracing::debug!(attempt, session_id = %session.id, "mark lost a race, re-evaluating");
        }

        Err(Error::Conflict(
            "Could not record attendance, please try again".to_string(),
        ))
    }
}
