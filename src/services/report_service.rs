use crate::error::Result;
use crate::models::session::AttendanceSession;
use crate::models::user::User;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentAttendance {
    pub name: String,
    pub email: String,
    pub attendance_count: i64,
    /// Unrounded; presentation rounds for display only.
    pub attendance_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectReport {
    pub total_sessions: i64,
    pub students: BTreeMap<Uuid, StudentAttendance>,
}

#[derive(Clone)]
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Per-subject attendance report across every session the instructor
    /// ever owned. Point-in-time snapshot: reads are not linearizable with
    /// concurrent marks, and that is fine for reporting.
    pub async fn report_for(&self, owner_id: Uuid) -> Result<BTreeMap<String, SubjectReport>> {
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

        let mut student_ids: Vec<Uuid> = sessions
            .iter()
            .flat_map(|s| s.marked_students.iter().copied())
            .collect();
        student_ids.sort_unstable();
        student_ids.dedup();

        let roster = if student_ids.is_empty() {
            Vec::new()
        } else {
            sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = ANY($1)"#)
                .bind(&student_ids)
                .fetch_all(&self.pool)
                .await?
        };

        Ok(build_report(&sessions, &roster))
    }
}

/// Pure aggregation core: group by subject, count memberships, divide.
/// Sessions with zero marks still raise the denominator; a student who never
/// attended a subject simply does not appear under it.
pub fn build_report(
    sessions: &[AttendanceSession],
    roster: &[User],
) -> BTreeMap<String, SubjectReport> {
    let mut report: BTreeMap<String, SubjectReport> = BTreeMap::new();

    for session in sessions {
        let entry = report
            .entry(session.subject.clone())
            .or_insert_with(|| SubjectReport {
                total_sessions: 0,
                students: BTreeMap::new(),
            });
        entry.total_sessions += 1;

        for student_id in &session.marked_students {
            let student = entry.students.entry(*student_id).or_insert_with(|| {
                let (name, email) = roster
                    .iter()
                    .find(|u| u.id == *student_id)
                    .map(|u| (u.name.clone(), u.email.clone()))
                    .unwrap_or_default();
                StudentAttendance {
                    name,
                    email,
                    attendance_count: 0,
                    attendance_percentage: 0.0,
                }
            });
            student.attendance_count += 1;
        }
    }

    for subject in report.values_mut() {
        let total = subject.total_sessions as f64;
        for student in subject.students.values_mut() {
            student.attendance_percentage = student.attendance_count as f64 / total * 100.0;
        }
    }

    report
}
