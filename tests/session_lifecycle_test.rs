use attendance_backend::models::session::{AttendanceSession, STATUS_ACTIVE, STATUS_EXPIRED};
use attendance_backend::services::attendance_service::{evaluate_mark, MarkDecision};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

fn session_with_window(minutes: i64) -> AttendanceSession {
    let created_at = Utc::now();
    AttendanceSession {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        subject: "Math".to_string(),
        classroom: "B-204".to_string(),
        code: "AbCdEfGhIjKlMnOpQrStUvWx".to_string(),
        status: STATUS_ACTIVE.to_string(),
        marked_students: Vec::new(),
        created_at,
        expires_at: created_at + Duration::minutes(minutes),
        updated_at: created_at,
    }
}

fn at(session: &AttendanceSession, offset_secs: i64) -> DateTime<Utc> {
    session.created_at + Duration::seconds(offset_secs)
}

#[test]
fn active_strictly_before_expiry_instant() {
    let session = session_with_window(1);
    assert!(session.is_active(at(&session, 59)));
    assert!(!session.is_active(at(&session, 60)));
    assert!(!session.is_active(at(&session, 61)));
}

#[test]
fn expired_status_is_terminal_regardless_of_clock() {
    let mut session = session_with_window(60);
    session.status = STATUS_EXPIRED.to_string();
    // Even well inside the window, a closed session never reads as active.
    assert!(!session.is_active(at(&session, 5)));
}

#[test]
fn mark_decision_table() {
    let mut session = session_with_window(1);
    let student = Uuid::new_v4();
    let other = Uuid::new_v4();

    assert_eq!(
        evaluate_mark(&session, student, at(&session, 10)),
        MarkDecision::Attempt
    );

    session.marked_students.push(student);
    assert_eq!(
        evaluate_mark(&session, student, at(&session, 20)),
        MarkDecision::AlreadyMarked
    );

    // A different student after the window gets expiry, not a duplicate.
    assert_eq!(
        evaluate_mark(&session, other, at(&session, 70)),
        MarkDecision::Expired
    );
}

#[test]
fn expiry_beats_duplicate_when_both_apply() {
    let mut session = session_with_window(1);
    let student = Uuid::new_v4();
    session.marked_students.push(student);
    // Past the window a repeat scan is reported as expired; the duplicate
    // condition only makes sense for a live session.
    assert_eq!(
        evaluate_mark(&session, student, at(&session, 120)),
        MarkDecision::Expired
    );
}

#[test]
fn owner_close_maps_to_expired_model() {
    let mut session = session_with_window(60);
    session.status = STATUS_EXPIRED.to_string();
    let student = Uuid::new_v4();
    assert_eq!(
        evaluate_mark(&session, student, at(&session, 10)),
        MarkDecision::Expired
    );
}
