use attendance_backend::models::session::{AttendanceSession, STATUS_EXPIRED};
use attendance_backend::models::user::User;
use attendance_backend::services::report_service::build_report;
use chrono::{Duration, Utc};
use uuid::Uuid;

fn session(owner: Uuid, subject: &str, marked: Vec<Uuid>) -> AttendanceSession {
    let created_at = Utc::now();
    AttendanceSession {
        id: Uuid::new_v4(),
        owner_id: owner,
        subject: subject.to_string(),
        classroom: "101".to_string(),
        code: Uuid::new_v4().simple().to_string(),
        status: STATUS_EXPIRED.to_string(),
        marked_students: marked,
        created_at,
        expires_at: created_at + Duration::minutes(10),
        updated_at: created_at,
    }
}

fn roster_user(id: Uuid, name: &str, email: &str) -> User {
    let now = Utc::now();
    User {
        id,
        external_id: format!("ext-{}", id),
        name: name.to_string(),
        email: email.to_string(),
        role: "student".to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn two_sessions_yield_expected_percentages() {
    let owner = Uuid::new_v4();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let sessions = vec![
        session(owner, "Math", vec![a, b]),
        session(owner, "Math", vec![a]),
    ];
    let roster = vec![
        roster_user(a, "Alice", "alice@example.com"),
        roster_user(b, "Bob", "bob@example.com"),
    ];

    let report = build_report(&sessions, &roster);
    let math = report.get("Math").expect("Math group");
    assert_eq!(math.total_sessions, 2);

    let alice = &math.students[&a];
    assert_eq!(alice.attendance_count, 2);
    assert_eq!(alice.attendance_percentage, 100.0);
    assert_eq!(alice.name, "Alice");

    let bob = &math.students[&b];
    assert_eq!(bob.attendance_count, 1);
    assert_eq!(bob.attendance_percentage, 50.0);
    assert_eq!(bob.email, "bob@example.com");
}

#[test]
fn zero_mark_sessions_still_raise_the_denominator() {
    let owner = Uuid::new_v4();
    let a = Uuid::new_v4();
    let sessions = vec![
        session(owner, "Physics", vec![a]),
        session(owner, "Physics", vec![]),
        session(owner, "Physics", vec![]),
    ];

    let report = build_report(&sessions, &[roster_user(a, "Alice", "a@example.com")]);
    let physics = report.get("Physics").expect("Physics group");
    assert_eq!(physics.total_sessions, 3);
    let alice = &physics.students[&a];
    assert_eq!(alice.attendance_count, 1);
    assert!((alice.attendance_percentage - 100.0 / 3.0).abs() < 1e-12);
}

#[test]
fn never_attending_means_no_key_not_a_zero_entry() {
    let owner = Uuid::new_v4();
    let a = Uuid::new_v4();
    let ghost = Uuid::new_v4();
    let sessions = vec![session(owner, "Math", vec![a])];
    let roster = vec![
        roster_user(a, "Alice", "a@example.com"),
        roster_user(ghost, "Ghost", "g@example.com"),
    ];

    let report = build_report(&sessions, &roster);
    let math = report.get("Math").unwrap();
    assert!(math.students.contains_key(&a));
    assert!(!math.students.contains_key(&ghost));
}

#[test]
fn subjects_group_independently() {
    let owner = Uuid::new_v4();
    let a = Uuid::new_v4();
    let sessions = vec![
        session(owner, "Math", vec![a]),
        session(owner, "Math", vec![]),
        session(owner, "History", vec![a]),
    ];

    let report = build_report(&sessions, &[roster_user(a, "Alice", "a@example.com")]);
    assert_eq!(report.get("Math").unwrap().total_sessions, 2);
    assert_eq!(report.get("History").unwrap().total_sessions, 1);
    assert_eq!(
        report.get("Math").unwrap().students[&a].attendance_percentage,
        50.0
    );
    assert_eq!(
        report.get("History").unwrap().students[&a].attendance_percentage,
        100.0
    );
}

#[test]
fn marks_survive_roster_removal() {
    let owner = Uuid::new_v4();
    let gone = Uuid::new_v4();
    let sessions = vec![session(owner, "Math", vec![gone])];

    // Student no longer in the roster: still counted, identity fields empty.
    let report = build_report(&sessions, &[]);
    let entry = &report.get("Math").unwrap().students[&gone];
    assert_eq!(entry.attendance_count, 1);
    assert_eq!(entry.name, "");
    assert_eq!(entry.email, "");
}

#[test]
fn empty_history_is_an_empty_report() {
    let report = build_report(&[], &[]);
    assert!(report.is_empty());
}
