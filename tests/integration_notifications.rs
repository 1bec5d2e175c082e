mod common;

use axum::http::StatusCode;
use common::{
    TestApp, count_rows, create_class, create_named_user, create_student, create_test_user,
    create_time_slot, flash_messages, json_body, location,
};
use sams::modules::notifications::service::NotificationService;
use sams::utils::email::RecordingMailer;
use sams_core::Role;
use sams_models::{Class, Student, User};
use sqlx::PgPool;

const ALERT_FORM: &str = "subject=Attendance+warning&message=Please+call+the+school";

struct Fixture {
    app: TestApp,
    teacher: User,
    parent: User,
    class: Class,
    student: Student,
}

async fn setup(app: TestApp, pool: &PgPool) -> Fixture {
    let teacher = create_test_user(pool, Role::Teacher).await;
    let parent = create_named_user(pool, Role::Parent, "Pat Parent").await;
    let slot = create_time_slot(pool, 10).await;
    let class = create_class(pool, "PHY201", &slot, &teacher).await;
    let (_, student) = create_student(pool, "Ada", Some(parent.id), &[&class]).await;

    Fixture {
        app,
        teacher,
        parent,
        class,
        student,
    }
}

/// Records one row per status on consecutive March days.
async fn record_attendance(f: &Fixture, statuses: &[&str]) {
    let cookie = f.app.session_cookie(&f.teacher);
    for (day, status) in statuses.iter().enumerate() {
        let uri = format!("/take-attendance/{}/2024-03-{:02}", f.class.id, day + 1);
        f.app
            .post_form(&uri, Some(&cookie), &format!("status_{}={}", f.student.id, status))
            .await;
    }
}

fn notify_uri(f: &Fixture) -> String {
    format!("/teacher/notify/{}/{}", f.student.id, f.class.id)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_notify_below_threshold_mails_and_records(pool: PgPool) {
    let f = setup(TestApp::new(pool.clone()).await, &pool).await;
    record_attendance(&f, &["1", "0", "0"]).await;
    let cookie = f.app.session_cookie(&f.teacher);

    let response = f.app.post_form(&notify_uri(&f), Some(&cookie), ALERT_FORM).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        format!("/attendance-summary/{}", f.class.id)
    );
    assert_eq!(
        flash_messages(&response),
        vec![(
            "success".to_string(),
            format!("Email sent to {} for Ada (Course: PHY201).", f.parent.email)
        )]
    );

    let sent = f.app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, f.parent.email.as_str());
    assert_eq!(sent[0].subject, "Attendance warning");
    assert_eq!(sent[0].body, "Please call the school");
    assert_eq!(count_rows(&pool, "notifications").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_notify_at_threshold_sends_nothing(pool: PgPool) {
    let f = setup(TestApp::new(pool.clone()).await, &pool).await;
    record_attendance(&f, &["1", "1", "1", "0"]).await;
    let cookie = f.app.session_cookie(&f.teacher);

    let response = f.app.post_form(&notify_uri(&f), Some(&cookie), ALERT_FORM).await;

    assert_eq!(
        flash_messages(&response),
        vec![(
            "warning".to_string(),
            "Attendance is above 75% or parent email not found.".to_string()
        )]
    );
    assert!(f.app.mailer.sent().is_empty());
    assert_eq!(count_rows(&pool, "notifications").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_alert_mails_without_recording(pool: PgPool) {
    let f = setup(TestApp::new(pool.clone()).await, &pool).await;
    record_attendance(&f, &["0", "0"]).await;
    let cookie = f.app.session_cookie(&f.teacher);
    let uri = format!("/teacher/alert/{}/{}", f.student.id, f.class.id);

    let response = f.app.post_form(&uri, Some(&cookie), ALERT_FORM).await;

    assert_eq!(flash_messages(&response)[0].0, "success");
    assert_eq!(f.app.mailer.sent().len(), 1);
    assert_eq!(count_rows(&pool, "notifications").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_mail_failure_records_nothing(pool: PgPool) {
    let app = TestApp::with_mailer(pool.clone(), RecordingMailer::failing("connection refused")).await;
    let f = setup(app, &pool).await;
    record_attendance(&f, &["0"]).await;
    let cookie = f.app.session_cookie(&f.teacher);

    let response = f.app.post_form(&notify_uri(&f), Some(&cookie), ALERT_FORM).await;

    assert_eq!(
        location(&response),
        format!("/attendance-summary/{}", f.class.id)
    );
    assert_eq!(
        flash_messages(&response),
        vec![(
            "error".to_string(),
            "Failed to send email: connection refused".to_string()
        )]
    );
    assert_eq!(count_rows(&pool, "notifications").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_other_teacher_cannot_notify(pool: PgPool) {
    let f = setup(TestApp::new(pool.clone()).await, &pool).await;
    record_attendance(&f, &["0"]).await;
    let intruder = create_test_user(&pool, Role::Teacher).await;
    let cookie = f.app.session_cookie(&intruder);

    let response = f.app.post_form(&notify_uri(&f), Some(&cookie), ALERT_FORM).await;

    assert_eq!(location(&response), "/teacher/dashboard");
    assert_eq!(
        flash_messages(&response)[0].1,
        "You are not authorized to notify parents for this class."
    );
    assert!(f.app.mailer.sent().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_parent_inbox_and_mark_read(pool: PgPool) {
    let f = setup(TestApp::new(pool.clone()).await, &pool).await;
    record_attendance(&f, &["0"]).await;
    let teacher_cookie = f.app.session_cookie(&f.teacher);
    f.app
        .post_form(&notify_uri(&f), Some(&teacher_cookie), ALERT_FORM)
        .await;
    let parent_cookie = f.app.session_cookie(&f.parent);

    let inbox = json_body(f.app.get("/parent/notifications", Some(&parent_cookie)).await).await;
    assert_eq!(inbox["template"], "parent_notifications.html");
    assert_eq!(inbox["context"]["navbar_unread_count"], 1);
    let notification = &inbox["context"]["notifications"][0];
    assert_eq!(notification["student_name"], "Ada");
    assert_eq!(notification["message"], "Please call the school");
    assert_eq!(notification["is_read"], false);

    let id = notification["id"].as_str().unwrap().to_string();
    let response = f
        .app
        .post_form(
            &format!("/parent/notifications/{}/read", id),
            Some(&parent_cookie),
            "",
        )
        .await;
    assert_eq!(location(&response), "/parent/notifications");
    assert_eq!(
        flash_messages(&response),
        vec![("info".to_string(), "Notification marked as read.".to_string())]
    );

    let inbox = json_body(f.app.get("/parent/notifications", Some(&parent_cookie)).await).await;
    assert_eq!(inbox["context"]["navbar_unread_count"], 0);
    assert_eq!(inbox["context"]["notifications"][0]["is_read"], true);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_parent_cannot_read_someone_elses_notification(pool: PgPool) {
    let f = setup(TestApp::new(pool.clone()).await, &pool).await;
    let notification = NotificationService::record(&pool, f.parent.id, f.student.id, "Hello")
        .await
        .unwrap();
    let stranger = create_test_user(&pool, Role::Parent).await;
    let cookie = f.app.session_cookie(&stranger);

    let response = f
        .app
        .post_form(
            &format!("/parent/notifications/{}/read", notification.id),
            Some(&cookie),
            "",
        )
        .await;

    assert_eq!(location(&response), "/parent/notifications");
    assert_eq!(flash_messages(&response)[0].1, "Notification not found");
    assert_eq!(
        NotificationService::unread_count(&pool, f.parent.id)
            .await
            .unwrap(),
        1
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bulk_check_alerts_only_low_attendance(pool: PgPool) {
    let f = setup(TestApp::new(pool.clone()).await, &pool).await;
    let (_, steady) = create_student(&pool, "Grace", Some(f.parent.id), &[&f.class]).await;
    let (_, orphan) = create_student(&pool, "Alan", None, &[&f.class]).await;
    create_student(&pool, "Edsger", Some(f.parent.id), &[&f.class]).await;

    let cookie = f.app.session_cookie(&f.teacher);
    for (day, marks) in [
        ("2024-03-01", ["0", "1", "0"]),
        ("2024-03-04", ["1", "1", "0"]),
        ("2024-03-05", ["0", "1", "0"]),
    ] {
        let body = format!(
            "status_{}={}&status_{}={}&status_{}={}",
            f.student.id, marks[0], steady.id, marks[1], orphan.id, marks[2]
        );
        f.app
            .post_form(
                &format!("/take-attendance/{}/{}", f.class.id, day),
                Some(&cookie),
                &body,
            )
            .await;
    }

    let mailer = RecordingMailer::new();
    let report = NotificationService::check_all(&pool, &mailer).await.unwrap();

    // Edsger has no rows and is skipped.
    assert_eq!(report.checked, 3);
    assert_eq!(report.alerted, 1);
    assert_eq!(report.failed, 0);

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, f.parent.email.as_str());
    assert_eq!(sent[0].subject, "Low Attendance Alert for Ada");
    assert!(sent[0].body.contains("33.33%"));
    assert_eq!(count_rows(&pool, "notifications").await, 0);
}
