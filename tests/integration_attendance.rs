mod common;

use axum::http::StatusCode;
use common::{
    TestApp, count_rows, create_class, create_student, create_test_user, create_time_slot,
    flash_messages, json_body, location,
};
use sams_core::Role;
use sams_models::{Class, Student, User};
use sqlx::PgPool;
use uuid::Uuid;

struct Fixture {
    app: TestApp,
    teacher: User,
    class: Class,
    students: Vec<Student>,
}

async fn setup(pool: &PgPool) -> Fixture {
    let app = TestApp::new(pool.clone()).await;
    let teacher = create_test_user(pool, Role::Teacher).await;
    let slot = create_time_slot(pool, 9).await;
    let class = create_class(pool, "MTH101", &slot, &teacher).await;

    let mut students = Vec::new();
    for name in ["Ada", "Grace", "Alan"] {
        let (_, student) = create_student(pool, name, None, &[&class]).await;
        students.push(student);
    }

    Fixture {
        app,
        teacher,
        class,
        students,
    }
}

fn marks(students: &[Student], statuses: &[&str]) -> String {
    students
        .iter()
        .zip(statuses)
        .map(|(s, status)| format!("status_{}={}", s.id, status))
        .collect::<Vec<_>>()
        .join("&")
}

#[sqlx::test(migrations = "./migrations")]
async fn test_take_attendance_saves_every_mark(pool: PgPool) {
    let f = setup(&pool).await;
    let cookie = f.app.session_cookie(&f.teacher);
    let uri = format!("/take-attendance/{}/2024-03-15", f.class.id);

    let response = f
        .app
        .post_form(&uri, Some(&cookie), &marks(&f.students, &["1", "0", "1"]))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/teacher/dashboard");
    assert_eq!(
        flash_messages(&response),
        vec![(
            "success".to_string(),
            "Attendance for MTH101 on 2024-03-15 saved successfully".to_string()
        )]
    );
    assert_eq!(count_rows(&pool, "attendance").await, 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_second_submission_is_refused_without_new_rows(pool: PgPool) {
    let f = setup(&pool).await;
    let cookie = f.app.session_cookie(&f.teacher);
    let uri = format!("/take-attendance/{}/2024-03-15", f.class.id);
    let body = marks(&f.students, &["1", "1", "1"]);

    f.app.post_form(&uri, Some(&cookie), &body).await;
    let response = f.app.post_form(&uri, Some(&cookie), &body).await;

    assert_eq!(location(&response), "/teacher/dashboard");
    assert_eq!(
        flash_messages(&response),
        vec![(
            "warning".to_string(),
            "Attendance for MTH101 on 2024-03-15 has already been taken.".to_string()
        )]
    );
    assert_eq!(count_rows(&pool, "attendance").await, 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_locked_session_page_redirects(pool: PgPool) {
    let f = setup(&pool).await;
    let cookie = f.app.session_cookie(&f.teacher);
    let uri = format!("/take-attendance/{}/2024-03-15", f.class.id);

    let open = f.app.get(&uri, Some(&cookie)).await;
    assert_eq!(open.status(), StatusCode::OK);
    let body = json_body(open).await;
    assert_eq!(body["template"], "take_attendance.html");
    assert_eq!(body["context"]["students"].as_array().unwrap().len(), 3);

    f.app
        .post_form(&uri, Some(&cookie), &marks(&f.students, &["1", "1", "1"]))
        .await;

    let locked = f.app.get(&uri, Some(&cookie)).await;
    assert_eq!(locked.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&locked), "/teacher/dashboard");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_slot_session_uses_slot_in_label(pool: PgPool) {
    let f = setup(&pool).await;
    let cookie = f.app.session_cookie(&f.teacher);
    let uri = format!(
        "/take-attendance/{}/2024-03-15/{}",
        f.class.id, f.class.time_slot_id
    );

    let response = f
        .app
        .post_form(&uri, Some(&cookie), &marks(&f.students, &["1", "0", "0"]))
        .await;

    assert_eq!(
        flash_messages(&response)[0].1,
        "Attendance for MTH101 on 2024-03-15 (09:00-10:00) saved successfully"
    );
    assert_eq!(count_rows(&pool, "attendance").await, 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_second_slot_submission_is_refused_without_new_rows(pool: PgPool) {
    let f = setup(&pool).await;
    let cookie = f.app.session_cookie(&f.teacher);
    let uri = format!(
        "/take-attendance/{}/2024-03-15/{}",
        f.class.id, f.class.time_slot_id
    );

    f.app
        .post_form(&uri, Some(&cookie), &marks(&f.students, &["1", "1", "1"]))
        .await;
    let response = f
        .app
        .post_form(&uri, Some(&cookie), &marks(&f.students, &["0", "0", "0"]))
        .await;

    assert_eq!(location(&response), "/teacher/dashboard");
    assert_eq!(
        flash_messages(&response),
        vec![(
            "warning".to_string(),
            "Attendance for MTH101 on 2024-03-15 (09:00-10:00) has already been taken."
                .to_string()
        )]
    );
    assert_eq!(count_rows(&pool, "attendance").await, 3);
    let present: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendance WHERE status = 1")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(present, 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_date_session_locks_the_class_slot(pool: PgPool) {
    let f = setup(&pool).await;
    let cookie = f.app.session_cookie(&f.teacher);
    let slot_uri = format!(
        "/take-attendance/{}/2024-03-15/{}",
        f.class.id, f.class.time_slot_id
    );

    f.app
        .post_form(
            &format!("/take-attendance/{}/2024-03-15", f.class.id),
            Some(&cookie),
            &marks(&f.students, &["1", "0", "1"]),
        )
        .await;

    let page = f.app.get(&slot_uri, Some(&cookie)).await;
    assert_eq!(page.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&page), "/teacher/dashboard");

    let response = f
        .app
        .post_form(&slot_uri, Some(&cookie), &marks(&f.students, &["1", "1", "1"]))
        .await;
    assert_eq!(flash_messages(&response)[0].0, "warning");
    assert_eq!(count_rows(&pool, "attendance").await, 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_other_teacher_cannot_take_attendance(pool: PgPool) {
    let f = setup(&pool).await;
    let intruder = create_test_user(&pool, Role::Teacher).await;
    let cookie = f.app.session_cookie(&intruder);
    let uri = format!("/take-attendance/{}/2024-03-15", f.class.id);

    let response = f
        .app
        .post_form(&uri, Some(&cookie), &marks(&f.students, &["1", "1", "1"]))
        .await;

    assert_eq!(location(&response), "/teacher/dashboard");
    assert_eq!(
        flash_messages(&response),
        vec![(
            "error".to_string(),
            "You are not authorized to take attendance for this class.".to_string()
        )]
    );
    assert_eq!(count_rows(&pool, "attendance").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bad_date_is_refused(pool: PgPool) {
    let f = setup(&pool).await;
    let cookie = f.app.session_cookie(&f.teacher);
    let uri = format!("/take-attendance/{}/15-03-2024", f.class.id);

    let response = f.app.get(&uri, Some(&cookie)).await;

    assert_eq!(location(&response), "/teacher/dashboard");
    assert_eq!(flash_messages(&response)[0].1, "Invalid date format.");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_status_saves_nothing(pool: PgPool) {
    let f = setup(&pool).await;
    let cookie = f.app.session_cookie(&f.teacher);
    let uri = format!("/take-attendance/{}/2024-03-15", f.class.id);

    let response = f
        .app
        .post_form(&uri, Some(&cookie), &marks(&f.students, &["1", "late", "1"]))
        .await;

    assert_eq!(location(&response), "/teacher/dashboard");
    assert_eq!(count_rows(&pool, "attendance").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_summary_reports_percentages(pool: PgPool) {
    let f = setup(&pool).await;
    let cookie = f.app.session_cookie(&f.teacher);

    for (date, first) in [("2024-03-13", "1"), ("2024-03-14", "1"), ("2024-03-15", "0")] {
        let uri = format!("/take-attendance/{}/{}", f.class.id, date);
        f.app
            .post_form(&uri, Some(&cookie), &marks(&f.students[..1], &[first]))
            .await;
    }

    let response = f
        .app
        .get(&format!("/attendance-summary/{}", f.class.id), Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["template"], "attendance_summary.html");

    let rows = body["context"]["summary"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    let ada = rows
        .iter()
        .find(|r| r["student"]["id"] == f.students[0].id.to_string())
        .unwrap();
    assert_eq!(ada["present"], 2);
    assert_eq!(ada["absent"], 1);
    assert_eq!(ada["total"], 3);
    assert_eq!(ada["percentage"], 66.67);
    assert_eq!(ada["total_classes"], 3);
    assert_eq!(ada["below_threshold"], true);

    let grace = rows
        .iter()
        .find(|r| r["student"]["id"] == f.students[1].id.to_string())
        .unwrap();
    assert_eq!(grace["total"], 0);
    assert_eq!(grace["percentage"], 0.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_edit_attendance_flips_status(pool: PgPool) {
    let f = setup(&pool).await;
    let cookie = f.app.session_cookie(&f.teacher);
    let student = &f.students[0];
    f.app
        .post_form(
            &format!("/take-attendance/{}/2024-03-15", f.class.id),
            Some(&cookie),
            &marks(&f.students[..1], &["1"]),
        )
        .await;
    let record_id: Uuid = sqlx::query_scalar("SELECT id FROM attendance WHERE student_id = $1")
        .bind(student.id)
        .fetch_one(&pool)
        .await
        .unwrap();

    let uri = format!("/edit-attendance/{}/{}", student.id, f.class.id);
    let response = f
        .app
        .post_form(&uri, Some(&cookie), &format!("record_id={}&status=0", record_id))
        .await;

    assert_eq!(location(&response), uri);
    assert_eq!(
        flash_messages(&response)[0].1,
        "Attendance updated successfully for Ada in MTH101!"
    );
    let status: i16 = sqlx::query_scalar("SELECT status FROM attendance WHERE id = $1")
        .bind(record_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_edit_rejects_record_of_another_student(pool: PgPool) {
    let f = setup(&pool).await;
    let cookie = f.app.session_cookie(&f.teacher);
    f.app
        .post_form(
            &format!("/take-attendance/{}/2024-03-15", f.class.id),
            Some(&cookie),
            &marks(&f.students, &["1", "1", "1"]),
        )
        .await;
    let grace_record: Uuid =
        sqlx::query_scalar("SELECT id FROM attendance WHERE student_id = $1")
            .bind(f.students[1].id)
            .fetch_one(&pool)
            .await
            .unwrap();

    let uri = format!("/edit-attendance/{}/{}", f.students[0].id, f.class.id);
    let response = f
        .app
        .post_form(&uri, Some(&cookie), &format!("record_id={}&status=0", grace_record))
        .await;

    assert_eq!(flash_messages(&response)[0].1, "Attendance record not found");
    let absent: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendance WHERE status = 0")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(absent, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_dashboard_selection_redirects_to_sheet(pool: PgPool) {
    let f = setup(&pool).await;
    let cookie = f.app.session_cookie(&f.teacher);

    let response = f
        .app
        .post_form(
            "/teacher/dashboard",
            Some(&cookie),
            &format!("class_id={}&date=2024-03-15&action=take_attendance", f.class.id),
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        format!("/take-attendance/{}/2024-03-15", f.class.id)
    );

    let summary = f
        .app
        .post_form(
            "/teacher/dashboard",
            Some(&cookie),
            &format!("class_id={}&action=show_summary", f.class.id),
        )
        .await;
    assert_eq!(
        location(&summary),
        format!("/attendance-summary/{}", f.class.id)
    );
}
