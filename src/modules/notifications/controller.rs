use axum::{
    extract::{Path, State},
    response::Response,
};
use axum_extra::extract::CookieJar;
use sams_core::Role;
use sams_models::{ClassId, NotificationId, NotifyParentForm, StudentId};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::policy::{AccessPolicy, ClassAction};
use crate::middleware::role::{RequireParent, RequireTeacher};
use crate::modules::attendance::service::AttendanceService;
use crate::modules::notifications::service::{AlertOutcome, NotificationService};
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::utils::errors::{OrRedirect, PageError};
use crate::utils::flash::{self, FlashLevel};
use crate::utils::render::{Page, render_page};
use crate::validator::ValidatedForm;

const INBOX_PATH: &str = "/parent/notifications";

fn summary_path(class_id: ClassId) -> String {
    format!("/attendance-summary/{}", class_id)
}

fn outcome_flash(outcome: &AlertOutcome, student_name: &str, class_code: &str) -> (FlashLevel, String) {
    match outcome {
        AlertOutcome::Sent { to, .. } => (
            FlashLevel::Success,
            format!(
                "Email sent to {} for {} (Course: {}).",
                to, student_name, class_code
            ),
        ),
        AlertOutcome::NotNeeded { .. } | AlertOutcome::NoParentEmail => (
            FlashLevel::Warning,
            "Attendance is above 75% or parent email not found.".to_string(),
        ),
    }
}

async fn show_form(
    state: &AppState,
    jar: CookieJar,
    teacher: &AuthUser,
    student_id: StudentId,
    class_id: ClassId,
    action: &str,
) -> Result<Response, PageError> {
    let home = Role::Teacher.home_path();
    let class =
        AccessPolicy::class_for_teacher(&state.db, teacher, class_id, ClassAction::NotifyParents)
            .await
            .or_redirect(home)?;
    let student = StudentService::get_profile(&state.db, student_id)
        .await
        .or_redirect(&summary_path(class.id))?;
    let summary = AttendanceService::summary_for(&state.db, student.id, class.id).await?;
    let parent = StudentService::parent_contact(&state.db, student.id).await?;

    let page = Page::new(
        "notify_parent.html",
        json!({
            "student": student,
            "class_obj": class,
            "summary": summary,
            "parent": parent,
            "action": action,
        }),
    );

    Ok(render_page(state, jar, Some(teacher), page).await?)
}

#[utoipa::path(
    get,
    path = "/teacher/alert/{student_id}/{class_id}",
    params(
        ("student_id" = Uuid, Path, description = "Student ID"),
        ("class_id" = Uuid, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Alert form with the student's percentage in the class"),
        (status = 303, description = "Refused; redirected with a message")
    ),
    tag = "Notifications"
)]
#[instrument(skip(state, jar, teacher))]
pub async fn alert_parent_page(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireTeacher(teacher): RequireTeacher,
    Path((student_id, class_id)): Path<(StudentId, ClassId)>,
) -> Result<Response, PageError> {
    let action = format!("/teacher/alert/{}/{}", student_id, class_id);
    show_form(&state, jar, &teacher, student_id, class_id, &action).await
}

#[utoipa::path(
    post,
    path = "/teacher/alert/{student_id}/{class_id}",
    params(
        ("student_id" = Uuid, Path, description = "Student ID"),
        ("class_id" = Uuid, Path, description = "Class ID")
    ),
    request_body(content = NotifyParentForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Sent, not needed, or failed; redirected to the roster summary")
    ),
    tag = "Notifications"
)]
#[instrument(skip(state, jar, teacher, form))]
pub async fn alert_parent(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireTeacher(teacher): RequireTeacher,
    Path((student_id, class_id)): Path<(StudentId, ClassId)>,
    ValidatedForm(form): ValidatedForm<NotifyParentForm>,
) -> Result<Response, PageError> {
    send_alert(&state, jar, &teacher, student_id, class_id, form, false).await
}

#[utoipa::path(
    get,
    path = "/teacher/notify/{student_id}/{class_id}",
    params(
        ("student_id" = Uuid, Path, description = "Student ID"),
        ("class_id" = Uuid, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Notification form with the student's percentage in the class"),
        (status = 303, description = "Refused; redirected with a message")
    ),
    tag = "Notifications"
)]
#[instrument(skip(state, jar, teacher))]
pub async fn notify_parent_page(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireTeacher(teacher): RequireTeacher,
    Path((student_id, class_id)): Path<(StudentId, ClassId)>,
) -> Result<Response, PageError> {
    let action = format!("/teacher/notify/{}/{}", student_id, class_id);
    show_form(&state, jar, &teacher, student_id, class_id, &action).await
}

#[utoipa::path(
    post,
    path = "/teacher/notify/{student_id}/{class_id}",
    params(
        ("student_id" = Uuid, Path, description = "Student ID"),
        ("class_id" = Uuid, Path, description = "Class ID")
    ),
    request_body(content = NotifyParentForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Sent and recorded, not needed, or failed; redirected to the roster summary")
    ),
    tag = "Notifications"
)]
#[instrument(skip(state, jar, teacher, form))]
pub async fn notify_parent(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireTeacher(teacher): RequireTeacher,
    Path((student_id, class_id)): Path<(StudentId, ClassId)>,
    ValidatedForm(form): ValidatedForm<NotifyParentForm>,
) -> Result<Response, PageError> {
    send_alert(&state, jar, &teacher, student_id, class_id, form, true).await
}

async fn send_alert(
    state: &AppState,
    jar: CookieJar,
    teacher: &AuthUser,
    student_id: StudentId,
    class_id: ClassId,
    form: NotifyParentForm,
    record: bool,
) -> Result<Response, PageError> {
    let class =
        AccessPolicy::class_for_teacher(&state.db, teacher, class_id, ClassAction::NotifyParents)
            .await
            .or_redirect(Role::Teacher.home_path())?;
    let back = summary_path(class.id);
    let student = StudentService::get_profile(&state.db, student_id)
        .await
        .or_redirect(&back)?;

    let outcome = if record {
        NotificationService::notify_parent_and_record(
            &state.db,
            state.mailer.as_ref(),
            &student,
            &class,
            &form,
        )
        .await
    } else {
        NotificationService::notify_parent(&state.db, state.mailer.as_ref(), &student, &class, &form)
            .await
    }
    .or_redirect(&back)?;

    let (level, text) = outcome_flash(&outcome, &student.full_name, &class.code);
    Ok(flash::redirect(jar, level, text, &back))
}

#[utoipa::path(
    get,
    path = "/parent/notifications",
    responses(
        (status = 200, description = "The parent's notifications, newest first", body = [sams_models::NotificationView]),
        (status = 303, description = "Not a parent; redirected to login")
    ),
    tag = "Notifications"
)]
#[instrument(skip(state, jar, parent))]
pub async fn inbox(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireParent(parent): RequireParent,
) -> Result<Response, PageError> {
    let notifications = NotificationService::inbox(&state.db, parent.user_id()).await?;

    let page = Page::new(
        "parent_notifications.html",
        json!({ "notifications": notifications }),
    );

    Ok(render_page(&state, jar, Some(&parent), page).await?)
}

#[utoipa::path(
    post,
    path = "/parent/notifications/{notification_id}/read",
    params(
        ("notification_id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 303, description = "Marked read; redirected to the inbox")
    ),
    tag = "Notifications"
)]
#[instrument(skip(state, jar, parent))]
pub async fn mark_read(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireParent(parent): RequireParent,
    Path(notification_id): Path<NotificationId>,
) -> Result<Response, PageError> {
    NotificationService::mark_read(&state.db, notification_id, parent.user_id())
        .await
        .or_redirect(INBOX_PATH)?;

    Ok(flash::redirect(
        jar,
        FlashLevel::Info,
        "Notification marked as read.",
        INBOX_PATH,
    ))
}
