use anyhow::anyhow;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use chrono::Local;
use sams_core::Role;
use sams_core::serde::deserialize_optional_uuid;
use sams_models::{
    AttendanceSelectionForm, ClassAttendanceSummary, SelectionAction, StudentId, StudentProfile,
    TimeSlotId, attendance::parse_date,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::policy::{AccessPolicy, ClassAction};
use crate::middleware::role::{RequireAdmin, RequireParent, RequireStudent, RequireTeacher};
use crate::modules::attendance::aggregator;
use crate::modules::attendance::service::AttendanceService;
use crate::modules::classes::service::ClassService;
use crate::modules::notifications::service::NotificationService;
use crate::modules::students::service::StudentService;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::errors::{AppError, LOGIN_PATH, OrRedirect, PageError};
use crate::utils::render::{Page, render_page};
use crate::validator::ValidatedForm;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ParentDashboardQuery {
    /// Show only this child.
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub student_id: Option<Uuid>,
}

/// One child on the parent dashboard.
#[derive(Debug, Serialize)]
struct ChildOverview {
    student: StudentProfile,
    classes: Vec<ClassAttendanceSummary>,
}

/// Where the dashboard selection form leads.
pub(crate) fn selection_target(form: &AttendanceSelectionForm) -> Result<String, AppError> {
    if form.action == SelectionAction::ShowSummary {
        return Ok(format!("/attendance-summary/{}", form.class_id));
    }

    let date = if form.date.trim().is_empty() {
        Local::now().date_naive()
    } else {
        parse_date(&form.date).ok_or_else(|| AppError::validation(anyhow!("Invalid date format.")))?
    };

    Ok(match form.time_slot_id {
        Some(slot) => format!(
            "/take-attendance/{}/{}/{}",
            form.class_id,
            date,
            TimeSlotId::from_uuid(slot)
        ),
        None => format!("/take-attendance/{}/{}", form.class_id, date),
    })
}

#[utoipa::path(
    get,
    path = "/teacher/dashboard",
    responses(
        (status = 200, description = "The teacher's classes and the time slots"),
        (status = 303, description = "Not a teacher; redirected to login")
    ),
    tag = "Dashboards"
)]
#[instrument(skip(state, jar, teacher))]
pub async fn teacher_dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireTeacher(teacher): RequireTeacher,
) -> Result<Response, PageError> {
    let classes = ClassService::list_for_teacher(&state.db, teacher.user_id()).await?;
    let time_slots = ClassService::list_time_slots(&state.db).await?;

    let page = Page::new(
        "teacher_dashboard.html",
        json!({
            "classes": classes,
            "time_slots": time_slots,
            "today": Local::now().date_naive(),
        }),
    );

    Ok(render_page(&state, jar, Some(&teacher), page).await?)
}

#[utoipa::path(
    post,
    path = "/teacher/dashboard",
    request_body(content = AttendanceSelectionForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirected to the attendance sheet or the roster summary")
    ),
    tag = "Dashboards"
)]
#[instrument(skip(state, teacher, form))]
pub async fn select_class(
    State(state): State<AppState>,
    RequireTeacher(teacher): RequireTeacher,
    ValidatedForm(form): ValidatedForm<AttendanceSelectionForm>,
) -> Result<Response, PageError> {
    let home = Role::Teacher.home_path();
    let action = match form.action {
        SelectionAction::TakeAttendance => ClassAction::TakeAttendance,
        SelectionAction::ShowSummary => ClassAction::ViewAttendance,
    };
    AccessPolicy::class_for_teacher(&state.db, &teacher, form.class_id, action)
        .await
        .or_redirect(home)?;

    let target = selection_target(&form).or_redirect(home)?;
    Ok(Redirect::to(&target).into_response())
}

#[utoipa::path(
    get,
    path = "/student/dashboard",
    responses(
        (status = 200, description = "The student's attendance, one summary per class"),
        (status = 303, description = "Not a student; redirected to login")
    ),
    tag = "Dashboards"
)]
#[instrument(skip(state, jar, student))]
pub async fn student_dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireStudent(student): RequireStudent,
) -> Result<Response, PageError> {
    let profile = StudentService::get_by_user(&state.db, student.user_id())
        .await
        .or_redirect(LOGIN_PATH)?;
    let records = AttendanceService::records_for_student(&state.db, profile.id).await?;
    let class_summaries = aggregator::summarize_by_class(&records);

    let page = Page::new(
        "student_dashboard.html",
        json!({
            "student": profile,
            "attendance_summary": class_summaries,
            "records": records,
        }),
    );

    Ok(render_page(&state, jar, Some(&student), page).await?)
}

#[utoipa::path(
    get,
    path = "/parent/dashboard",
    params(ParentDashboardQuery),
    responses(
        (status = 200, description = "Each child's attendance per enrolled class, plus notifications"),
        (status = 303, description = "Not a parent; redirected to login")
    ),
    tag = "Dashboards"
)]
#[instrument(skip(state, jar, parent))]
pub async fn parent_dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireParent(parent): RequireParent,
    Query(query): Query<ParentDashboardQuery>,
) -> Result<Response, PageError> {
    let home = Role::Parent.home_path();
    let mut children = StudentService::children_of(&state.db, parent.user_id()).await?;

    if let Some(selected) = query.student_id.map(StudentId::from_uuid) {
        children.retain(|child| child.id == selected);
        if children.is_empty() {
            return Err(PageError::new(
                AppError::not_found(anyhow!("Student not found")),
                home,
            ));
        }
    }

    let mut overview = Vec::with_capacity(children.len());
    for child in children {
        let classes = AttendanceService::summaries_for_enrolled(&state.db, child.id).await?;
        overview.push(ChildOverview {
            student: child,
            classes,
        });
    }

    let notifications = NotificationService::inbox(&state.db, parent.user_id()).await?;
    let unread = notifications.iter().filter(|n| !n.is_read).count();

    let page = Page::new(
        "parent_dashboard.html",
        json!({
            "children": overview,
            "selected_student_id": query.student_id,
            "notifications": notifications,
            "unread_count": unread,
        }),
    );

    Ok(render_page(&state, jar, Some(&parent), page).await?)
}

async fn datewise(
    state: &AppState,
    jar: CookieJar,
    viewer: &AuthUser,
    student_id: StudentId,
) -> Result<Response, PageError> {
    let student = AccessPolicy::student_for_viewer(&state.db, viewer, student_id)
        .await
        .or_redirect(viewer.role().home_path())?;
    let records = AttendanceService::records_for_student(&state.db, student.id).await?;
    let summary = aggregator::summarize_records(&records);

    let page = Page::new(
        "datewise_attendance.html",
        json!({
            "student": student,
            "summary": summary,
            "records": records,
        }),
    );

    Ok(render_page(state, jar, Some(viewer), page).await?)
}

#[utoipa::path(
    get,
    path = "/student/datewise/{student_id}",
    params(("student_id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Every attendance row, newest first, with the overall tally"),
        (status = 303, description = "Not this student; redirected with a message")
    ),
    tag = "Dashboards"
)]
#[instrument(skip(state, jar, student))]
pub async fn student_datewise(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireStudent(student): RequireStudent,
    Path(student_id): Path<StudentId>,
) -> Result<Response, PageError> {
    datewise(&state, jar, &student, student_id).await
}

#[utoipa::path(
    get,
    path = "/parent/datewise/{student_id}",
    params(("student_id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Every attendance row of the child, newest first, with the overall tally"),
        (status = 303, description = "Not the parent's child; redirected with a message")
    ),
    tag = "Dashboards"
)]
#[instrument(skip(state, jar, parent))]
pub async fn parent_datewise(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireParent(parent): RequireParent,
    Path(student_id): Path<StudentId>,
) -> Result<Response, PageError> {
    datewise(&state, jar, &parent, student_id).await
}

#[utoipa::path(
    get,
    path = "/admin",
    responses(
        (status = 200, description = "Record counts"),
        (status = 303, description = "Not an administrator; redirected to login")
    ),
    tag = "Dashboards"
)]
#[instrument(skip(state, jar, admin))]
pub async fn admin_dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Response, PageError> {
    let users_by_role: serde_json::Map<String, serde_json::Value> =
        UserService::count_by_role(&state.db)
            .await?
            .into_iter()
            .map(|(role, count)| (role.to_string(), json!(count)))
            .collect();

    let page = Page::new(
        "admin_dashboard.html",
        json!({
            "users_by_role": users_by_role,
            "classes": ClassService::count(&state.db).await?,
            "students": StudentService::count(&state.db).await?,
            "attendance_records": AttendanceService::count(&state.db).await?,
        }),
    );

    Ok(render_page(&state, jar, Some(&admin), page).await?)
}
