use std::collections::HashMap;

use anyhow::anyhow;
use axum::{
    Form,
    extract::{Path, State},
    response::Response,
};
use axum_extra::extract::CookieJar;
use chrono::NaiveDate;
use sams_core::Role;
use sams_models::{
    AttendanceMark, AttendanceStatus, Class, ClassId, EditAttendanceForm, StudentId,
    StudentProfile, TimeSlot, TimeSlotId, attendance::parse_date,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::policy::{AccessPolicy, ClassAction};
use crate::middleware::role::RequireTeacher;
use crate::modules::attendance::aggregator;
use crate::modules::attendance::service::{AttendanceService, session_label};
use crate::modules::classes::service::ClassService;
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::utils::errors::{AppError, OrRedirect, PageError};
use crate::utils::flash::{self, FlashLevel};
use crate::utils::render::{Page, render_page};
use crate::validator::ValidatedForm;

fn teacher_home() -> &'static str {
    Role::Teacher.home_path()
}

/// Reads `status_<student id>` fields for each enrolled student. Students
/// without a field are left unmarked.
pub(crate) fn parse_marks(
    students: &[StudentProfile],
    form: &HashMap<String, String>,
) -> Result<Vec<AttendanceMark>, AppError> {
    students
        .iter()
        .filter_map(|student| {
            form.get(&format!("status_{}", student.id))
                .map(|raw| (student, raw))
        })
        .map(|(student, raw)| {
            AttendanceStatus::parse(raw)
                .map(|status| AttendanceMark {
                    student_id: student.id,
                    status,
                })
                .ok_or_else(|| {
                    AppError::validation(anyhow!(
                        "Invalid attendance status for {}",
                        student.roll_no
                    ))
                })
        })
        .collect()
}

struct Session {
    class: Class,
    date: NaiveDate,
    slot: Option<TimeSlot>,
    students: Vec<StudentProfile>,
}

/// Everything both take-attendance pages check before showing or saving.
async fn open_session(
    state: &AppState,
    teacher: &AuthUser,
    class_id: ClassId,
    date: &str,
    time_slot_id: Option<TimeSlotId>,
) -> Result<Session, PageError> {
    let class =
        AccessPolicy::class_for_teacher(&state.db, teacher, class_id, ClassAction::TakeAttendance)
            .await
            .or_redirect(teacher_home())?;

    let date = parse_date(date)
        .ok_or_else(|| AppError::validation(anyhow!("Invalid date format.")))
        .or_redirect(teacher_home())?;

    let slot = match time_slot_id {
        Some(id) => Some(
            ClassService::get_time_slot(&state.db, id)
                .await
                .or_redirect(teacher_home())?,
        ),
        None => None,
    };

    AttendanceService::ensure_open(&state.db, &class, date, slot.as_ref())
        .await
        .or_redirect(teacher_home())?;

    let students = StudentService::enrolled_in(&state.db, class.id)
        .await
        .or_redirect(teacher_home())?;

    Ok(Session {
        class,
        date,
        slot,
        students,
    })
}

async fn show_session(
    state: &AppState,
    jar: CookieJar,
    teacher: &AuthUser,
    session: Session,
) -> Result<Response, PageError> {
    let page = Page::new(
        "take_attendance.html",
        json!({
            "class_obj": session.class,
            "date": session.date,
            "time_slot": session.slot,
            "students": session.students,
            "attendance_locked": false,
        }),
    );

    Ok(render_page(state, jar, Some(teacher), page).await?)
}

async fn save_session(
    state: &AppState,
    jar: CookieJar,
    teacher: &AuthUser,
    session: Session,
    form: HashMap<String, String>,
) -> Result<Response, PageError> {
    let marks = parse_marks(&session.students, &form).or_redirect(teacher_home())?;

    AttendanceService::take_attendance(
        &state.db,
        &session.class,
        session.date,
        session.slot.as_ref(),
        &marks,
        teacher.user_id(),
    )
    .await
    .or_redirect(teacher_home())?;

    let label = session_label(&session.class, session.date, session.slot.as_ref());
    Ok(flash::redirect(
        jar,
        FlashLevel::Success,
        format!("{} saved successfully", label),
        teacher_home(),
    ))
}

#[utoipa::path(
    get,
    path = "/take-attendance/{class_id}/{date}",
    params(
        ("class_id" = Uuid, Path, description = "Class ID"),
        ("date" = String, Path, description = "Date as YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Attendance sheet for the enrolled students"),
        (status = 303, description = "Refused or already taken; redirected with a message")
    ),
    tag = "Attendance"
)]
#[instrument(skip(state, jar, teacher))]
pub async fn take_attendance_page(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireTeacher(teacher): RequireTeacher,
    Path((class_id, date)): Path<(ClassId, String)>,
) -> Result<Response, PageError> {
    let session = open_session(&state, &teacher, class_id, &date, None).await?;
    show_session(&state, jar, &teacher, session).await
}

#[utoipa::path(
    post,
    path = "/take-attendance/{class_id}/{date}",
    params(
        ("class_id" = Uuid, Path, description = "Class ID"),
        ("date" = String, Path, description = "Date as YYYY-MM-DD")
    ),
    request_body(
        content = Object,
        content_type = "application/x-www-form-urlencoded",
        description = "One `status_<student id>` field per student: 1 present, 0 absent"
    ),
    responses(
        (status = 303, description = "Saved, refused, or already taken; redirected with a message")
    ),
    tag = "Attendance"
)]
#[instrument(skip(state, jar, teacher, form))]
pub async fn submit_attendance(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireTeacher(teacher): RequireTeacher,
    Path((class_id, date)): Path<(ClassId, String)>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, PageError> {
    let session = open_session(&state, &teacher, class_id, &date, None).await?;
    save_session(&state, jar, &teacher, session, form).await
}

#[utoipa::path(
    get,
    path = "/take-attendance/{class_id}/{date}/{time_slot_id}",
    params(
        ("class_id" = Uuid, Path, description = "Class ID"),
        ("date" = String, Path, description = "Date as YYYY-MM-DD"),
        ("time_slot_id" = Uuid, Path, description = "Time slot ID")
    ),
    responses(
        (status = 200, description = "Attendance sheet for the enrolled students"),
        (status = 303, description = "Refused or already taken; redirected with a message")
    ),
    tag = "Attendance"
)]
#[instrument(skip(state, jar, teacher))]
pub async fn take_attendance_in_slot_page(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireTeacher(teacher): RequireTeacher,
    Path((class_id, date, time_slot_id)): Path<(ClassId, String, TimeSlotId)>,
) -> Result<Response, PageError> {
    let session = open_session(&state, &teacher, class_id, &date, Some(time_slot_id)).await?;
    show_session(&state, jar, &teacher, session).await
}

#[utoipa::path(
    post,
    path = "/take-attendance/{class_id}/{date}/{time_slot_id}",
    params(
        ("class_id" = Uuid, Path, description = "Class ID"),
        ("date" = String, Path, description = "Date as YYYY-MM-DD"),
        ("time_slot_id" = Uuid, Path, description = "Time slot ID")
    ),
    request_body(
        content = Object,
        content_type = "application/x-www-form-urlencoded",
        description = "One `status_<student id>` field per student: 1 present, 0 absent"
    ),
    responses(
        (status = 303, description = "Saved, refused, or already taken; redirected with a message")
    ),
    tag = "Attendance"
)]
#[instrument(skip(state, jar, teacher, form))]
pub async fn submit_attendance_in_slot(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireTeacher(teacher): RequireTeacher,
    Path((class_id, date, time_slot_id)): Path<(ClassId, String, TimeSlotId)>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, PageError> {
    let session = open_session(&state, &teacher, class_id, &date, Some(time_slot_id)).await?;
    save_session(&state, jar, &teacher, session, form).await
}

#[utoipa::path(
    get,
    path = "/attendance-summary/{class_id}",
    params(
        ("class_id" = Uuid, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Per-student roster summary", body = [sams_models::RosterEntry]),
        (status = 303, description = "Refused; redirected with a message")
    ),
    tag = "Attendance"
)]
#[instrument(skip(state, jar, teacher))]
pub async fn attendance_summary(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireTeacher(teacher): RequireTeacher,
    Path(class_id): Path<ClassId>,
) -> Result<Response, PageError> {
    let class =
        AccessPolicy::class_for_teacher(&state.db, &teacher, class_id, ClassAction::ViewAttendance)
            .await
            .or_redirect(teacher_home())?;

    let students = StudentService::enrolled_in(&state.db, class.id).await?;
    let records = AttendanceService::records_for_class(&state.db, class.id).await?;
    let summary = aggregator::roster_summary(&students, &records);

    let page = Page::new(
        "attendance_summary.html",
        json!({
            "class_obj": class,
            "summary": summary,
        }),
    );

    Ok(render_page(&state, jar, Some(&teacher), page).await?)
}

#[utoipa::path(
    get,
    path = "/edit-attendance/{student_id}/{class_id}",
    params(
        ("student_id" = Uuid, Path, description = "Student ID"),
        ("class_id" = Uuid, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "The student's records in the class, newest first"),
        (status = 303, description = "Refused; redirected with a message")
    ),
    tag = "Attendance"
)]
#[instrument(skip(state, jar, teacher))]
pub async fn edit_attendance_page(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireTeacher(teacher): RequireTeacher,
    Path((student_id, class_id)): Path<(StudentId, ClassId)>,
) -> Result<Response, PageError> {
    let class =
        AccessPolicy::class_for_teacher(&state.db, &teacher, class_id, ClassAction::EditAttendance)
            .await
            .or_redirect(teacher_home())?;
    let student = StudentService::get_profile(&state.db, student_id)
        .await
        .or_redirect(teacher_home())?;
    let records =
        AttendanceService::records_for_student_in_class(&state.db, student.id, class.id).await?;

    let page = Page::new(
        "edit_attendance.html",
        json!({
            "student": student,
            "class_obj": class,
            "records": records,
        }),
    );

    Ok(render_page(&state, jar, Some(&teacher), page).await?)
}

#[utoipa::path(
    post,
    path = "/edit-attendance/{student_id}/{class_id}",
    params(
        ("student_id" = Uuid, Path, description = "Student ID"),
        ("class_id" = Uuid, Path, description = "Class ID")
    ),
    request_body(content = EditAttendanceForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated or refused; redirected with a message")
    ),
    tag = "Attendance"
)]
#[instrument(skip(state, jar, teacher))]
pub async fn edit_attendance(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireTeacher(teacher): RequireTeacher,
    Path((student_id, class_id)): Path<(StudentId, ClassId)>,
    ValidatedForm(form): ValidatedForm<EditAttendanceForm>,
) -> Result<Response, PageError> {
    let class =
        AccessPolicy::class_for_teacher(&state.db, &teacher, class_id, ClassAction::EditAttendance)
            .await
            .or_redirect(teacher_home())?;
    let student = StudentService::get_profile(&state.db, student_id)
        .await
        .or_redirect(teacher_home())?;

    let back = format!("/edit-attendance/{}/{}", student.id, class.id);

    AttendanceService::update_status(
        &state.db,
        form.record_id,
        student.id,
        class.id,
        form.status,
        teacher.user_id(),
    )
    .await
    .or_redirect(&back)?;

    Ok(flash::redirect(
        jar,
        FlashLevel::Success,
        format!(
            "Attendance updated successfully for {} in {}!",
            student.full_name, class.code
        ),
        &back,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sams_models::{Email, UserId};

    fn profile(roll: &str) -> StudentProfile {
        StudentProfile {
            id: StudentId::new(),
            user_id: UserId::new(),
            roll_no: roll.to_string(),
            full_name: roll.to_string(),
            email: Email::new_unchecked(format!("{}@school.edu", roll)),
            parent_id: None,
        }
    }

    #[test]
    fn test_parse_marks_reads_status_fields() {
        let a = profile("A");
        let b = profile("B");
        let c = profile("C");
        let form = HashMap::from([
            (format!("status_{}", a.id), "1".to_string()),
            (format!("status_{}", b.id), "0".to_string()),
            ("csrf".to_string(), "x".to_string()),
        ]);

        let marks = parse_marks(&[a.clone(), b.clone(), c], &form).unwrap();
        assert_eq!(
            marks,
            vec![
                AttendanceMark {
                    student_id: a.id,
                    status: AttendanceStatus::Present
                },
                AttendanceMark {
                    student_id: b.id,
                    status: AttendanceStatus::Absent
                },
            ]
        );
    }

    #[test]
    fn test_parse_marks_rejects_unknown_status() {
        let a = profile("A");
        let form = HashMap::from([(format!("status_{}", a.id), "late".to_string())]);
        let err = parse_marks(&[a], &form).unwrap_err();
        assert_eq!(err.user_message(), "Invalid attendance status for A");
    }
}
