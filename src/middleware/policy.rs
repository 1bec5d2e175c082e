//! Who may do what.
//!
//! Every capability check in SAMS goes through [`AccessPolicy`]. Role
//! checks are answered from the session token; ownership checks (is this
//! my class, is this my child) load the row first.

use anyhow::anyhow;
use sams_core::Role;
use sams_models::{Class, ClassId, StudentId, StudentProfile};
use sqlx::PgPool;
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::classes::service::ClassService;
use crate::modules::students::service::StudentService;
use crate::utils::errors::AppError;

/// What a teacher is trying to do with a class; only used to word the
/// refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassAction {
    TakeAttendance,
    ViewAttendance,
    EditAttendance,
    NotifyParents,
}

impl ClassAction {
    fn refusal(self) -> &'static str {
        match self {
            Self::TakeAttendance => "You are not authorized to take attendance for this class.",
            Self::ViewAttendance => "You are not authorized to view attendance for this class.",
            Self::EditAttendance => "You are not authorized to edit attendance for this class.",
            Self::NotifyParents => "You are not authorized to notify parents for this class.",
        }
    }
}

pub struct AccessPolicy;

impl AccessPolicy {
    pub fn require_role(user: &AuthUser, role: Role, message: &str) -> Result<(), AppError> {
        if user.has_role(role) {
            Ok(())
        } else {
            Err(AppError::forbidden(anyhow!("{}", message)))
        }
    }

    /// Only the class's assigned teacher manages it.
    pub fn can_manage_class(user: &AuthUser, class: &Class) -> bool {
        user.has_role(Role::Teacher) && class.is_taught_by(user.user_id())
    }

    /// Students see themselves; parents see their children.
    pub fn can_view_student(user: &AuthUser, student: &StudentProfile) -> bool {
        match user.role() {
            Role::Student => student.user_id == user.user_id(),
            Role::Parent => student.parent_id == Some(user.user_id()),
            Role::Teacher | Role::Admin => false,
        }
    }

    /// Loads the class and checks that `user` teaches it.
    #[instrument(skip(db, user), fields(user_id = %user.user_id()))]
    pub async fn class_for_teacher(
        db: &PgPool,
        user: &AuthUser,
        class_id: ClassId,
        action: ClassAction,
    ) -> Result<Class, AppError> {
        let class = ClassService::get_class(db, class_id).await?;

        if !Self::can_manage_class(user, &class) {
            return Err(AppError::forbidden(anyhow!("{}", action.refusal())));
        }

        Ok(class)
    }

    /// Loads the student and checks that `user` may see them. A student
    /// the user may not see is reported as missing.
    #[instrument(skip(db, user), fields(user_id = %user.user_id()))]
    pub async fn student_for_viewer(
        db: &PgPool,
        user: &AuthUser,
        student_id: StudentId,
    ) -> Result<StudentProfile, AppError> {
        let student = StudentService::get_profile(db, student_id).await?;

        if !Self::can_view_student(user, &student) {
            return Err(AppError::not_found(anyhow!("Student not found")));
        }

        Ok(student)
    }
}
