use anyhow::{Context, anyhow};
use sams_core::Role;
use sams_models::{
    ClassId, CreateStudentDto, ParentContact, Student, StudentId, StudentProfile, UserId,
};
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::users::service::UserService;
use crate::utils::errors::AppError;

const PROFILE_SELECT: &str = r#"
    SELECT s.id, s.user_id, s.roll_no, u.full_name, u.email, s.parent_id
    FROM students s
    JOIN users u ON u.id = s.user_id
"#;

pub struct StudentService;

impl StudentService {
    /// Links a STUDENT account to a profile. The optional parent must be a
    /// PARENT account.
    #[instrument(skip(db, dto), fields(roll_no = %dto.roll_no))]
    pub async fn create_student(db: &PgPool, dto: CreateStudentDto) -> Result<Student, AppError> {
        let mut tx = db.begin().await.context("Failed to begin transaction")?;

        UserService::ensure_role(&mut *tx, dto.user_id, Role::Student, "Student account").await?;
        if let Some(parent_id) = dto.parent_id {
            UserService::ensure_role(&mut *tx, parent_id, Role::Parent, "Parent account").await?;
        }

        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (user_id, roll_no, semester, year, parent_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, roll_no, semester, year, parent_id
            "#,
        )
        .bind(dto.user_id)
        .bind(&dto.roll_no)
        .bind(&dto.semester)
        .bind(dto.year)
        .bind(dto.parent_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::conflict(anyhow!("This account already has a student profile"))
            }
            e => AppError::database(anyhow::Error::from(e).context("Failed to insert student")),
        })?;

        tx.commit().await.context("Failed to commit student")?;

        Ok(student)
    }

    #[instrument(skip(db))]
    pub async fn get_profile(db: &PgPool, id: StudentId) -> Result<StudentProfile, AppError> {
        sqlx::query_as::<_, StudentProfile>(&format!("{PROFILE_SELECT} WHERE s.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch student by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
    }

    /// The profile behind a STUDENT login.
    #[instrument(skip(db))]
    pub async fn get_by_user(db: &PgPool, user_id: UserId) -> Result<StudentProfile, AppError> {
        sqlx::query_as::<_, StudentProfile>(&format!("{PROFILE_SELECT} WHERE s.user_id = $1"))
            .bind(user_id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch student by user")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Student profile not found")))
    }

    #[instrument(skip(db))]
    pub async fn children_of(
        db: &PgPool,
        parent_id: UserId,
    ) -> Result<Vec<StudentProfile>, AppError> {
        let children = sqlx::query_as::<_, StudentProfile>(&format!(
            "{PROFILE_SELECT} WHERE s.parent_id = $1 ORDER BY u.full_name"
        ))
        .bind(parent_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch children")
        .map_err(AppError::database)?;

        Ok(children)
    }

    /// Students enrolled in the class, by roll number.
    #[instrument(skip(db))]
    pub async fn enrolled_in(
        db: &PgPool,
        class_id: ClassId,
    ) -> Result<Vec<StudentProfile>, AppError> {
        let students = sqlx::query_as::<_, StudentProfile>(&format!(
            r#"{PROFILE_SELECT}
            JOIN student_classes sc ON sc.student_id = s.id
            WHERE sc.class_id = $1
            ORDER BY s.roll_no"#
        ))
        .bind(class_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch class roster")
        .map_err(AppError::database)?;

        Ok(students)
    }

    #[instrument(skip(db))]
    pub async fn is_enrolled(
        db: &PgPool,
        student_id: StudentId,
        class_id: ClassId,
    ) -> Result<bool, AppError> {
        let enrolled: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM student_classes WHERE student_id = $1 AND class_id = $2)",
        )
        .bind(student_id)
        .bind(class_id)
        .fetch_one(db)
        .await
        .context("Failed to check enrollment")
        .map_err(AppError::database)?;

        Ok(enrolled)
    }

    /// `None` when the student has no parent linked.
    #[instrument(skip(db))]
    pub async fn parent_contact(
        db: &PgPool,
        student_id: StudentId,
    ) -> Result<Option<ParentContact>, AppError> {
        let contact = sqlx::query_as::<_, ParentContact>(
            r#"
            SELECT p.id AS parent_id, p.full_name, p.email
            FROM students s
            JOIN users p ON p.id = s.parent_id
            WHERE s.id = $1
            "#,
        )
        .bind(student_id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch parent contact")
        .map_err(AppError::database)?;

        Ok(contact)
    }

    #[instrument(skip(db))]
    pub async fn count(db: &PgPool) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(db)
            .await
            .context("Failed to count students")
            .map_err(AppError::database)?;

        Ok(count)
    }
}
