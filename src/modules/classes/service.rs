use anyhow::{Context, anyhow};
use sams_core::Role;
use sams_models::{
    Class, ClassId, ClassListing, CreateClassDto, CreateTimeSlotDto, StudentId, TimeSlot,
    TimeSlotId, UserId,
};
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::users::service::UserService;
use crate::utils::errors::AppError;

const CLASS_COLUMNS: &str = "id, code, title, semester, year, time_slot_id, teacher_id";

pub struct ClassService;

impl ClassService {
    #[instrument(skip(db))]
    pub async fn get_class(db: &PgPool, id: ClassId) -> Result<Class, AppError> {
        sqlx::query_as::<_, Class>(&format!("SELECT {CLASS_COLUMNS} FROM classes WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch class by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Class not found")))
    }

    #[instrument(skip(db))]
    pub async fn list_for_teacher(
        db: &PgPool,
        teacher_id: UserId,
    ) -> Result<Vec<ClassListing>, AppError> {
        let classes = sqlx::query_as::<_, ClassListing>(
            r#"
            SELECT c.id, c.code, c.title, c.semester, c.year, c.time_slot_id,
                   t.start_time, t.end_time
            FROM classes c
            JOIN time_slots t ON t.id = c.time_slot_id
            WHERE c.teacher_id = $1
            ORDER BY c.code
            "#,
        )
        .bind(teacher_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch classes for teacher")
        .map_err(AppError::database)?;

        Ok(classes)
    }

    /// Classes the student is enrolled in, by code.
    #[instrument(skip(db))]
    pub async fn list_for_student(
        db: &PgPool,
        student_id: StudentId,
    ) -> Result<Vec<Class>, AppError> {
        let classes = sqlx::query_as::<_, Class>(
            r#"
            SELECT c.id, c.code, c.title, c.semester, c.year, c.time_slot_id, c.teacher_id
            FROM classes c
            JOIN student_classes sc ON sc.class_id = c.id
            WHERE sc.student_id = $1
            ORDER BY c.code
            "#,
        )
        .bind(student_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch enrolled classes")
        .map_err(AppError::database)?;

        Ok(classes)
    }

    #[instrument(skip(db))]
    pub async fn list_time_slots(db: &PgPool) -> Result<Vec<TimeSlot>, AppError> {
        let slots = sqlx::query_as::<_, TimeSlot>(
            "SELECT id, start_time, end_time FROM time_slots ORDER BY start_time",
        )
        .fetch_all(db)
        .await
        .context("Failed to fetch time slots")
        .map_err(AppError::database)?;

        Ok(slots)
    }

    #[instrument(skip(db))]
    pub async fn get_time_slot(db: &PgPool, id: TimeSlotId) -> Result<TimeSlot, AppError> {
        sqlx::query_as::<_, TimeSlot>("SELECT id, start_time, end_time FROM time_slots WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch time slot")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Time slot not found")))
    }

    #[instrument(skip(db))]
    pub async fn create_time_slot(
        db: &PgPool,
        dto: CreateTimeSlotDto,
    ) -> Result<TimeSlot, AppError> {
        let slot = sqlx::query_as::<_, TimeSlot>(
            r#"
            INSERT INTO time_slots (start_time, end_time)
            VALUES ($1, $2)
            RETURNING id, start_time, end_time
            "#,
        )
        .bind(dto.start_time)
        .bind(dto.end_time)
        .fetch_one(db)
        .await
        .context("Failed to insert time slot")
        .map_err(AppError::database)?;

        Ok(slot)
    }

    /// The assigned teacher, when given, must hold the TEACHER role.
    #[instrument(skip(db, dto), fields(code = %dto.code))]
    pub async fn create_class(db: &PgPool, dto: CreateClassDto) -> Result<Class, AppError> {
        if let Some(teacher_id) = dto.teacher_id {
            UserService::ensure_role(db, teacher_id, Role::Teacher, "Class teacher").await?;
        }

        let class = sqlx::query_as::<_, Class>(&format!(
            r#"
            INSERT INTO classes (code, title, semester, year, time_slot_id, teacher_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CLASS_COLUMNS}
            "#
        ))
        .bind(&dto.code)
        .bind(&dto.title)
        .bind(&dto.semester)
        .bind(dto.year)
        .bind(dto.time_slot_id)
        .bind(dto.teacher_id)
        .fetch_one(db)
        .await
        .context("Failed to insert class")
        .map_err(AppError::database)?;

        Ok(class)
    }

    /// Enrolling twice is a no-op.
    #[instrument(skip(db))]
    pub async fn enroll(
        db: &PgPool,
        student_id: StudentId,
        class_id: ClassId,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO student_classes (student_id, class_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(student_id)
        .bind(class_id)
        .execute(db)
        .await
        .context("Failed to enroll student")
        .map_err(AppError::database)?;

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn count(db: &PgPool) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM classes")
            .fetch_one(db)
            .await
            .context("Failed to count classes")
            .map_err(AppError::database)?;

        Ok(count)
    }
}
