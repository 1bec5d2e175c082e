use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use sams_models::{
    AttendanceId, AttendanceMark, AttendanceRecord, AttendanceStatus, AttendanceSummary, Class,
    ClassAttendanceSummary, ClassId, StudentId, TimeSlot, TimeSlotId, UserId,
};
use sqlx::PgPool;
use tracing::instrument;

use crate::metrics::track_attendance_taken;
use crate::modules::attendance::aggregator;
use crate::modules::classes::service::ClassService;
use crate::utils::errors::AppError;

const RECORD_SELECT: &str = r#"
    SELECT a.id, a.student_id, a.class_id, c.code AS class_code, c.title AS class_title,
           a.date, a.status, a.remarks
    FROM attendance a
    LEFT JOIN classes c ON c.id = a.class_id
"#;

const RECORD_ORDER: &str = "ORDER BY a.date DESC, a.created_at DESC";

/// "Attendance for MTH101 on 2024-03-15 (09:00-10:00)"
pub fn session_label(class: &Class, date: NaiveDate, slot: Option<&TimeSlot>) -> String {
    match slot {
        Some(slot) => format!(
            "Attendance for {} on {} ({}-{})",
            class.code,
            date,
            slot.start_time.format("%H:%M"),
            slot.end_time.format("%H:%M")
        ),
        None => format!("Attendance for {} on {}", class.code, date),
    }
}

pub struct AttendanceService;

impl AttendanceService {
    /// Whether any attendance exists for the class on `date`.
    #[instrument(skip(db))]
    pub async fn is_taken(db: &PgPool, class_id: ClassId, date: NaiveDate) -> Result<bool, AppError> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM attendance WHERE class_id = $1 AND date = $2)",
        )
        .bind(class_id)
        .bind(date)
        .fetch_one(db)
        .await
        .context("Failed to check attendance lock")
        .map_err(AppError::database)?;

        Ok(taken)
    }

    /// Slot-scoped lock: only rows whose class meets in `time_slot_id` count.
    #[instrument(skip(db))]
    pub async fn is_taken_in_slot(
        db: &PgPool,
        class_id: ClassId,
        date: NaiveDate,
        time_slot_id: TimeSlotId,
    ) -> Result<bool, AppError> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM attendance a
                JOIN classes c ON c.id = a.class_id
                WHERE a.class_id = $1 AND a.date = $2 AND c.time_slot_id = $3
            )
            "#,
        )
        .bind(class_id)
        .bind(date)
        .bind(time_slot_id)
        .fetch_one(db)
        .await
        .context("Failed to check attendance lock")
        .map_err(AppError::database)?;

        Ok(taken)
    }

    /// Refuses with `Conflict` if the session was already taken.
    pub async fn ensure_open(
        db: &PgPool,
        class: &Class,
        date: NaiveDate,
        slot: Option<&TimeSlot>,
    ) -> Result<(), AppError> {
        let taken = match slot {
            Some(slot) => Self::is_taken_in_slot(db, class.id, date, slot.id).await?,
            None => Self::is_taken(db, class.id, date).await?,
        };

        if taken {
            return Err(AppError::conflict(anyhow!(
                "{} has already been taken.",
                session_label(class, date, slot)
            )));
        }

        Ok(())
    }

    /// Records one attendance session in a single transaction. Either every
    /// mark is stored or none is.
    #[instrument(skip(db, class, marks), fields(class_id = %class.id, marks = marks.len()))]
    pub async fn take_attendance(
        db: &PgPool,
        class: &Class,
        date: NaiveDate,
        slot: Option<&TimeSlot>,
        marks: &[AttendanceMark],
        marked_by: UserId,
    ) -> Result<u64, AppError> {
        Self::ensure_open(db, class, date, slot).await?;

        let mut tx = db.begin().await.context("Failed to begin transaction")?;
        let mut inserted = 0;

        for mark in marks {
            sqlx::query(
                r#"
                INSERT INTO attendance (student_id, class_id, date, status, marked_by)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(mark.student_id)
            .bind(class.id)
            .bind(date)
            .bind(mark.status)
            .bind(marked_by)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    AppError::conflict(anyhow!(
                        "{} has already been taken.",
                        session_label(class, date, slot)
                    ))
                }
                e => AppError::database(anyhow::Error::from(e).context("Failed to insert attendance")),
            })?;
            inserted += 1;
        }

        tx.commit().await.context("Failed to commit attendance")?;

        track_attendance_taken(inserted);
        tracing::info!(inserted, "Attendance session recorded");

        Ok(inserted)
    }

    #[instrument(skip(db))]
    pub async fn records_for_class(
        db: &PgPool,
        class_id: ClassId,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "{RECORD_SELECT} WHERE a.class_id = $1 {RECORD_ORDER}"
        ))
        .bind(class_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch class attendance")
        .map_err(AppError::database)?;

        Ok(records)
    }

    /// Every row for the student, newest first, with or without a class.
    #[instrument(skip(db))]
    pub async fn records_for_student(
        db: &PgPool,
        student_id: StudentId,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "{RECORD_SELECT} WHERE a.student_id = $1 {RECORD_ORDER}"
        ))
        .bind(student_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch student attendance")
        .map_err(AppError::database)?;

        Ok(records)
    }

    #[instrument(skip(db))]
    pub async fn records_for_student_in_class(
        db: &PgPool,
        student_id: StudentId,
        class_id: ClassId,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "{RECORD_SELECT} WHERE a.student_id = $1 AND a.class_id = $2 {RECORD_ORDER}"
        ))
        .bind(student_id)
        .bind(class_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch student attendance for class")
        .map_err(AppError::database)?;

        Ok(records)
    }

    /// Granularity (a): one student in one class.
    pub async fn summary_for(
        db: &PgPool,
        student_id: StudentId,
        class_id: ClassId,
    ) -> Result<AttendanceSummary, AppError> {
        let records = Self::records_for_student_in_class(db, student_id, class_id).await?;
        Ok(aggregator::summarize_records(&records))
    }

    /// Granularity (a) for every class the student is enrolled in, including
    /// classes with no rows yet.
    #[instrument(skip(db))]
    pub async fn summaries_for_enrolled(
        db: &PgPool,
        student_id: StudentId,
    ) -> Result<Vec<ClassAttendanceSummary>, AppError> {
        let mut summaries = Vec::new();
        for class in ClassService::list_for_student(db, student_id).await? {
            let summary = Self::summary_for(db, student_id, class.id).await?;
            summaries.push(ClassAttendanceSummary {
                class: class.to_ref(),
                summary,
            });
        }
        Ok(summaries)
    }

    /// Changes the status of one of the student's rows in the class. Only
    /// `status` and `marked_by` change.
    #[instrument(skip(db))]
    pub async fn update_status(
        db: &PgPool,
        record_id: AttendanceId,
        student_id: StudentId,
        class_id: ClassId,
        status: AttendanceStatus,
        marked_by: UserId,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET status = $1, marked_by = $2
            WHERE id = $3 AND student_id = $4 AND class_id = $5
            "#,
        )
        .bind(status)
        .bind(marked_by)
        .bind(record_id)
        .bind(student_id)
        .bind(class_id)
        .execute(db)
        .await
        .context("Failed to update attendance")
        .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Attendance record not found")));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn count(db: &PgPool) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendance")
            .fetch_one(db)
            .await
            .context("Failed to count attendance")
            .map_err(AppError::database)?;

        Ok(count)
    }
}
