//! Low-attendance alerts and the parent inbox.
//!
//! An alert goes out only when the student's percentage is strictly below
//! [`LOW_ATTENDANCE_THRESHOLD`] and a parent email is on file. The mail is
//! attempted once; a failure is reported, never retried.

use anyhow::{Context, anyhow};
use sams_models::{
    AttendanceSummary, Class, Email, LOW_ATTENDANCE_THRESHOLD, Notification, NotificationId,
    NotificationView, NotifyParentForm, ParentContact, StudentId, StudentProfile, UserId,
};
use sqlx::PgPool;
use tracing::instrument;

use crate::metrics::track_notification;
use crate::modules::attendance::aggregator;
use crate::modules::attendance::service::AttendanceService;
use crate::modules::students::service::StudentService;
use crate::utils::email::{Mailer, OutgoingEmail};
use crate::utils::errors::AppError;

#[derive(Debug, Clone, PartialEq)]
pub enum AlertOutcome {
    Sent { to: Email, parent_id: UserId },
    /// At or above the threshold.
    NotNeeded { percentage: f64 },
    NoParentEmail,
}

impl AlertOutcome {
    fn label(&self) -> &'static str {
        match self {
            AlertOutcome::Sent { .. } => "sent",
            AlertOutcome::NotNeeded { .. } => "not_needed",
            AlertOutcome::NoParentEmail => "no_parent",
        }
    }
}

/// Totals from a bulk check.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BulkCheckReport {
    pub checked: usize,
    pub alerted: usize,
    pub failed: usize,
}

#[derive(Debug, sqlx::FromRow)]
struct StudentTally {
    student_id: StudentId,
    full_name: String,
    present: i64,
    total: i64,
    parent_email: Option<Email>,
}

pub struct NotificationService;

impl NotificationService {
    /// Applies the threshold rule and, when it calls for an alert, sends
    /// `email_for(parent address)` exactly once.
    pub async fn dispatch_alert<F>(
        mailer: &dyn Mailer,
        summary: &AttendanceSummary,
        parent: Option<&ParentContact>,
        email_for: F,
    ) -> Result<AlertOutcome, AppError>
    where
        F: FnOnce(&Email) -> OutgoingEmail,
    {
        if !summary.is_below_threshold() {
            return Ok(AlertOutcome::NotNeeded {
                percentage: summary.percentage,
            });
        }

        let Some(parent) = parent else {
            return Ok(AlertOutcome::NoParentEmail);
        };

        let email = email_for(&parent.email);
        if let Err(err) = mailer.send(&email).await {
            track_notification("failed");
            return Err(err);
        }

        Ok(AlertOutcome::Sent {
            to: parent.email.clone(),
            parent_id: parent.parent_id,
        })
    }

    /// Alerts the parent about one class. Nothing is recorded.
    #[instrument(skip(db, mailer, form), fields(student_id = %student.id, class_id = %class.id))]
    pub async fn notify_parent(
        db: &PgPool,
        mailer: &dyn Mailer,
        student: &StudentProfile,
        class: &Class,
        form: &NotifyParentForm,
    ) -> Result<AlertOutcome, AppError> {
        let summary = AttendanceService::summary_for(db, student.id, class.id).await?;
        let parent = StudentService::parent_contact(db, student.id).await?;

        let outcome = Self::dispatch_alert(mailer, &summary, parent.as_ref(), |to| {
            OutgoingEmail::new(to.as_str(), &form.subject, &form.message)
        })
        .await?;

        track_notification(outcome.label());
        Ok(outcome)
    }

    /// Alerts the parent and, once the mail is out, stores the message in
    /// the parent's inbox.
    #[instrument(skip(db, mailer, form), fields(student_id = %student.id, class_id = %class.id))]
    pub async fn notify_parent_and_record(
        db: &PgPool,
        mailer: &dyn Mailer,
        student: &StudentProfile,
        class: &Class,
        form: &NotifyParentForm,
    ) -> Result<AlertOutcome, AppError> {
        let outcome = Self::notify_parent(db, mailer, student, class, form).await?;

        if let AlertOutcome::Sent { parent_id, .. } = &outcome {
            Self::record(db, *parent_id, student.id, &form.message).await?;
        }

        Ok(outcome)
    }

    #[instrument(skip(db, message))]
    pub async fn record(
        db: &PgPool,
        parent_id: UserId,
        student_id: StudentId,
        message: &str,
    ) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (parent_id, student_id, message)
            VALUES ($1, $2, $3)
            RETURNING id, parent_id, student_id, message, created_at, is_read
            "#,
        )
        .bind(parent_id)
        .bind(student_id)
        .bind(message)
        .fetch_one(db)
        .await
        .context("Failed to insert notification")
        .map_err(AppError::database)?;

        Ok(notification)
    }

    /// Newest first.
    #[instrument(skip(db))]
    pub async fn inbox(db: &PgPool, parent_id: UserId) -> Result<Vec<NotificationView>, AppError> {
        let notifications = sqlx::query_as::<_, NotificationView>(
            r#"
            SELECT n.id, n.student_id, u.full_name AS student_name, n.message,
                   n.created_at, n.is_read
            FROM notifications n
            JOIN students s ON s.id = n.student_id
            JOIN users u ON u.id = s.user_id
            WHERE n.parent_id = $1
            ORDER BY n.created_at DESC
            "#,
        )
        .bind(parent_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch notifications")
        .map_err(AppError::database)?;

        Ok(notifications)
    }

    #[instrument(skip(db))]
    pub async fn unread_count(db: &PgPool, parent_id: UserId) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE parent_id = $1 AND NOT is_read",
        )
        .bind(parent_id)
        .fetch_one(db)
        .await
        .context("Failed to count unread notifications")
        .map_err(AppError::database)?;

        Ok(count)
    }

    /// Marks one of the parent's notifications as read. There is no way
    /// back to unread.
    #[instrument(skip(db))]
    pub async fn mark_read(
        db: &PgPool,
        id: NotificationId,
        parent_id: UserId,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND parent_id = $2",
        )
        .bind(id)
        .bind(parent_id)
        .execute(db)
        .await
        .context("Failed to mark notification read")
        .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Notification not found")));
        }

        Ok(())
    }

    /// Checks every student's overall attendance and mails a fixed alert
    /// to the parents of those below the threshold. Students without any
    /// rows are skipped. Failures are logged and counted.
    #[instrument(skip(db, mailer))]
    pub async fn check_all(db: &PgPool, mailer: &dyn Mailer) -> Result<BulkCheckReport, AppError> {
        let tallies = sqlx::query_as::<_, StudentTally>(
            r#"
            SELECT s.id AS student_id, u.full_name,
                   COUNT(a.id) FILTER (WHERE a.status = 1) AS present,
                   COUNT(a.id) AS total,
                   p.email AS parent_email
            FROM students s
            JOIN users u ON u.id = s.user_id
            LEFT JOIN users p ON p.id = s.parent_id
            LEFT JOIN attendance a ON a.student_id = s.id
            GROUP BY s.id, u.full_name, p.email
            ORDER BY u.full_name
            "#,
        )
        .fetch_all(db)
        .await
        .context("Failed to tally attendance")
        .map_err(AppError::database)?;

        let mut report = BulkCheckReport::default();

        for tally in tallies {
            if tally.total == 0 {
                continue;
            }
            report.checked += 1;

            let percentage = aggregator::percentage(tally.present, tally.total);
            if percentage >= LOW_ATTENDANCE_THRESHOLD {
                continue;
            }
            let Some(parent_email) = tally.parent_email else {
                continue;
            };

            let email =
                OutgoingEmail::low_attendance_alert(parent_email.as_str(), &tally.full_name, percentage);
            match mailer.send(&email).await {
                Ok(()) => {
                    report.alerted += 1;
                    track_notification("sent");
                    tracing::info!(student_id = %tally.student_id, percentage, "Low attendance alert sent");
                }
                Err(err) => {
                    report.failed += 1;
                    track_notification("failed");
                    err.log();
                }
            }
        }

        Ok(report)
    }
}
