//! Parent notifications and the alert form teachers fill in.

use crate::ids::{NotificationId, StudentId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Audit record of an alert sent to a parent. `is_read` only ever goes
/// from false to true.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Notification {
    pub id: NotificationId,
    pub parent_id: UserId,
    pub student_id: StudentId,
    pub message: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub is_read: bool,
}

/// Inbox row: the notification plus the child's name.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct NotificationView {
    pub id: NotificationId,
    pub student_id: StudentId,
    pub student_name: String,
    pub message: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub is_read: bool,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct NotifyParentForm {
    #[validate(length(min = 1, max = 200, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_subject_rejected() {
        let form = NotifyParentForm {
            subject: String::new(),
            message: "Please call the school".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("subject"));
    }
}
