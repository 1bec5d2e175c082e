//! Student profiles.

use crate::ids::{StudentId, UserId};
use crate::value_types::Email;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// The profile behind a STUDENT account. One per user.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Student {
    pub id: StudentId,
    pub user_id: UserId,
    pub roll_no: String,
    pub semester: Option<String>,
    pub year: Option<i32>,
    /// A PARENT account, cleared if the parent is deleted.
    pub parent_id: Option<UserId>,
}

impl Student {
    pub fn is_child_of(&self, parent: UserId) -> bool {
        self.parent_id == Some(parent)
    }
}

/// Student joined with the account name, for rosters and reports.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct StudentProfile {
    pub id: StudentId,
    pub user_id: UserId,
    pub roll_no: String,
    pub full_name: String,
    pub email: Email,
    pub parent_id: Option<UserId>,
}

/// Where a low-attendance alert goes.
#[derive(FromRow, Serialize, Debug, Clone)]
pub struct ParentContact {
    pub parent_id: UserId,
    pub full_name: String,
    pub email: Email,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateStudentDto {
    pub user_id: UserId,
    #[validate(length(min = 1, max = 20))]
    pub roll_no: String,
    #[validate(length(max = 20))]
    pub semester: Option<String>,
    pub year: Option<i32>,
    pub parent_id: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_child_of() {
        let parent = UserId::new();
        let student = Student {
            id: StudentId::new(),
            user_id: UserId::new(),
            roll_no: "R-001".to_string(),
            semester: None,
            year: None,
            parent_id: Some(parent),
        };
        assert!(student.is_child_of(parent));
        assert!(!student.is_child_of(UserId::new()));
    }
}
