//! User accounts.
//!
//! Every person in SAMS is a [`User`] with exactly one [`Role`]. Students
//! additionally have a [`Student`](crate::students::Student) profile.

use crate::ids::UserId;
use crate::value_types::Email;
use sams_core::Role;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub full_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub department: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Row used only by login and password changes.
#[derive(FromRow, Debug, Clone)]
pub struct UserCredentials {
    pub id: UserId,
    pub email: Email,
    pub full_name: String,
    pub role: Role,
    pub password: String,
}

/// Account creation input (CLI and seeding; there is no public sign-up).
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateUserDto {
    pub email: Email,
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub role: Role,
    #[validate(length(max = 15))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
}
