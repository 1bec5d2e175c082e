//! Administrative commands behind the `sams-cli` binary.

pub mod seeder;

use anyhow::Context;
use sams_models::{CreateUserDto, User};
use sqlx::PgPool;
use validator::Validate;

use crate::config::email::EmailConfig;
use crate::metrics::track_user_created;
use crate::modules::notifications::service::{BulkCheckReport, NotificationService};
use crate::modules::users::service::UserService;
use crate::utils::email::EmailService;

/// Creates an account of any role. There is no public sign-up, so this is
/// how the first admin and teachers come to exist.
pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> anyhow::Result<User> {
    dto.validate().context("Invalid user details")?;

    let user = UserService::create_user(db, dto)
        .await
        .map_err(|e| e.error)?;
    track_user_created(user.role);

    Ok(user)
}

/// Mails the parent of every student whose overall attendance is below
/// the threshold.
pub async fn check_attendance(db: &PgPool) -> anyhow::Result<BulkCheckReport> {
    let mailer = EmailService::new(EmailConfig::from_env());
    NotificationService::check_all(db, &mailer)
        .await
        .map_err(|e| e.error)
}
