use anyhow::anyhow;
use sams_auth::create_access_token;
use sams_core::{Role, verify_password};
use sams_models::UserId;
use sqlx::PgPool;
use tracing::instrument;

use crate::config::jwt::JwtConfig;
use crate::metrics::{track_login_failure, track_login_success};
use crate::modules::users::service::UserService;
use crate::utils::errors::AppError;

/// A successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user_id: UserId,
    pub role: Role,
    pub access_token: String,
}

pub struct AuthService;

impl AuthService {
    /// Checks the password and issues a session token. Unknown emails and
    /// wrong passwords get the same answer.
    #[instrument(skip(db, password, jwt_config))]
    pub async fn login(
        db: &PgPool,
        email: &str,
        password: &str,
        jwt_config: &JwtConfig,
    ) -> Result<LoginOutcome, AppError> {
        let invalid = || AppError::unauthorized(anyhow!("Invalid email or password."));

        let Some(user) = UserService::find_credentials(db, email).await? else {
            track_login_failure();
            return Err(invalid());
        };

        if !verify_password(password, &user.password)? {
            track_login_failure();
            return Err(invalid());
        }

        let access_token = create_access_token(
            user.id.into_inner(),
            user.email.as_str(),
            user.role,
            jwt_config,
        )?;

        track_login_success(user.role);
        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(LoginOutcome {
            user_id: user.id,
            role: user.role,
            access_token,
        })
    }
}
