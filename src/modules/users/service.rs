use anyhow::{Context, anyhow};
use sams_core::{Role, hash_password};
use sams_models::{CreateUserDto, Email, User, UserCredentials, UserId};
use sqlx::{PgExecutor, PgPool};
use tracing::instrument;

use crate::utils::errors::AppError;

const USER_COLUMNS: &str = "id, email, full_name, role, phone, address, department, created_at";

pub struct UserService;

impl UserService {
    #[instrument(skip(db, dto), fields(email = %dto.email, role = %dto.role))]
    pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password, full_name, role, phone, address, department)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&dto.email)
        .bind(hashed_password)
        .bind(&dto.full_name)
        .bind(dto.role)
        .bind(&dto.phone)
        .bind(&dto.address)
        .bind(&dto.department)
        .fetch_one(db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::conflict(
                anyhow!("User with email {} already exists", dto.email),
            ),
            e => AppError::database(anyhow::Error::from(e).context("Failed to insert user")),
        })?;

        Ok(user)
    }

    #[instrument(skip(db))]
    pub async fn get_user(db: &PgPool, id: UserId) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch user by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    /// Lookup used by login and password reset. Emails compare
    /// case-insensitively.
    #[instrument(skip(db))]
    pub async fn find_credentials(
        db: &PgPool,
        email: &str,
    ) -> Result<Option<UserCredentials>, AppError> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            r#"
            SELECT id, email, full_name, role, password
            FROM users
            WHERE email = LOWER(TRIM($1))
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
        .context("Failed to fetch user by email")
        .map_err(AppError::database)?;

        Ok(credentials)
    }

    #[instrument(skip(db, password_hash))]
    pub async fn set_password(
        db: &PgPool,
        email: &Email,
        password_hash: &str,
    ) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET password = $1 WHERE email = $2")
            .bind(password_hash)
            .bind(email)
            .execute(db)
            .await
            .context("Failed to update password")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("User not found.")));
        }

        Ok(())
    }

    /// Fails with a validation error unless `id` names a user with `role`.
    #[instrument(skip(db))]
    pub async fn ensure_role<'e, E: PgExecutor<'e>>(
        db: E,
        id: UserId,
        role: Role,
        what: &str,
    ) -> Result<(), AppError> {
        let actual: Option<Role> = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch user role")
            .map_err(AppError::database)?;

        match actual {
            Some(actual) if actual == role => Ok(()),
            Some(actual) => Err(AppError::validation(anyhow!(
                "{} must be a {} account, not {}",
                what,
                role,
                actual
            ))),
            None => Err(AppError::validation(anyhow!("{} does not exist", what))),
        }
    }

    #[instrument(skip(db))]
    pub async fn count_by_role(db: &PgPool) -> Result<Vec<(Role, i64)>, AppError> {
        let counts = sqlx::query_as::<_, (Role, i64)>(
            "SELECT role, COUNT(*) FROM users GROUP BY role ORDER BY role",
        )
        .fetch_all(db)
        .await
        .context("Failed to count users")
        .map_err(AppError::database)?;

        Ok(counts)
    }
}
