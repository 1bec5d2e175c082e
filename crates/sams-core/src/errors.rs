//! Application error type.
//!
//! Every failure in SAMS is one of a closed set of [`ErrorKind`]s. Handlers
//! never retry: the error is logged, turned into a user-visible message and
//! the caller is sent somewhere safe.

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Message shown to users when the underlying cause must stay private.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad credentials or no session.
    Authentication,
    /// Wrong role or not the owner of the resource.
    Authorization,
    NotFound,
    /// Duplicate attendance session, duplicate email.
    Conflict,
    /// Malformed input, password mismatch, bad date, wrong or expired OTP.
    Validation,
    /// Mail collaborator failed.
    ExternalService,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ExternalService => StatusCode::BAD_GATEWAY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            error: err.into(),
        }
    }

    pub fn unauthorized<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Authentication, err)
    }

    pub fn forbidden<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Authorization, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::NotFound, err)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Conflict, err)
    }

    pub fn validation<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Validation, err)
    }

    pub fn external<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::ExternalService, err)
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    /// Text safe to show the user. Internal causes are replaced with a
    /// generic message; everything else, mail failures included, is echoed.
    pub fn user_message(&self) -> String {
        match self.kind {
            ErrorKind::Internal => GENERIC_FAILURE_MESSAGE.to_string(),
            _ => self.error.to_string(),
        }
    }

    /// Logs the error at a level matching its kind.
    pub fn log(&self) {
        match self.kind {
            ErrorKind::Internal => tracing::error!(error = ?self.error, "Internal error"),
            ErrorKind::ExternalService => {
                tracing::error!(error = %self.error, "External service failure")
            }
            _ => tracing::warn!(kind = ?self.kind, error = %self.error, "Request refused"),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let body = Json(json!({
            "error": self.user_message()
        }));

        (self.status(), body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_internal_message_is_generic() {
        let err = AppError::internal(anyhow!("connection reset by peer"));
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_external_message_echoes_detail() {
        let err = AppError::external(anyhow!("Failed to send email: relay refused"));
        assert_eq!(err.user_message(), "Failed to send email: relay refused");
        assert_eq!(err.kind, ErrorKind::ExternalService);
    }

    #[test]
    fn test_conflict_status() {
        let err = AppError::conflict(anyhow!("Attendance already taken"));
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.user_message(), "Attendance already taken");
    }

    #[test]
    fn test_question_mark_defaults_to_internal() {
        fn parse() -> Result<i32, AppError> {
            Ok("x".parse::<i32>()?)
        }

        assert_eq!(parse().unwrap_err().kind, ErrorKind::Internal);
    }

    #[test]
    fn test_into_response_uses_kind_status() {
        let response = AppError::not_found(anyhow!("Student not found")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
