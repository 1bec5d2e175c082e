//! Errors for page handlers.
//!
//! Services return [`AppError`]. Page handlers return [`PageError`], which
//! turns the failure into a flash message and a `303 See Other` to a page
//! the user is allowed to see.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

pub use sams_core::errors::{AppError, ErrorKind};

use crate::utils::flash::{self, FlashLevel};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

#[derive(Debug)]
pub struct PageError {
    pub error: AppError,
    pub redirect_to: String,
}

impl PageError {
    pub fn new(error: AppError, redirect_to: impl Into<String>) -> Self {
        Self {
            error,
            redirect_to: redirect_to.into(),
        }
    }

    /// Missing or bad sessions always land on the login page, whatever the
    /// handler asked for.
    fn destination(&self) -> &str {
        match self.error.kind {
            ErrorKind::Authentication => LOGIN_PATH,
            _ => &self.redirect_to,
        }
    }

    fn level(&self) -> FlashLevel {
        match self.error.kind {
            ErrorKind::Conflict => FlashLevel::Warning,
            _ => FlashLevel::Error,
        }
    }
}

impl From<AppError> for PageError {
    fn from(error: AppError) -> Self {
        let redirect_to = match error.kind {
            ErrorKind::Authentication | ErrorKind::Authorization => LOGIN_PATH,
            _ => HOME_PATH,
        };
        Self::new(error, redirect_to)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        self.error.log();

        let jar = flash::push(CookieJar::new(), self.level(), self.error.user_message());
        (jar, Redirect::to(self.destination())).into_response()
    }
}

/// Attaches a redirect target to a service result.
pub trait OrRedirect<T> {
    fn or_redirect(self, to: &str) -> Result<T, PageError>;
}

impl<T> OrRedirect<T> for Result<T, AppError> {
    fn or_redirect(self, to: &str) -> Result<T, PageError> {
        self.map_err(|error| PageError::new(error, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{StatusCode, header};

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[test]
    fn test_authorization_defaults_to_login() {
        let err: PageError = AppError::forbidden(anyhow::anyhow!("Only teachers")).into();
        assert_eq!(err.redirect_to, LOGIN_PATH);
    }

    #[test]
    fn test_not_found_defaults_to_home() {
        let err: PageError = AppError::not_found(anyhow::anyhow!("Student not found")).into();
        assert_eq!(err.redirect_to, HOME_PATH);
    }

    #[test]
    fn test_authentication_ignores_requested_target() {
        let response = Err::<(), _>(AppError::unauthorized(anyhow::anyhow!("expired")))
            .or_redirect("/teacher/dashboard")
            .unwrap_err()
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), LOGIN_PATH);
    }

    #[test]
    fn test_redirect_sets_flash_cookie() {
        let response = PageError::new(
            AppError::conflict(anyhow::anyhow!("already taken")),
            "/teacher/dashboard",
        )
        .into_response();

        assert_eq!(location(&response), "/teacher/dashboard");
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(cookie.starts_with(flash::FLASH_COOKIE));
    }
}
