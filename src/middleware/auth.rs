use anyhow::anyhow;
use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use sams_auth::{Claims, verify_token};
use sams_config::JwtConfig;
use sams_core::Role;
use sams_models::UserId;

use crate::state::AppState;
use crate::utils::errors::{AppError, PageError};

pub const SESSION_COOKIE: &str = "sams_session";

/// The logged-in user, taken from the session cookie or a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.0.sub)
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.0.role == role
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = PageError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = match bearer_token(parts) {
            Some(token) => token.to_string(),
            None => CookieJar::from_headers(&parts.headers)
                .get(SESSION_COOKIE)
                .map(|cookie| cookie.value().to_string())
                .ok_or_else(|| AppError::unauthorized(anyhow!("Please log in to continue.")))?,
        };

        let claims = verify_token(&token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// `Option<AuthUser>` for pages that also serve anonymous visitors. An
/// invalid or expired token counts as no session.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(<AuthUser as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .ok())
    }
}

/// The session cookie holding `token`.
pub fn session_cookie(token: String, config: &JwtConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .build()
}

/// Expires the session cookie.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn claims(role: Role) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            email: "teacher@school.edu".to_string(),
            role,
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    #[test]
    fn test_user_id_matches_subject() {
        let claims = claims(Role::Teacher);
        let sub = claims.sub;
        let user = AuthUser(claims);
        assert_eq!(user.user_id().into_inner(), sub);
    }

    #[test]
    fn test_has_role() {
        let user = AuthUser(claims(Role::Parent));
        assert!(user.has_role(Role::Parent));
        assert!(!user.has_role(Role::Teacher));
    }

    #[test]
    fn test_session_cookie_is_http_only() {
        let config = JwtConfig {
            secret: "s".to_string(),
            access_token_expiry: 3600,
            secure_cookies: true,
        };
        let cookie = session_cookie("tok".to_string(), &config);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.value(), "tok");
    }
}
