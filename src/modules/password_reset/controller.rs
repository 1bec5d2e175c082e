use anyhow::anyhow;
use axum::{extract::State, response::Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use sams_models::{ForgotPasswordForm, ResetPasswordForm, VerifyOtpForm};
use serde_json::json;
use tracing::instrument;

use crate::modules::password_reset::service::{PasswordResetService, PendingReset};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::errors::{AppError, LOGIN_PATH, OrRedirect, PageError};
use crate::utils::flash::{self, FlashLevel};
use crate::utils::render::{Page, render_page};
use crate::validator::ValidatedForm;

pub const RESET_COOKIE: &str = "sams_reset";

const FORGOT_PATH: &str = "/forgot-password";
const VERIFY_PATH: &str = "/verify-otp";
const RESET_PATH: &str = "/reset-password";

fn flow(state: &AppState) -> PasswordResetService<'_> {
    PasswordResetService::new(state.store.as_ref(), &state.cache_prefix, &state.otp_config)
}

fn reset_cookie(session_id: String, state: &AppState) -> Cookie<'static> {
    Cookie::build((RESET_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .secure(state.jwt_config.secure_cookies)
        .same_site(SameSite::Lax)
        .build()
}

/// The session id and its pending reset, or a redirect back to the start.
async fn require_pending(
    state: &AppState,
    jar: &CookieJar,
) -> Result<(String, PendingReset), PageError> {
    let expired = || {
        PageError::new(
            AppError::forbidden(anyhow!(
                "Your password reset session has expired. Please request a new code."
            )),
            FORGOT_PATH,
        )
    };

    let session_id = jar
        .get(RESET_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(expired)?;
    let pending = flow(state)
        .pending(&session_id)
        .await
        .or_redirect(FORGOT_PATH)?
        .ok_or_else(expired)?;

    Ok((session_id, pending))
}

#[utoipa::path(
    get,
    path = "/forgot-password",
    responses((status = 200, description = "Email form")),
    tag = "Password reset"
)]
#[instrument(skip(state, jar))]
pub async fn forgot_password_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, PageError> {
    Ok(render_page(&state, jar, None, Page::new("forgot_password.html", json!({}))).await?)
}

#[utoipa::path(
    post,
    path = "/forgot-password",
    request_body(content = ForgotPasswordForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Code sent and redirected to /verify-otp, or refused")
    ),
    tag = "Password reset"
)]
#[instrument(skip(state, jar, form))]
pub async fn forgot_password(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedForm(form): ValidatedForm<ForgotPasswordForm>,
) -> Result<Response, PageError> {
    let user = UserService::find_credentials(&state.db, &form.email)
        .await
        .or_redirect(FORGOT_PATH)?
        .ok_or_else(|| AppError::not_found(anyhow!("No user found with this email.")))
        .or_redirect(FORGOT_PATH)?;

    let session_id = flow(&state)
        .issue(&user.email, state.mailer.as_ref())
        .await
        .or_redirect(FORGOT_PATH)?;

    let jar = jar.add(reset_cookie(session_id, &state));
    Ok(flash::redirect(
        jar,
        FlashLevel::Info,
        "An OTP has been sent to your email.",
        VERIFY_PATH,
    ))
}

#[utoipa::path(
    get,
    path = "/verify-otp",
    responses(
        (status = 200, description = "Code form"),
        (status = 303, description = "No pending reset; redirected to /forgot-password")
    ),
    tag = "Password reset"
)]
#[instrument(skip(state, jar))]
pub async fn verify_otp_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let (_, pending) = require_pending(&state, &jar).await?;
    let page = Page::new("verify_otp.html", json!({ "email": pending.email }));
    Ok(render_page(&state, jar, None, page).await?)
}

#[utoipa::path(
    post,
    path = "/verify-otp",
    request_body(content = VerifyOtpForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Verified and redirected to /reset-password, or refused")
    ),
    tag = "Password reset"
)]
#[instrument(skip(state, jar, form))]
pub async fn verify_otp(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedForm(form): ValidatedForm<VerifyOtpForm>,
) -> Result<Response, PageError> {
    let (session_id, pending) = require_pending(&state, &jar).await?;

    flow(&state)
        .verify(&session_id, &pending, &form.otp)
        .await
        .or_redirect(VERIFY_PATH)?;

    Ok(flash::redirect(
        jar,
        FlashLevel::Success,
        "OTP verified. Choose a new password.",
        RESET_PATH,
    ))
}

#[utoipa::path(
    get,
    path = "/reset-password",
    responses(
        (status = 200, description = "New password form"),
        (status = 303, description = "Session not verified; redirected")
    ),
    tag = "Password reset"
)]
#[instrument(skip(state, jar))]
pub async fn reset_password_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let (_, pending) = require_pending(&state, &jar).await?;
    if !pending.verified {
        return Err(PageError::new(
            AppError::forbidden(anyhow!("Please verify the code from your email first.")),
            VERIFY_PATH,
        ));
    }

    let page = Page::new("reset_password.html", json!({ "email": pending.email }));
    Ok(render_page(&state, jar, None, page).await?)
}

#[utoipa::path(
    post,
    path = "/reset-password",
    request_body(content = ResetPasswordForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Password changed and redirected to /login, or refused")
    ),
    tag = "Password reset"
)]
#[instrument(skip(state, jar, form))]
pub async fn reset_password(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedForm(form): ValidatedForm<ResetPasswordForm>,
) -> Result<Response, PageError> {
    let (session_id, pending) = require_pending(&state, &jar).await?;
    let back = if pending.verified { RESET_PATH } else { VERIFY_PATH };

    flow(&state)
        .reset(&state.db, &session_id, &pending, &form)
        .await
        .or_redirect(back)?;

    let jar = jar.remove(Cookie::build(RESET_COOKIE).path("/"));
    Ok(flash::redirect(
        jar,
        FlashLevel::Success,
        "Password reset successful. You can now login.",
        LOGIN_PATH,
    ))
}
