use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use sams_models::LoginForm;
use serde_json::json;
use tracing::instrument;

use crate::middleware::auth::{AuthUser, clear_session_cookie, session_cookie};
use crate::modules::auth::service::AuthService;
use crate::state::AppState;
use crate::utils::errors::{LOGIN_PATH, OrRedirect, PageError};
use crate::utils::flash::{self, FlashLevel};
use crate::utils::render::{Page, render_page};
use crate::validator::ValidatedForm;

/// Sends visitors to their dashboard, or to the login page.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 303, description = "Redirected to the role's dashboard or to /login")),
    tag = "Authentication"
)]
#[instrument(skip(user))]
pub async fn home(user: Option<AuthUser>) -> Redirect {
    match user {
        Some(user) => Redirect::to(user.role().home_path()),
        None => Redirect::to(LOGIN_PATH),
    }
}

#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 200, description = "Login form"),
        (status = 303, description = "Already logged in; redirected to the dashboard")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, user))]
pub async fn login_page(
    State(state): State<AppState>,
    jar: CookieJar,
    user: Option<AuthUser>,
) -> Result<Response, PageError> {
    if let Some(user) = user {
        return Ok(Redirect::to(user.role().home_path()).into_response());
    }

    Ok(render_page(&state, jar, None, Page::new("login.html", json!({}))).await?)
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Session cookie set and redirected to the dashboard, or refused")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, form))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedForm(form): ValidatedForm<LoginForm>,
) -> Result<Response, PageError> {
    let outcome = AuthService::login(&state.db, &form.email, &form.password, &state.jwt_config)
        .await
        .or_redirect(LOGIN_PATH)?;

    let jar = jar.add(session_cookie(outcome.access_token, &state.jwt_config));
    Ok((jar, Redirect::to(outcome.role.home_path())).into_response())
}

#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 303, description = "Session cleared; redirected to /login")),
    tag = "Authentication"
)]
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> Response {
    let jar = jar.remove(clear_session_cookie());
    flash::redirect(jar, FlashLevel::Info, "You have been logged out.", LOGIN_PATH)
}
