//! One-shot messages carried across a redirect in a cookie.
//!
//! The cookie holds a hex-encoded JSON list so its value never needs
//! quoting. Reading the messages removes the cookie.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "sams_flash";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

fn decode(value: &str) -> Vec<FlashMessage> {
    hex::decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

fn encode(messages: &[FlashMessage]) -> String {
    hex::encode(serde_json::to_vec(messages).unwrap_or_default())
}

fn pending(jar: &CookieJar) -> Vec<FlashMessage> {
    jar.get(FLASH_COOKIE)
        .map(|cookie| decode(cookie.value()))
        .unwrap_or_default()
}

/// Queues a message for the next page the browser loads.
pub fn push(jar: CookieJar, level: FlashLevel, text: impl Into<String>) -> CookieJar {
    let mut messages = pending(&jar);
    messages.push(FlashMessage {
        level,
        text: text.into(),
    });

    let cookie = Cookie::build((FLASH_COOKIE, encode(&messages)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    jar.add(cookie)
}

/// Drains queued messages.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<FlashMessage>) {
    let messages = pending(&jar);
    if messages.is_empty() {
        return (jar, messages);
    }

    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, messages)
}

/// Queues a message and sends the browser to `to`.
pub fn redirect(jar: CookieJar, level: FlashLevel, text: impl Into<String>, to: &str) -> Response {
    (push(jar, level, text), Redirect::to(to)).into_response()
}
