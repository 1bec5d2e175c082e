//! Page rendering seam.
//!
//! Handlers describe a page as a template name plus JSON bindings. The
//! renderer decides what the browser receives; the default one returns the
//! bindings as JSON so a separate front end (or a test) can consume them.

use std::fmt;

use axum::Json;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use sams_core::Role;
use serde_json::{Value, json};

use crate::middleware::auth::AuthUser;
use crate::modules::notifications::service::NotificationService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::flash;

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub template: &'static str,
    pub context: Value,
}

impl Page {
    pub fn new(template: &'static str, context: Value) -> Self {
        let context = match context {
            Value::Object(_) => context,
            other => json!({ "data": other }),
        };
        Self { template, context }
    }

    pub fn bind(mut self, key: &str, value: impl serde::Serialize) -> Self {
        if let Value::Object(map) = &mut self.context {
            map.insert(
                key.to_string(),
                serde_json::to_value(value).unwrap_or(Value::Null),
            );
        }
        self
    }
}

pub trait PageRenderer: Send + Sync + fmt::Debug {
    fn render(&self, page: Page) -> Response;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonPageRenderer;

impl PageRenderer for JsonPageRenderer {
    fn render(&self, page: Page) -> Response {
        Json(json!({
            "template": page.template,
            "context": page.context,
        }))
        .into_response()
    }
}

/// Renders `page` with the bindings every page gets: pending flash
/// messages, and for parents the unread notification count.
pub async fn render_page(
    state: &AppState,
    jar: CookieJar,
    viewer: Option<&AuthUser>,
    page: Page,
) -> Result<Response, AppError> {
    let (jar, messages) = flash::take(jar);
    let mut page = page.bind("messages", messages);

    if let Some(viewer) = viewer {
        page = page.bind("user", json!({ "email": viewer.email(), "role": viewer.role() }));
        if viewer.role() == Role::Parent {
            let unread = NotificationService::unread_count(&state.db, viewer.user_id()).await?;
            page = page.bind("navbar_unread_count", unread);
        }
    }

    Ok((jar, state.renderer.render(page)).into_response())
}
