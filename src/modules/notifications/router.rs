use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::notifications::controller::{
    alert_parent, alert_parent_page, inbox, mark_read, notify_parent, notify_parent_page,
};
use crate::state::AppState;

pub fn init_notifications_router() -> Router<AppState> {
    Router::new()
        .route(
            "/teacher/alert/{student_id}/{class_id}",
            get(alert_parent_page).post(alert_parent),
        )
        .route(
            "/teacher/notify/{student_id}/{class_id}",
            get(notify_parent_page).post(notify_parent),
        )
        .route("/parent/notifications", get(inbox))
        .route("/parent/notifications/{notification_id}/read", post(mark_read))
}
