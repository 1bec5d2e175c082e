use axum::{Router, routing::get};

use crate::modules::reports::controller::{class_report, combined_report};
use crate::state::AppState;

pub fn init_reports_router() -> Router<AppState> {
    Router::new()
        .route(
            "/parent-dashboard/{student_id}/class/{class_id}/pdf",
            get(class_report),
        )
        .route(
            "/parent-dashboard/{student_id}/all-classes/pdf",
            get(combined_report),
        )
}
