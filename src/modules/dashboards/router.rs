use axum::{Router, routing::get};

use crate::modules::dashboards::controller::{
    admin_dashboard, parent_dashboard, parent_datewise, select_class, student_dashboard,
    student_datewise, teacher_dashboard,
};
use crate::state::AppState;

pub fn init_dashboards_router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin_dashboard))
        .route("/teacher/dashboard", get(teacher_dashboard).post(select_class))
        .route("/student/dashboard", get(student_dashboard))
        .route("/student/datewise/{student_id}", get(student_datewise))
        .route("/parent/dashboard", get(parent_dashboard))
        .route("/parent/datewise/{student_id}", get(parent_datewise))
}
