use crate::modules::attendance::controller::{
    attendance_summary, edit_attendance, edit_attendance_page, submit_attendance,
    submit_attendance_in_slot, take_attendance_in_slot_page, take_attendance_page,
};
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn init_attendance_router() -> Router<AppState> {
    Router::new()
        .route(
            "/take-attendance/{class_id}/{date}",
            get(take_attendance_page).post(submit_attendance),
        )
        .route(
            "/take-attendance/{class_id}/{date}/{time_slot_id}",
            get(take_attendance_in_slot_page).post(submit_attendance_in_slot),
        )
        .route("/attendance-summary/{class_id}", get(attendance_summary))
        .route(
            "/edit-attendance/{student_id}/{class_id}",
            get(edit_attendance_page).post(edit_attendance),
        )
}
