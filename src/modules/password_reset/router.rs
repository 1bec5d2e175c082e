use axum::{Router, routing::get};

use crate::modules::password_reset::controller::{
    forgot_password, forgot_password_page, reset_password, reset_password_page, verify_otp,
    verify_otp_page,
};
use crate::state::AppState;

pub fn init_password_reset_router() -> Router<AppState> {
    Router::new()
        .route("/forgot-password", get(forgot_password_page).post(forgot_password))
        .route("/verify-otp", get(verify_otp_page).post(verify_otp))
        .route("/reset-password", get(reset_password_page).post(reset_password))
}
