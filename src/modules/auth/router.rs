use axum::{Router, routing::get};

use crate::modules::auth::controller::{home, login, login_page, logout};
use crate::state::AppState;

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout).post(logout))
}
