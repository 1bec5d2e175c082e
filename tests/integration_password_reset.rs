mod common;

use axum::http::StatusCode;
use common::{TEST_PASSWORD, TestApp, create_test_user, flash_messages, location, set_cookie};
use sams::modules::password_reset::controller::RESET_COOKIE;
use sams_cache::ExpiringStore;
use sams_cache::keys;
use sams_core::Role;
use sams_models::User;
use sqlx::PgPool;

/// Requests a code for `user` and returns the reset cookie and the code.
async fn request_code(app: &TestApp, user: &User) -> (String, String) {
    let response = app
        .post_form(
            "/forgot-password",
            None,
            &format!("email={}", user.email.as_str()),
        )
        .await;
    assert_eq!(location(&response), "/verify-otp");

    let session = set_cookie(&response, RESET_COOKIE).expect("reset cookie");
    let code = app
        .store
        .get(&keys::otp("test", user.email.as_str()))
        .await
        .unwrap()
        .expect("stored code");

    (format!("{}={}", RESET_COOKIE, session), code)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_email_is_refused(pool: PgPool) {
    let app = TestApp::new(pool).await;

    let response = app
        .post_form("/forgot-password", None, "email=nobody%40test.com")
        .await;

    assert_eq!(location(&response), "/forgot-password");
    assert_eq!(
        flash_messages(&response),
        vec![("error".to_string(), "No user found with this email.".to_string())]
    );
    assert!(app.mailer.sent().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_full_reset_flow(pool: PgPool) {
    let app = TestApp::new(pool.clone()).await;
    let user = create_test_user(&pool, Role::Parent).await;

    let (cookie, code) = request_code(&app, &user).await;
    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "SAMS Password Reset OTP");
    assert!(sent[0].body.contains(&code));

    let verified = app
        .post_form("/verify-otp", Some(&cookie), &format!("otp={}", code))
        .await;
    assert_eq!(location(&verified), "/reset-password");

    let form_page = app.get("/reset-password", Some(&cookie)).await;
    assert_eq!(form_page.status(), StatusCode::OK);

    let reset = app
        .post_form(
            "/reset-password",
            Some(&cookie),
            "new_password=brandnew456&confirm_password=brandnew456",
        )
        .await;
    assert_eq!(location(&reset), "/login");
    assert_eq!(
        flash_messages(&reset)[0].1,
        "Password reset successful. You can now login."
    );

    let old = app
        .post_form(
            "/login",
            None,
            &format!("email={}&password={}", user.email.as_str(), TEST_PASSWORD),
        )
        .await;
    assert_eq!(location(&old), "/login");

    let new = app
        .post_form(
            "/login",
            None,
            &format!("email={}&password=brandnew456", user.email.as_str()),
        )
        .await;
    assert_eq!(location(&new), "/parent/dashboard");

    // The code is single-use.
    let again = app
        .post_form("/verify-otp", Some(&cookie), &format!("otp={}", code))
        .await;
    assert_eq!(location(&again), "/forgot-password");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_wrong_code_stays_on_verify(pool: PgPool) {
    let app = TestApp::new(pool.clone()).await;
    let user = create_test_user(&pool, Role::Teacher).await;
    let (cookie, code) = request_code(&app, &user).await;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let response = app
        .post_form("/verify-otp", Some(&cookie), &format!("otp={}", wrong))
        .await;

    assert_eq!(location(&response), "/verify-otp");
    assert_eq!(flash_messages(&response)[0].1, "Invalid or expired OTP.");

    // Not verified, so the password form is still closed.
    let page = app.get("/reset-password", Some(&cookie)).await;
    assert_eq!(location(&page), "/verify-otp");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reset_before_verify_is_refused(pool: PgPool) {
    let app = TestApp::new(pool.clone()).await;
    let user = create_test_user(&pool, Role::Student).await;
    let (cookie, _) = request_code(&app, &user).await;

    let response = app
        .post_form(
            "/reset-password",
            Some(&cookie),
            "new_password=brandnew456&confirm_password=brandnew456",
        )
        .await;

    assert_eq!(location(&response), "/verify-otp");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_mismatched_passwords(pool: PgPool) {
    let app = TestApp::new(pool.clone()).await;
    let user = create_test_user(&pool, Role::Student).await;
    let (cookie, code) = request_code(&app, &user).await;
    app.post_form("/verify-otp", Some(&cookie), &format!("otp={}", code))
        .await;

    let response = app
        .post_form(
            "/reset-password",
            Some(&cookie),
            "new_password=brandnew456&confirm_password=different789",
        )
        .await;

    assert_eq!(location(&response), "/reset-password");
    assert_eq!(flash_messages(&response)[0].1, "Passwords do not match.");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_pages_without_session_go_back_to_start(pool: PgPool) {
    let app = TestApp::new(pool).await;

    for uri in ["/verify-otp", "/reset-password"] {
        let response = app.get(uri, None).await;
        assert_eq!(location(&response), "/forgot-password");
        assert_eq!(
            flash_messages(&response)[0].1,
            "Your password reset session has expired. Please request a new code."
        );
    }
}
