use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use sams_models::{
    AttendanceSelectionForm, AttendanceSummary, ClassAttendanceSummary, ClassRef,
    EditAttendanceForm, ForgotPasswordForm, LoginForm, NotificationView, NotifyParentForm,
    ResetPasswordForm, RosterEntry, StudentProfile, VerifyOtpForm,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::home,
        crate::modules::auth::controller::login_page,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::logout,
        crate::modules::password_reset::controller::forgot_password_page,
        crate::modules::password_reset::controller::forgot_password,
        crate::modules::password_reset::controller::verify_otp_page,
        crate::modules::password_reset::controller::verify_otp,
        crate::modules::password_reset::controller::reset_password_page,
        crate::modules::password_reset::controller::reset_password,
        crate::modules::dashboards::controller::admin_dashboard,
        crate::modules::dashboards::controller::teacher_dashboard,
        crate::modules::dashboards::controller::select_class,
        crate::modules::dashboards::controller::student_dashboard,
        crate::modules::dashboards::controller::student_datewise,
        crate::modules::dashboards::controller::parent_dashboard,
        crate::modules::dashboards::controller::parent_datewise,
        crate::modules::attendance::controller::take_attendance_page,
        crate::modules::attendance::controller::submit_attendance,
        crate::modules::attendance::controller::take_attendance_in_slot_page,
        crate::modules::attendance::controller::submit_attendance_in_slot,
        crate::modules::attendance::controller::attendance_summary,
        crate::modules::attendance::controller::edit_attendance_page,
        crate::modules::attendance::controller::edit_attendance,
        crate::modules::notifications::controller::alert_parent_page,
        crate::modules::notifications::controller::alert_parent,
        crate::modules::notifications::controller::notify_parent_page,
        crate::modules::notifications::controller::notify_parent,
        crate::modules::notifications::controller::inbox,
        crate::modules::notifications::controller::mark_read,
        crate::modules::reports::controller::class_report,
        crate::modules::reports::controller::combined_report,
    ),
    components(
        schemas(
            LoginForm,
            ForgotPasswordForm,
            VerifyOtpForm,
            ResetPasswordForm,
            AttendanceSelectionForm,
            EditAttendanceForm,
            NotifyParentForm,
            AttendanceSummary,
            ClassAttendanceSummary,
            ClassRef,
            RosterEntry,
            StudentProfile,
            NotificationView,
        )
    ),
    modifiers(&SecurityAddon),
    security(
        ("session_cookie" = []),
        ("bearer_auth" = [])
    ),
    tags(
        (name = "Authentication", description = "Login, logout and the landing redirect"),
        (name = "Password reset", description = "Recovery by emailed one-time code"),
        (name = "Dashboards", description = "Role-specific landing pages"),
        (name = "Attendance", description = "Taking, summarizing and correcting attendance"),
        (name = "Notifications", description = "Low-attendance alerts and the parent inbox"),
        (name = "Reports", description = "PDF attendance reports")
    ),
    info(
        title = "SAMS",
        version = "0.1.0",
        description = "School attendance management. Pages are form posts that answer with a redirect and a flash message.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    crate::middleware::auth::SESSION_COOKIE,
                ))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_page_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/login",
            "/teacher/dashboard",
            "/take-attendance/{class_id}/{date}",
            "/take-attendance/{class_id}/{date}/{time_slot_id}",
            "/teacher/notify/{student_id}/{class_id}",
            "/teacher/alert/{student_id}/{class_id}",
            "/parent/notifications/{notification_id}/read",
            "/parent-dashboard/{student_id}/all-classes/pdf",
            "/verify-otp",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{} missing", path);
        }
    }
}
