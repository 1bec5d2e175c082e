//! Role extractors.
//!
//! Each extractor authenticates the request and then insists on one role.
//! A user with the wrong role is sent back to the login page with
//! `$message` flashed.

/// Declares an extractor that only admits users holding `$role`.
#[macro_export]
macro_rules! require_role {
    ($name:ident, $role:expr, $message:literal) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = $crate::utils::errors::PageError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user = <$crate::middleware::auth::AuthUser as axum::extract::FromRequestParts<
                    $crate::state::AppState,
                >>::from_request_parts(parts, state)
                .await?;

                $crate::middleware::policy::AccessPolicy::require_role(&auth_user, $role, $message)?;

                Ok($name(auth_user))
            }
        }
    };
}

require_role!(
    RequireTeacher,
    sams_core::Role::Teacher,
    "Only teachers can access this page."
);
require_role!(
    RequireStudent,
    sams_core::Role::Student,
    "Only students can access this page."
);
require_role!(
    RequireParent,
    sams_core::Role::Parent,
    "Only parents can access this page."
);
require_role!(
    RequireAdmin,
    sams_core::Role::Admin,
    "Only administrators can access this page."
);
