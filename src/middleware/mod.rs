//! Request extractors and the access policy.
//!
//! # Modules
//!
//! - [`auth`]: the [`AuthUser`](auth::AuthUser) extractor and session cookie
//! - [`role`]: one extractor per role (`RequireTeacher`, `RequireParent`, ...)
//! - [`policy`]: role and ownership checks
//!
//! # Authentication Flow
//!
//! 1. Login sets an HTTP-only `sams_session` cookie holding a JWT; API
//!    clients may send the same token as `Authorization: Bearer <token>`
//! 2. `AuthUser` validates the token and exposes its claims
//! 3. Role extractors refuse other roles with a redirect to `/login`
//! 4. Handlers ask [`AccessPolicy`](policy::AccessPolicy) about ownership
//!    before touching a class or a student
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::policy::{AccessPolicy, ClassAction};
//! use crate::middleware::role::RequireTeacher;
//!
//! async fn roster(
//!     State(state): State<AppState>,
//!     RequireTeacher(user): RequireTeacher,
//!     Path(class_id): Path<ClassId>,
//! ) -> Result<Response, PageError> {
//!     let class = AccessPolicy::class_for_teacher(&state.db, &user, class_id, ClassAction::ViewAttendance)
//!         .await
//!         .or_redirect("/teacher/dashboard")?;
//!     // ...
//! }
//! ```

pub mod auth;
pub mod policy;
pub mod role;
