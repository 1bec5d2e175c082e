//! # SAMS Auth
//!
//! Session tokens for logged-in users.
//!
//! - [`claims`]: what a token asserts about its holder
//! - [`jwt`]: signing and verification
//!
//! The token carries the user's [`Role`](sams_core::Role), so role checks
//! need no database lookup. Ownership checks (is this my class, is this my
//! child) still go to the database.
//!
//! # Example
//!
//! ```ignore
//! use sams_auth::{create_access_token, verify_token};
//! use sams_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "teacher@school.edu", Role::Teacher, &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.role, Role::Teacher);
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
