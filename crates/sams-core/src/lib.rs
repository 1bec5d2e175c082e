//! # SAMS Core
//!
//! Core types shared by every SAMS crate.
//!
//! - [`errors`]: the closed set of error kinds and [`AppError`]
//! - [`password`]: bcrypt hashing and verification
//! - [`roles`]: the closed [`Role`] set used by the access policy
//! - [`serde`]: helpers for optional form fields
//!
//! # Example
//!
//! ```ignore
//! use sams_core::errors::AppError;
//! use sams_core::password::{hash_password, verify_password};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Class not found"));
//! let hash = hash_password("secure_password")?;
//! ```

pub mod errors;
pub mod password;
pub mod roles;
pub mod serde;

pub use errors::{AppError, ErrorKind};
pub use password::{hash_password, verify_password};
pub use roles::Role;
