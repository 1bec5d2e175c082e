//! # SAMS Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: access token signing
//! - [`cors`]: allowed origins
//! - [`email`]: SMTP transport and sender identity
//! - [`otp`]: password-reset code and session lifetimes
//!
//! # Example
//!
//! ```ignore
//! use sams_config::{EmailConfig, JwtConfig, OtpConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let otp_config = OtpConfig::from_env();
//! ```

pub mod cors;
pub mod email;
pub mod jwt;
pub mod otp;

pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparseable environment value");
            default
        }),
        Err(_) => default,
    }
}

pub use cors::CorsConfig;
pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use otp::OtpConfig;
