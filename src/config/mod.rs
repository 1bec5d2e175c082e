//! Configuration for the SAMS server.
//!
//! Per-concern configuration lives in the `sams-config` and `sams-cache`
//! crates and is re-exported here; [`server`] covers the listener itself.
//!
//! # Modules
//!
//! - [`cors`]: allowed origins
//! - [`email`]: SMTP transport and sender identity
//! - [`jwt`]: session token signing
//! - [`otp`]: password-reset lifetimes
//! - [`server`]: bind address
//!
//! # Example
//!
//! ```ignore
//! use crate::config::jwt::JwtConfig;
//! use crate::config::server::ServerConfig;
//!
//! let jwt_config = JwtConfig::from_env();
//! let addr = ServerConfig::from_env().addr;
//! ```

pub mod server;

pub mod cors {
    pub use sams_config::CorsConfig;
}

pub mod email {
    pub use sams_config::EmailConfig;
}

pub mod jwt {
    pub use sams_config::JwtConfig;
}

pub mod otp {
    pub use sams_config::OtpConfig;
}

pub mod cache {
    pub use sams_cache::{CacheBackend, CacheConfig};
}
