//! Password-reset lifetimes.
//!
//! # Environment Variables
//!
//! - `OTP_TTL_SECONDS`: how long an issued code stays valid (default: `300`)
//! - `RESET_SESSION_TTL_SECONDS`: how long the pending-reset marker survives
//!   in the caller's session (default: `1800`)

use std::time::Duration;

use crate::env_or;

#[derive(Clone, Debug)]
pub struct OtpConfig {
    pub code_ttl: Duration,
    pub session_ttl: Duration,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_ttl: Duration::from_secs(300),
            session_ttl: Duration::from_secs(1800),
        }
    }
}

impl OtpConfig {
    pub fn from_env() -> Self {
        Self {
            code_ttl: Duration::from_secs(env_or("OTP_TTL_SECONDS", 300)),
            session_ttl: Duration::from_secs(env_or("RESET_SESSION_TTL_SECONDS", 1800)),
        }
    }

    /// Whole minutes, as quoted in the reset email.
    pub fn code_ttl_minutes(&self) -> u64 {
        self.code_ttl.as_secs().div_ceil(60)
    }
}
