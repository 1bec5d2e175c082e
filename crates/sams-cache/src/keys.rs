//! Key layout.
//!
//! Emails are hashed before they become part of a key so that addresses
//! never appear in Redis key listings.

use sha2::{Digest, Sha256};

fn build_key(prefix: &str, parts: &[&str]) -> String {
    format!("{}:{}", prefix, parts.join(":"))
}

fn email_digest(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    hex::encode(&digest[..16])
}

/// The one-time code issued to `email`.
pub fn otp(prefix: &str, email: &str) -> String {
    build_key(prefix, &["otp", &email_digest(email)])
}

/// The pending-reset marker for a browser session.
pub fn reset_session(prefix: &str, session_id: &str) -> String {
    build_key(prefix, &["reset_session", session_id])
}
