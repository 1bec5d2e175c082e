//! bcrypt password hashing.

use anyhow::anyhow;
use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal(anyhow!("Failed to hash password: {}", e)))
}

/// Returns `Ok(false)` on a mismatch; a malformed stored hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::internal(anyhow!("Failed to verify password: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, GENERIC_FAILURE_MESSAGE};

    #[test]
    fn test_stored_hash_accepts_only_the_original_password() {
        let stored = hash_password("Correct-Horse-42").unwrap();

        assert!(stored.starts_with("$2b$"));
        assert!(verify_password("Correct-Horse-42", &stored).unwrap());
        assert!(!verify_password("correct-horse-42", &stored).unwrap());
        assert!(!verify_password("", &stored).unwrap());
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let first = hash_password("password123").unwrap();
        let second = hash_password("password123").unwrap();

        assert_ne!(first, second);
        assert!(verify_password("password123", &second).unwrap());
    }

    #[test]
    fn test_non_ascii_password() {
        let stored = hash_password("Zoë-Ødegård").unwrap();
        assert!(verify_password("Zoë-Ødegård", &stored).unwrap());
        assert!(!verify_password("Zoe-Odegard", &stored).unwrap());
    }

    #[test]
    fn test_malformed_stored_hash_is_internal() {
        let err = verify_password("password123", "plaintext-left-in-db").unwrap_err();

        assert_eq!(err.kind, ErrorKind::Internal);
        assert!(err.error.to_string().starts_with("Failed to verify password"));
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }
}
