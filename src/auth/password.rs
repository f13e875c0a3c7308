//! Credential hashing
//!
//! Credentials are stored as Argon2id PHC strings and verified with the
//! constant-time comparison built into `PasswordVerifier`.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;

use crate::error::{ExpenseAuthError, Result};

const SALT_LEN: usize = 16;

/// Hash a raw credential into a self-describing PHC string
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| ExpenseAuthError::Internal(format!("Failed to encode salt: {}", e)))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ExpenseAuthError::Internal(format!("Failed to hash credential: {}", e)))
}

/// Check a raw credential against a stored hash.
///
/// An unparseable stored hash is reported as a mismatch, never as an error,
/// so a corrupt record cannot be logged into.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::error!("Stored credential hash is unreadable: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// [`hash_password`] on the blocking thread pool
pub async fn hash_password_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ExpenseAuthError::Internal(format!("Hashing task failed: {}", e)))?
}

/// [`verify_password`] on the blocking thread pool
pub async fn verify_password_blocking(password: String, stored_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ExpenseAuthError::Internal(format!("Verification task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("pw1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("pw1"));
        assert!(verify_password("pw1", &hash));
        assert!(!verify_password("pw2", &hash));
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same", &a));
        assert!(verify_password("same", &b));
    }

    #[test]
    fn test_corrupt_hash_never_verifies() {
        assert!(!verify_password("pw", "pw"));
        assert!(!verify_password("", ""));
    }

    #[tokio::test]
    async fn test_blocking_variants_agree() {
        let hash = hash_password_blocking("pw1".to_string()).await.unwrap();
        assert!(verify_password_blocking("pw1".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password_blocking("pw2".to_string(), hash).await.unwrap());
    }
}
