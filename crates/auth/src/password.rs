//! Argon2id password hashing.
//!
//! Hashes are PHC strings, so the parameters and salt travel with the hash.
//! Both operations are CPU-bound and run on the blocking pool.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::RngCore;

use crate::error::AuthError;

fn generate_salt() -> Result<SaltString, AuthError> {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    SaltString::encode_b64(&bytes).map_err(|e| AuthError::Crypto(e.to_string()))
}

fn hash_blocking(password: &str) -> Result<String, AuthError> {
    let salt = generate_salt()?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Crypto(e.to_string()))
}

fn verify_blocking(password: &str, phc: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(phc).map_err(|e| AuthError::Crypto(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(e.to_string())),
    }
}

/// Hashes `password` with a fresh random salt.
pub async fn hash_password(password: &str) -> Result<String, AuthError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_blocking(&password))
        .await
        .map_err(|e| AuthError::Crypto(e.to_string()))?
}

/// Returns true when `password` matches the stored PHC hash.
pub async fn verify_password(password: &str, phc: &str) -> Result<bool, AuthError> {
    let password = password.to_string();
    let phc = phc.to_string();
    tokio::task::spawn_blocking(move || verify_blocking(&password, &phc))
        .await
        .map_err(|e| AuthError::Crypto(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("correct horse").await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).await.unwrap());
        assert!(!verify_password("wrong horse", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_same_password_gets_different_salts() {
        let a = hash_password("password123").await.unwrap();
        let b = hash_password("password123").await.unwrap();

        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_garbage_hash_is_an_error() {
        assert!(matches!(
            verify_password("password123", "not-a-phc-string").await,
            Err(AuthError::Crypto(_))
        ));
    }
}
