//! Credential hashing and verification (Argon2id)

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    HashingFailed(String),

    #[error("invalid password hash format: {0}")]
    InvalidHashFormat(String),

    #[error("failed to verify password: {0}")]
    VerificationFailed(String),
}

/// Hash a password into a PHC string suitable for storage
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))
}

/// Whether a stored credential is a PHC hash rather than a legacy plaintext value
pub fn is_hashed(stored: &str) -> bool {
    stored.starts_with("$argon2")
}

/// Check `password` against a stored credential.
///
/// Values that are not PHC hashes come from stores written before hashing was
/// introduced and are compared as plaintext.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    if !is_hashed(stored) {
        return Ok(constant_time_eq(password.as_bytes(), stored.as_bytes()));
    }

    let parsed =
        PasswordHash::new(stored).map_err(|e| PasswordError::InvalidHashFormat(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
