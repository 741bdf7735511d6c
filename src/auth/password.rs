//! Password hashing and verification using bcrypt.
//!
//! bcrypt is CPU-bound, so both operations run on the blocking thread pool.

use crate::error::AppError;

/// Hash a plaintext password with a fresh random salt.
///
/// Returns the modular-crypt string (`$2b$<cost>$...`) that is stored on the account.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password = password.to_owned();

    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Check a plaintext password against a stored hash.
///
/// A hash that cannot be parsed counts as a mismatch.
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();

    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {e}")))?;

    match outcome {
        Ok(valid) => Ok(valid),
        Err(e) => {
            tracing::warn!("stored password hash is unusable: {e}");
            Ok(false)
        }
    }
}
