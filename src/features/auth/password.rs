//! bcrypt password hashing.
//!
//! Hashing is CPU-bound, so the async helpers move the work onto the blocking
//! thread pool instead of stalling the runtime.

use crate::core::error::{AppError, Result};

/// Hash a raw password with the given bcrypt cost
pub fn hash_password(raw_password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(raw_password, cost).map_err(|e| {
        tracing::error!("Failed to hash password: {:?}", e);
        AppError::Internal("Failed to hash password".to_string())
    })
}

/// Check a raw password against a stored hash; a malformed hash never matches
pub fn verify_password(raw_password: &str, password_hash: &str) -> bool {
    match bcrypt::verify(raw_password, password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!("Stored password hash could not be verified: {:?}", e);
            false
        }
    }
}

pub async fn hash_password_blocking(raw_password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&raw_password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

pub async fn verify_password_blocking(raw_password: String, password_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&raw_password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))
}
