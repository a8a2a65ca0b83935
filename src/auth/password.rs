use crate::error::AppError;
use bcrypt::{hash, verify};

/// bcrypt work factor. Kept low so signup and login stay fast.
pub const HASH_COST: u32 = 8;

/// Hashes `password` on the blocking pool.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash(password, HASH_COST))
        .await?
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Compares `password` with a stored bcrypt hash on the blocking pool.
pub async fn verify_password(password: String, hashed_password: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify(password, &hashed_password))
        .await?
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}
