use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the claims encoded within a session token.
///
/// There is no `exp` claim. A token lives until it is removed from the
/// owner's token list by a logout.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token, the user's id.
    pub sub: Uuid,
    /// Unique token id, so two tokens issued in the same second still differ.
    pub jti: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
}

/// Signs a new session token for `user_id` with HS256.
pub fn generate_token(user_id: Uuid, secret: &str) -> Result<String, AppError> {
    let claims = Claims {
        sub: user_id,
        jti: Uuid::new_v4(),
        iat: chrono::Utc::now().timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Verifies the signature of `token` and decodes its claims.
///
/// This only proves the token was issued by us. Whether it is still live is decided by
/// the owner's token list, which the authentication middleware checks next.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    validation.validate_exp = false;
    validation.set_required_spec_claims::<&str>(&[]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}
