pub mod credentials;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};

use crate::models::User;

pub use credentials::{issue_token, revoke_all_tokens, revoke_token, verify_credentials};
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims};

/// Payload of `POST /users/login`.
///
/// Not validated beyond deserialization: a malformed email simply finds no account.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response of signup and login: the public user plus a fresh session token.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}
