use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A user account as stored in the database.
///
/// The password hash, the session token list and the avatar bytes never leave the
/// server: they are skipped when the user is serialized into a response.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// bcrypt hash of the password. Never plaintext.
    #[serde(skip)]
    pub password_hash: String,
    pub age: i32,
    /// Active session tokens, oldest first.
    #[serde(skip)]
    pub tokens: Vec<String>,
    /// 250x250 PNG profile picture.
    #[serde(skip)]
    pub avatar: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Builds a fresh account record. `password_hash` must already be hashed.
    pub fn new(input: SignupRequest, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            password_hash,
            age: input.age.unwrap_or(0),
            tokens: Vec::new(),
            avatar: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Payload of `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(
        length(min = 7, message = "Password must be at least 7 characters"),
        custom = "validate_password_word"
    )]
    pub password: String,
    #[validate(range(min = 0, message = "Age must be positive"))]
    pub age: Option<i32>,
}

impl SignupRequest {
    /// Trims name, email and password and lowercases the email, as stored.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            password: self.password.trim().to_string(),
            ..self
        }
    }
}

/// Payload of `PATCH /users/me`.
///
/// Only these four fields may be changed; any other key in the body fails
/// deserialization and the whole request is rejected.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,
    #[validate(
        length(min = 7, message = "Password must be at least 7 characters"),
        custom = "validate_password_word"
    )]
    pub password: Option<String>,
    #[validate(range(min = 0, message = "Age must be positive"))]
    pub age: Option<i32>,
}

impl UpdateUserRequest {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|name| name.trim().to_string()),
            email: self.email.as_deref().map(normalize_email),
            password: self.password.map(|password| password.trim().to_string()),
            ..self
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_password_word(password: &str) -> Result<(), ValidationError> {
    if password.to_lowercase().contains("password") {
        let mut error = ValidationError::new("password_word");
        error.message = Some("Password cannot contain \"password\"".into());
        return Err(error);
    }
    Ok(())
}
