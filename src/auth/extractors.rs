use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::User;

/// The caller resolved by `AuthMiddleware`: the user record and the exact token used,
/// so logout can revoke just that token.
///
/// Only usable on routes wrapped by `AuthMiddleware`; anywhere else extraction fails
/// with 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub token: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(identity) => ready(Ok(identity)),
            None => {
                let err = AppError::Unauthorized("Please authenticate.".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
