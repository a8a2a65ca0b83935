use actix_multipart::Multipart;
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};

use crate::auth::{AuthMiddleware, AuthenticatedUser, LoginRequest};
use crate::error::AppError;
use crate::models::{SignupRequest, UpdateUserRequest};
use crate::services::{avatar, users};
use crate::state::AppState;

/// Registers a new account.
///
/// ## Responses:
/// - `201 Created`: `{ "user": User, "token": String }`.
/// - `400 Bad Request`: invalid fields or an email that is already registered.
#[post("/users")]
pub async fn create_user(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    let response = users::signup(&state, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/// Opens a new session. Wrong email and wrong password are both `400 "Unable to login"`.
#[post("/users/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let response = users::login(&state, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Revokes the token used for this request only.
#[post("/users/logout", wrap = "AuthMiddleware")]
pub async fn logout(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    users::logout(&state, identity.user, &identity.token).await?;
    Ok(HttpResponse::Ok().finish())
}

#[post("/users/logoutAll", wrap = "AuthMiddleware")]
pub async fn logout_all(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    users::logout_all(&state, identity.user).await?;
    Ok(HttpResponse::Ok().finish())
}

#[get("/users/me", wrap = "AuthMiddleware")]
pub async fn get_me(identity: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(identity.user)
}

/// Updates `name`, `email`, `password` or `age`. Any other key rejects the request.
#[patch("/users/me", wrap = "AuthMiddleware")]
pub async fn update_me(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
    body: web::Json<UpdateUserRequest>,
) -> Result<impl Responder, AppError> {
    let user = users::update_self(&state, identity.user, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Deletes the caller and every task they own, returning the deleted user.
#[delete("/users/me", wrap = "AuthMiddleware")]
pub async fn delete_me(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = users::delete_self(&state, identity.user).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Accepts a multipart body with an `avatar` file (.jpg, .jpeg or .png, at most 1 MB).
#[post("/users/me/avatar", wrap = "AuthMiddleware")]
pub async fn upload_avatar(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
    mut payload: Multipart,
) -> Result<impl Responder, AppError> {
    let bytes = avatar::read_upload(&mut payload).await?;
    avatar::upload_avatar(&state, identity.user.id, bytes).await?;
    Ok(HttpResponse::Ok().finish())
}

#[delete("/users/me/avatar", wrap = "AuthMiddleware")]
pub async fn delete_avatar(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    avatar::delete_avatar(&state, identity.user.id).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Public. Serves the stored PNG, or 400 when there is nothing to serve.
#[get("/users/{id}/avatar")]
pub async fn get_avatar(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let png = avatar::fetch_avatar(&state, path.as_str()).await?;
    Ok(HttpResponse::Ok().content_type("image/png").body(png))
}
