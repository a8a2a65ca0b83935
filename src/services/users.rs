//! Account lifecycle: signup, login, profile edits, logout and self-deletion.

use validator::Validate;

use crate::auth::{
    hash_password, issue_token, revoke_all_tokens, revoke_token, verify_credentials,
    AuthResponse, LoginRequest,
};
use crate::error::AppError;
use crate::models::{SignupRequest, UpdateUserRequest, User};
use crate::notify::{dispatch, goodbye_email, welcome_email};
use crate::state::AppState;

/// Creates an account, sends the welcome email and opens the first session.
pub async fn signup(state: &AppState, input: SignupRequest) -> Result<AuthResponse, AppError> {
    let input = input.normalized();
    input.validate()?;

    let password_hash = hash_password(input.password.clone()).await?;
    let mut user = state
        .store
        .insert_user(&User::new(input, password_hash))
        .await?;
    log::info!("User {} signed up", user.id);

    dispatch(state.mailer.clone(), welcome_email(&user.email, &user.name));

    let token = issue_token(state.store.as_ref(), &state.jwt_secret, &mut user).await?;
    Ok(AuthResponse { user, token })
}

pub async fn login(state: &AppState, input: LoginRequest) -> Result<AuthResponse, AppError> {
    let mut user = verify_credentials(state.store.as_ref(), &input.email, &input.password).await?;
    let token = issue_token(state.store.as_ref(), &state.jwt_secret, &mut user).await?;
    log::info!("User {} logged in", user.id);
    Ok(AuthResponse { user, token })
}

pub async fn logout(state: &AppState, mut user: User, token: &str) -> Result<(), AppError> {
    revoke_token(state.store.as_ref(), &mut user, token).await?;
    log::info!("User {} logged out", user.id);
    Ok(())
}

pub async fn logout_all(state: &AppState, mut user: User) -> Result<(), AppError> {
    revoke_all_tokens(state.store.as_ref(), &mut user).await?;
    log::info!("User {} logged out of all sessions", user.id);
    Ok(())
}

/// Applies a profile patch. The password, when present, is re-hashed before saving.
pub async fn update_self(
    state: &AppState,
    mut user: User,
    patch: UpdateUserRequest,
) -> Result<User, AppError> {
    let patch = patch.normalized();
    patch.validate()?;

    if let Some(name) = patch.name {
        user.name = name;
    }
    if let Some(email) = patch.email {
        user.email = email;
    }
    if let Some(password) = patch.password {
        user.password_hash = hash_password(password).await?;
    }
    if let Some(age) = patch.age {
        user.age = age;
    }

    state.store.save_user(&user).await
}

/// Removes the caller together with their tasks, then says goodbye.
pub async fn delete_self(state: &AppState, user: User) -> Result<User, AppError> {
    let removed = state
        .store
        .delete_user_with_tasks(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    log::info!("User {} deleted with {} tasks", user.id, removed);

    dispatch(state.mailer.clone(), goodbye_email(&user.email, &user.name));
    Ok(user)
}
