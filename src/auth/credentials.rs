//! Login and session bookkeeping.
//!
//! A session is valid while its token string is in the owner's `tokens` list. Issuing
//! and revoking are read-modify-write on that list without a version check, so two
//! concurrent logins or logouts for the same user can overwrite each other's change.

use crate::auth::password::verify_password;
use crate::auth::token::generate_token;
use crate::error::AppError;
use crate::models::user::{normalize_email, User};
use crate::store::Store;

/// Looks the user up by email and checks the password.
///
/// The password is trimmed, as it was at signup. Unknown email and wrong password fail
/// identically with `InvalidCredentials`.
pub async fn verify_credentials(
    store: &dyn Store,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let user = store
        .find_user_by_email(&normalize_email(email))
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if verify_password(password.trim().to_string(), user.password_hash.clone()).await? {
        Ok(user)
    } else {
        Err(AppError::InvalidCredentials)
    }
}

/// Signs a new token for `user`, appends it to the token list and persists the user.
pub async fn issue_token(
    store: &dyn Store,
    secret: &str,
    user: &mut User,
) -> Result<String, AppError> {
    let token = generate_token(user.id, secret)?;
    user.tokens.push(token.clone());
    let saved = store.save_user(user).await?;
    *user = saved;
    Ok(token)
}

/// Removes one token (logout from the current device).
pub async fn revoke_token(store: &dyn Store, user: &mut User, token: &str) -> Result<(), AppError> {
    user.tokens.retain(|t| t != token);
    let saved = store.save_user(user).await?;
    *user = saved;
    Ok(())
}

/// Removes every token (logout everywhere).
pub async fn revoke_all_tokens(store: &dyn Store, user: &mut User) -> Result<(), AppError> {
    user.tokens.clear();
    let saved = store.save_user(user).await?;
    *user = saved;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::models::SignupRequest;
    use crate::store::{MemoryStore, UserStore};

    const SECRET: &str = "credentials-test-secret";

    async fn seeded() -> (MemoryStore, User) {
        let store = MemoryStore::new();
        let hash = hash_password("longpass1".to_string()).await.unwrap();
        let user = User::new(
            SignupRequest {
                name: "Dacs".to_string(),
                email: "dacs@example.com".to_string(),
                password: "longpass1".to_string(),
                age: None,
            },
            hash,
        );
        let user = store.insert_user(&user).await.unwrap();
        (store, user)
    }

    #[actix_rt::test]
    async fn test_verify_credentials() {
        let (store, user) = seeded().await;

        let found = verify_credentials(&store, " DACS@example.com ", "longpass1")
            .await
            .unwrap();
        assert_eq!(found.id, user.id);

        let padded = verify_credentials(&store, "dacs@example.com", "  longpass1 ")
            .await
            .unwrap();
        assert_eq!(padded.id, user.id);

        assert!(matches!(
            verify_credentials(&store, "dacs@example.com", "wrongpass1").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            verify_credentials(&store, "nobody@example.com", "longpass1").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[actix_rt::test]
    async fn test_issue_and_revoke_tokens() {
        let (store, mut user) = seeded().await;

        let first = issue_token(&store, SECRET, &mut user).await.unwrap();
        let second = issue_token(&store, SECRET, &mut user).await.unwrap();
        assert_eq!(user.tokens, vec![first.clone(), second.clone()]);

        revoke_token(&store, &mut user, &first).await.unwrap();
        assert!(store.find_user_by_token(user.id, &first).await.unwrap().is_none());
        assert!(store.find_user_by_token(user.id, &second).await.unwrap().is_some());

        revoke_all_tokens(&store, &mut user).await.unwrap();
        assert!(user.tokens.is_empty());
        assert!(store.find_user_by_token(user.id, &second).await.unwrap().is_none());
    }
}
