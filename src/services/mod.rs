//! Business operations behind the HTTP handlers. Handlers parse and respond; everything
//! else happens here against the [`crate::state::AppState`] store and mailer.

pub mod avatar;
pub mod tasks;
pub mod users;
