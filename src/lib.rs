#![doc = "The `taskmate` library crate."]
#![doc = ""]
#![doc = "Accounts with token sessions, owner-scoped task lists and profile pictures behind an"]
#![doc = "actix-web JSON API. The binary (`main.rs`) wires configuration, storage and the mailer"]
#![doc = "into [`state::AppState`] and mounts [`routes::config`]."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
