//! Persistence layer.
//!
//! Services talk to storage only through the [`UserStore`] and [`TaskStore`] traits.
//! [`PgStore`] keeps everything in PostgreSQL; [`MemoryStore`] keeps it in process and
//! backs the test suite and database-less development runs.
//!
//! Every task operation takes the owner id and filters on it inside the query itself,
//! so a task that exists but belongs to someone else looks exactly like a missing one.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Task, TaskListQuery, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user. Fails with `BadRequest` if the email is taken.
    async fn insert_user(&self, user: &User) -> Result<User, AppError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Finds the user with `id` only if `token` is still in its token list.
    async fn find_user_by_token(&self, id: Uuid, token: &str) -> Result<Option<User>, AppError>;

    /// Writes back name, email, password hash, age and token list, bumping `updated_at`.
    /// The avatar is left alone; see [`UserStore::set_avatar`].
    async fn save_user(&self, user: &User) -> Result<User, AppError>;

    async fn set_avatar(&self, id: Uuid, avatar: Option<Vec<u8>>) -> Result<(), AppError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, task: &Task) -> Result<Task, AppError>;

    async fn list_tasks(&self, owner: Uuid, query: &TaskListQuery) -> Result<Vec<Task>, AppError>;

    async fn find_task(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, AppError>;

    /// Writes back description and completion, bumping `updated_at`.
    /// Returns `None` if the task is gone or not owned by `task.owner`.
    async fn save_task(&self, task: &Task) -> Result<Option<Task>, AppError>;

    /// Deletes and returns the task in one step.
    async fn delete_task(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, AppError>;
}

/// Everything the application needs from storage, plus the operations that span
/// both tables.
#[async_trait]
pub trait Store: UserStore + TaskStore {
    /// Cheap round trip used by the health check.
    async fn ping(&self) -> Result<(), AppError>;

    /// Deletes the user and every task it owns as one unit. Returns the number of tasks
    /// removed, or `None` (with nothing deleted) when no such user exists.
    async fn delete_user_with_tasks(&self, id: Uuid) -> Result<Option<u64>, AppError>;
}
