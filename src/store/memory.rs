use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{SortDirection, Task, TaskListQuery, TaskSortField, User};

/// In-process store with the same semantics as [`super::PgStore`].
///
/// Tasks are kept in insertion order, which is the order listings fall back to when no
/// sort is requested.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    tasks: RwLock<Vec<Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Uuid) -> bool {
    users
        .values()
        .any(|user| user.id != except && user.email == email)
}

fn compare(a: &Task, b: &Task, field: TaskSortField) -> Ordering {
    match field {
        TaskSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        TaskSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        TaskSortField::Description => a.description.cmp(&b.description),
        TaskSortField::Completed => a.completed.cmp(&b.completed),
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, user.id) {
            return Err(AppError::BadRequest("Email already registered".into()));
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_user_by_token(&self, id: Uuid, token: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .get(&id)
            .filter(|user| user.tokens.iter().any(|t| t == token))
            .cloned())
    }

    async fn save_user(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, user.id) {
            return Err(AppError::BadRequest("Email already registered".into()));
        }
        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        stored.name = user.name.clone();
        stored.email = user.email.clone();
        stored.password_hash = user.password_hash.clone();
        stored.age = user.age;
        stored.tokens = user.tokens.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn set_avatar(&self, id: Uuid, avatar: Option<Vec<u8>>) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let stored = users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        stored.avatar = avatar;
        stored.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, task: &Task) -> Result<Task, AppError> {
        self.tasks.write().await.push(task.clone());
        Ok(task.clone())
    }

    async fn list_tasks(&self, owner: Uuid, query: &TaskListQuery) -> Result<Vec<Task>, AppError> {
        let mut tasks: Vec<Task> = self
            .tasks
            .read()
            .await
            .iter()
            .filter(|task| task.owner == owner)
            .filter(|task| query.completed.map_or(true, |c| task.completed == c))
            .cloned()
            .collect();

        if let Some(sort) = query.sort {
            tasks.sort_by(|a, b| {
                let ordering = compare(a, b, sort.field);
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        let skip = query.skip.unwrap_or(0) as usize;
        let limit = query.limit.map_or(usize::MAX, |n| n as usize);
        Ok(tasks.into_iter().skip(skip).take(limit).collect())
    }

    async fn find_task(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, AppError> {
        Ok(self
            .tasks
            .read()
            .await
            .iter()
            .find(|task| task.id == id && task.owner == owner)
            .cloned())
    }

    async fn save_task(&self, task: &Task) -> Result<Option<Task>, AppError> {
        let mut tasks = self.tasks.write().await;
        let stored = tasks
            .iter_mut()
            .find(|t| t.id == task.id && t.owner == task.owner);
        Ok(stored.map(|stored| {
            stored.description = task.description.clone();
            stored.completed = task.completed;
            stored.updated_at = Utc::now();
            stored.clone()
        }))
    }

    async fn delete_task(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, AppError> {
        let mut tasks = self.tasks.write().await;
        let position = tasks
            .iter()
            .position(|task| task.id == id && task.owner == owner);
        Ok(position.map(|index| tasks.remove(index)))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn delete_user_with_tasks(&self, id: Uuid) -> Result<Option<u64>, AppError> {
        // Users before tasks, the only place both locks are held.
        let mut users = self.users.write().await;
        let mut tasks = self.tasks.write().await;
        if users.remove(&id).is_none() {
            return Ok(None);
        }
        let before = tasks.len();
        tasks.retain(|task| task.owner != id);
        Ok(Some((before - tasks.len()) as u64))
    }
}
