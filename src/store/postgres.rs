use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{Task, TaskListQuery, User};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, age, tokens, avatar, created_at, updated_at";
const TASK_COLUMNS: &str = "id, description, completed, owner_id, created_at, updated_at";

/// PostgreSQL-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {}", e)))
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &User) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (id, name, email, password_hash, age, tokens, avatar, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {USER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.age)
            .bind(&user.tokens)
            .bind(&user.avatar)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_token(&self, id: Uuid, token: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND $2 = ANY(tokens)");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> Result<User, AppError> {
        let sql = format!(
            "UPDATE users \
             SET name = $1, email = $2, password_hash = $3, age = $4, tokens = $5, updated_at = NOW() \
             WHERE id = $6 \
             RETURNING {USER_COLUMNS}"
        );
        let saved = sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.age)
            .bind(&user.tokens)
            .bind(user.id)
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn set_avatar(&self, id: Uuid, avatar: Option<Vec<u8>>) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET avatar = $1, updated_at = NOW() WHERE id = $2")
            .bind(avatar)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, task: &Task) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks (id, description, completed, owner_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {TASK_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.description)
            .bind(task.completed)
            .bind(task.owner)
            .bind(task.created_at)
            .bind(task.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn list_tasks(&self, owner: Uuid, query: &TaskListQuery) -> Result<Vec<Task>, AppError> {
        // Ownership is always the first condition; the rest is appended from the query.
        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1");
        let mut param_count = 2;

        if query.completed.is_some() {
            sql.push_str(&format!(" AND completed = ${}", param_count));
            param_count += 1;
        }

        // Column and direction come from closed enums, never from raw input.
        match query.sort {
            Some(sort) => sql.push_str(&format!(
                " ORDER BY {} {}, created_at ASC",
                sort.field.column(),
                sort.direction.keyword()
            )),
            None => sql.push_str(" ORDER BY created_at ASC"),
        }

        if query.limit.is_some() {
            sql.push_str(&format!(" LIMIT ${}", param_count));
            param_count += 1;
        }
        if query.skip.is_some() {
            sql.push_str(&format!(" OFFSET ${}", param_count));
        }

        let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(owner);
        if let Some(completed) = query.completed {
            query_builder = query_builder.bind(completed);
        }
        if let Some(limit) = query.limit {
            query_builder = query_builder.bind(limit);
        }
        if let Some(skip) = query.skip {
            query_builder = query_builder.bind(skip);
        }

        let tasks = query_builder.fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    async fn find_task(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND owner_id = $2");
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn save_task(&self, task: &Task) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "UPDATE tasks SET description = $1, completed = $2, updated_at = NOW() \
             WHERE id = $3 AND owner_id = $4 \
             RETURNING {TASK_COLUMNS}"
        );
        let saved = sqlx::query_as::<_, Task>(&sql)
            .bind(&task.description)
            .bind(task.completed)
            .bind(task.id)
            .bind(task.owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn delete_task(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "DELETE FROM tasks WHERE id = $1 AND owner_id = $2 RETURNING {TASK_COLUMNS}"
        );
        let deleted = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(deleted)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn delete_user_with_tasks(&self, id: Uuid) -> Result<Option<u64>, AppError> {
        let mut tx = self.pool.begin().await?;

        // Row lock first: concurrent task inserts for this user wait on it, then fail
        // their foreign key check once we commit.
        let locked = sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let tasks = sqlx::query("DELETE FROM tasks WHERE owner_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(tasks.rows_affected()))
    }
}
