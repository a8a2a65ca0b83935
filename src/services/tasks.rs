//! Owner-scoped task operations. A task that belongs to someone else is reported
//! exactly like a missing one.

use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{CreateTaskRequest, Task, TaskQuery, UpdateTaskRequest};
use crate::state::AppState;

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

pub async fn create_task(
    state: &AppState,
    owner: Uuid,
    input: CreateTaskRequest,
) -> Result<Task, AppError> {
    let input = input.normalized();
    input.validate()?;
    state.store.insert_task(&Task::new(input, owner)).await
}

pub async fn list_tasks(
    state: &AppState,
    owner: Uuid,
    query: &TaskQuery,
) -> Result<Vec<Task>, AppError> {
    state.store.list_tasks(owner, &query.parse()).await
}

pub async fn get_task(state: &AppState, owner: Uuid, id: Uuid) -> Result<Task, AppError> {
    state
        .store
        .find_task(owner, id)
        .await?
        .ok_or_else(task_not_found)
}

/// Validates the patch first, then loads, applies and saves.
pub async fn update_task(
    state: &AppState,
    owner: Uuid,
    id: Uuid,
    patch: UpdateTaskRequest,
) -> Result<Task, AppError> {
    let patch = patch.normalized();
    patch.validate()?;

    let mut task = get_task(state, owner, id).await?;
    patch.apply(&mut task);
    state
        .store
        .save_task(&task)
        .await?
        .ok_or_else(task_not_found)
}

pub async fn delete_task(state: &AppState, owner: Uuid, id: Uuid) -> Result<Task, AppError> {
    state
        .store
        .delete_task(owner, id)
        .await?
        .ok_or_else(task_not_found)
}
