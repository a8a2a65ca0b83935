use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{CreateTaskRequest, TaskQuery, UpdateTaskRequest},
    services::tasks,
    state::AppState,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use uuid::Uuid;

/// Lists the caller's tasks.
///
/// ## Query Parameters:
/// - `completed` (optional): `true` for completed tasks, any other value for open ones.
/// - `sortBy` (optional): `<field>_<asc|desc>` where field is `createdAt`, `updatedAt`,
///   `description` or `completed`. Unknown fields are ignored.
/// - `limit`, `skip` (optional): positive integers; anything else is ignored.
///
/// Without `sortBy` tasks come back in creation order.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
    query: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let tasks = tasks::list_tasks(&state, identity.user.id, &query).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the caller. An `owner` in the body is ignored.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
    body: web::Json<CreateTaskRequest>,
) -> Result<impl Responder, AppError> {
    let task = tasks::create_task(&state, identity.user.id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = tasks::get_task(&state, identity.user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates `description` and/or `completed`. Responds `201 Created` with the task.
#[patch("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateTaskRequest>,
) -> Result<impl Responder, AppError> {
    let task = tasks::update_task(
        &state,
        identity.user.id,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(task))
}

/// Deletes the task and returns it.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = tasks::delete_task(&state, identity.user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}
