pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{error, web, HttpRequest};

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Malformed bodies, including keys a patch does not allow, become `400 {"error": ...}`.
fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

/// Ids that are not UUIDs cannot name a task, so they are plain not-found.
fn path_error(_err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::NotFound("Task not found".into()).into()
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .service(health::health)
        .service(users::create_user)
        .service(users::login)
        .service(users::logout)
        .service(users::logout_all)
        .service(users::get_me)
        .service(users::update_me)
        .service(users::delete_me)
        .service(users::upload_avatar)
        .service(users::delete_avatar)
        .service(users::get_avatar)
        .service(
            web::scope("/tasks")
                .app_data(web::PathConfig::default().error_handler(path_error))
                .wrap(AuthMiddleware)
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}
