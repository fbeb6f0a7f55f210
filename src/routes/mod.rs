pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

use crate::error::{json_payload_error, AppError};

/// Mounts the API routes. Expected to be configured under `/api`.
///
/// Unreadable auth bodies are refused like any other bad credentials input
/// (`200` + message); unreadable task bodies are `400`s.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                json_payload_error(err, "Email is required", AppError::Rejected)
            }))
            .service(auth::register)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::profile),
    )
    .service(
        web::scope("/tasks")
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                json_payload_error(err, "Task name is required", AppError::BadRequest)
            }))
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::update_status)
            .service(tasks::complete_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    );
}
