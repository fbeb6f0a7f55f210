use crate::{
    auth::{CallerId, MessageResponse},
    error::{first_validation_message, AppError},
    models::{CreateTaskRequest, Task, TaskUpdate, UpdateTaskRequest},
    store::UserStore,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Task ids that do not parse can never match a stored task.
fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Task not found".into()))
}

/// Creates a new task at the end of the caller's list.
///
/// ## Request Body:
/// - `taskName`: The name of the task (required).
/// - `taskDescription` (optional): A description of the task.
///
/// ## Responses:
/// - `201 Created`: The new task, with status `"inprogress"` and `completed: false`.
/// - `400 Bad Request`: If `taskName` is missing or empty.
/// - `401 Unauthorized`: If the request carries no valid access token.
/// - `404 Not Found`: If the caller's user document does not exist.
#[post("")]
pub async fn create_task(
    caller: CallerId,
    store: web::Data<dyn UserStore>,
    payload: web::Json<CreateTaskRequest>,
) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(first_validation_message(&e)))?;
    let CreateTaskRequest {
        task_name,
        task_description,
    } = payload.into_inner();

    let task = Task::new(task_name.unwrap_or_default(), task_description);
    let task = store.push_task(caller.0, task).await?;
    log::debug!("user {} created task {}", caller.0, task.id);

    Ok(HttpResponse::Created().json(task))
}

/// Lists the caller's tasks in the order they were created.
#[get("")]
pub async fn get_tasks(
    caller: CallerId,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let user = store
        .find_by_id(caller.0)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(user.todo))
}

/// Replaces a task's name and description.
///
/// Identity is optional here. With an access token only the caller's own list is
/// searched; without one the task is matched by id alone.
///
/// ## Responses:
/// - `200 OK`: `{"message", "updatedTask"}`.
/// - `400 Bad Request`: If `name` is missing or empty.
/// - `404 Not Found`: If no task has this id.
#[put("/{id}")]
pub async fn update_task(
    caller: Option<CallerId>,
    store: web::Data<dyn UserStore>,
    path: web::Path<String>,
    payload: web::Json<UpdateTaskRequest>,
) -> Result<HttpResponse, AppError> {
    let task_id = parse_task_id(&path)?;
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(first_validation_message(&e)))?;
    let UpdateTaskRequest { name, description } = payload.into_inner();

    let update = TaskUpdate::Fields {
        name: name.unwrap_or_default(),
        description,
    };
    let task = store
        .update_task(caller.map(|c| c.0), task_id, update)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task updated successfully",
        "updatedTask": task
    })))
}

/// Sets a task's free-form status label.
#[put("/{id}/status/{new_status}")]
pub async fn update_status(
    caller: CallerId,
    store: web::Data<dyn UserStore>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (raw_id, new_status) = path.into_inner();
    let task_id = parse_task_id(&raw_id)?;

    let task = store
        .update_task(Some(caller.0), task_id, TaskUpdate::Status(new_status))
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task status updated successfully",
        "status": task
    })))
}

/// Flips a task's `completed` flag.
#[patch("/{id}/complete")]
pub async fn complete_task(
    caller: CallerId,
    store: web::Data<dyn UserStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let task_id = parse_task_id(&path)?;

    let task = store
        .update_task(Some(caller.0), task_id, TaskUpdate::ToggleCompleted)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task completion toggled",
        "task": task
    })))
}

/// Removes a task from the caller's list.
#[delete("/{id}")]
pub async fn delete_task(
    caller: CallerId,
    store: web::Data<dyn UserStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let task_id = parse_task_id(&path)?;
    store.remove_task(caller.0, task_id).await?;
    log::debug!("user {} deleted task {}", caller.0, task_id);

    Ok(HttpResponse::Ok().json(MessageResponse::new("Task deleted successfully")))
}
