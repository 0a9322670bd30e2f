use crate::{
    auth::CurrentIdentity,
    error::AppError,
    models::{CreateTaskRequest, TaskRange, TaskUpdate},
    state::AppState,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use validator::Validate;

/// Returns the username of the authenticated caller.
///
/// ## Responses:
/// - `200 OK`: the username as plain text.
/// - `401 Unauthorized`: no valid session.
#[get("/")]
pub async fn user_info(identity: CurrentIdentity) -> impl Responder {
    HttpResponse::Ok().body(identity.0.username().to_string())
}

/// Lists the caller's tasks in a 1-indexed, inclusive `from..=to` window.
///
/// ## Query Parameters:
/// - `from` (optional, default 1): first position to return.
/// - `to` (optional, default 10): last position to return.
///
/// Tasks are ordered by id, oldest first.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` (possibly empty).
/// - `400 Bad Request`: a bound is not positive or `from > to`.
/// - `401 Unauthorized`: no valid session, or the account behind it is gone.
#[get("/tasks")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    identity: CurrentIdentity,
    range: web::Query<TaskRange>,
) -> Result<impl Responder, AppError> {
    let user = state.auth.resolve_user(&identity.0).await?;
    let page = range.page()?;

    let tasks = state.tasks.find_by_owner(user.id, page).await?;
    log::debug!(
        "listing {} task(s) for user {} (offset {}, limit {})",
        tasks.len(),
        user.id,
        page.offset,
        page.limit
    );

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the caller.
///
/// ## Request Body:
/// - `title`: 1 to 200 characters.
/// - `deadline` (optional): ISO-8601 local timestamp.
/// - `context` (optional): up to 1000 characters.
///
/// ## Responses:
/// - `200 OK`: `Task {title} was created`.
/// - `401 Unauthorized`: no valid session.
/// - `422 Unprocessable Entity`: validation failed.
#[post("/new-task")]
pub async fn create_task(
    state: web::Data<AppState>,
    identity: CurrentIdentity,
    task_data: web::Json<CreateTaskRequest>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let user = state.auth.resolve_user(&identity.0).await?;

    let task = state.tasks.insert(user.id, task_data.into_inner()).await?;
    log::info!("user {} created task {}", user.id, task.id);

    Ok(HttpResponse::Ok().body(format!("Task {} was created", task.title)))
}

/// Applies a sparse update to one of the caller's tasks.
///
/// Only fields present in the body change. An empty body returns the task as is.
///
/// ## Responses:
/// - `200 OK`: the updated `Task` as JSON.
/// - `401 Unauthorized`: no valid session.
/// - `404 Not Found`: no such task, or it belongs to someone else.
/// - `422 Unprocessable Entity`: validation failed.
#[patch("/edit-task/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    identity: CurrentIdentity,
    task_id: web::Path<i64>,
    update: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    update.validate()?;
    let user = state.auth.resolve_user(&identity.0).await?;
    let task_id = task_id.into_inner();

    let mut task = match state.tasks.find_by_id(task_id).await? {
        Some(task) if task.user_id == user.id => task,
        _ => return Err(AppError::NotFound("Task not found".into())),
    };

    let update = update.into_inner();
    if update.is_empty() {
        return Ok(HttpResponse::Ok().json(task));
    }

    update.apply_to(&mut task);
    let saved = state.tasks.save(&task).await?;

    Ok(HttpResponse::Ok().json(saved))
}

/// Deletes one of the caller's tasks.
///
/// Deleting an id that does not exist (or is not the caller's) is not an error.
///
/// ## Responses:
/// - `200 OK`: `Successfully deleted`.
/// - `401 Unauthorized`: no valid session.
#[delete("/delete-task/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    identity: CurrentIdentity,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let user = state.auth.resolve_user(&identity.0).await?;
    let task_id = task_id.into_inner();

    let removed = state.tasks.delete(task_id, user.id).await?;
    if removed == 0 {
        log::debug!("delete of task {} by user {} matched nothing", task_id, user.id);
    }

    Ok(HttpResponse::Ok().body("Successfully deleted"))
}
