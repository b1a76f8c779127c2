use crate::task::{InvalidStatus, Task, TaskInput, TaskRepository, TaskServiceError, TaskStatus};
use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

const LIST_FAILED: &str = "An error occurred while retrieving tasks";
const GET_FAILED: &str = "An error occurred while retrieving the task";
const CREATE_FAILED: &str = "An error occurred while creating the task";
const UPDATE_FAILED: &str = "An error occurred while updating the task";
const DELETE_FAILED: &str = "An error occurred while deleting the task";

#[derive(Clone)]
pub struct TaskState {
    pub repository: Arc<dyn TaskRepository>,
}

/// JSON request body for creating or updating a task.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TaskPayload {
    /// Name of the task, must not be blank
    #[serde(default)]
    name: Option<String>,
    /// Optional free-form description
    #[serde(default)]
    description: Option<String>,
    /// `Not Started`, `In Progress` or `Completed`; blank means `Not Started`
    #[serde(default)]
    status: Option<String>,
}

impl TaskPayload {
    /// Checks the name, then the status, and returns the fields to store.
    pub fn validate(self) -> Result<TaskInput, TaskApiError> {
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(TaskApiError::BadRequest("Task name is required".to_string())),
        };
        let status = match self.status.as_deref() {
            None => TaskStatus::default(),
            Some(status) if status.trim().is_empty() => TaskStatus::default(),
            Some(status) => status.parse::<TaskStatus>()?,
        };
        Ok(TaskInput {
            name,
            description: self.description,
            status,
        })
    }
}

/// JSON body for every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// What went wrong
    message: String,
    /// Underlying cause, only present on server errors
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Errors produced at the task handler boundary.
#[derive(Debug, thiserror::Error)]
pub enum TaskApiError {
    /// Malformed body or a field that breaks a rule.
    #[error("{0}")]
    BadRequest(String),
    #[error("Task with id {0} not found")]
    NotFound(i64),
    /// Anything the store reported, tagged with the operation that failed.
    #[error("{context}")]
    Internal {
        context: &'static str,
        #[source]
        source: TaskServiceError,
    },
}

impl TaskApiError {
    fn internal(context: &'static str) -> impl FnOnce(TaskServiceError) -> Self {
        move |source| Self::Internal { context, source }
    }
}

impl From<JsonRejection> for TaskApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for TaskApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<InvalidStatus> for TaskApiError {
    fn from(err: InvalidStatus) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl IntoResponse for TaskApiError {
    fn into_response(self) -> Response {
        let (status_code, body) = match self {
            TaskApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    message,
                    error: None,
                },
            ),
            err @ TaskApiError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    message: err.to_string(),
                    error: None,
                },
            ),
            TaskApiError::Internal { context, source } => {
                tracing::error!("{}: {}", context, source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        message: context.to_string(),
                        error: Some(source.to_string()),
                    },
                )
            }
        };
        (status_code, Json(body)).into_response()
    }
}

/// Reads back a row that was just written.
async fn read_back(
    repository: &dyn TaskRepository,
    id: i64,
    context: &'static str,
) -> Result<Task, TaskApiError> {
    repository
        .find_task(id)
        .await
        .and_then(|task| task.ok_or(TaskServiceError::Vanished(id)))
        .map_err(TaskApiError::internal(context))
}

/// Handler for GET /tasks - Returns every task, newest first.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks",
    responses(
        (status = 200, description = "All tasks, newest first", body = [Task]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn list_tasks_handler(
    State(state): State<Arc<TaskState>>,
) -> Result<Json<Vec<Task>>, TaskApiError> {
    let tasks = state
        .repository
        .list_tasks()
        .await
        .map_err(TaskApiError::internal(LIST_FAILED))?;
    Ok(Json(tasks))
}

/// Handler for GET /tasks/{id} - Returns a single task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "The task", body = Task),
        (status = 404, description = "No task with this id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(state): State<Arc<TaskState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Task>, TaskApiError> {
    let Path(id) = path?;
    let task = state
        .repository
        .find_task(id)
        .await
        .map_err(TaskApiError::internal(GET_FAILED))?
        .ok_or(TaskApiError::NotFound(id))?;
    Ok(Json(task))
}

/// Handler for POST /tasks - Creates a task.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = TaskPayload,
    responses(
        (status = 201, description = "Task created", body = Task,
            headers(("location" = String, description = "Path of the new task"))),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<Task>), TaskApiError> {
    let Json(payload) = payload?;
    let input = payload.validate()?;

    let id = state
        .repository
        .insert_task(input)
        .await
        .map_err(TaskApiError::internal(CREATE_FAILED))?;
    let task = read_back(state.repository.as_ref(), id, CREATE_FAILED).await?;

    let location = format!("/tasks/{}", task.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(task)))
}

/// Handler for PUT /tasks/{id} - Overwrites name, description and status.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    params(("id" = i64, Path, description = "Task id")),
    request_body = TaskPayload,
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "No task with this id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<Json<Task>, TaskApiError> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    let input = payload.validate()?;

    let exists = state
        .repository
        .task_exists(id)
        .await
        .map_err(TaskApiError::internal(UPDATE_FAILED))?;
    if !exists {
        return Err(TaskApiError::NotFound(id));
    }

    state
        .repository
        .update_task(id, input)
        .await
        .map_err(TaskApiError::internal(UPDATE_FAILED))?;
    let task = read_back(state.repository.as_ref(), id, UPDATE_FAILED).await?;
    Ok(Json(task))
}

/// Handler for DELETE /tasks/{id} - Removes a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "No task with this id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, TaskApiError> {
    let Path(id) = path?;
    let exists = state
        .repository
        .task_exists(id)
        .await
        .map_err(TaskApiError::internal(DELETE_FAILED))?;
    if !exists {
        return Err(TaskApiError::NotFound(id));
    }

    state
        .repository
        .delete_task(id)
        .await
        .map_err(TaskApiError::internal(DELETE_FAILED))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates and returns the tasks API router.
pub fn create_task_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks_handler).post(create_task_handler))
        .route(
            "/tasks/{id}",
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .with_state(state)
}
