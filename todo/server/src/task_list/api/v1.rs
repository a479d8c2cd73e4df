use crate::task_list::web::TaskListState;
use crate::task_list::{FilterStatus, TaskList, TaskListServiceError};
use axum::{
    Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post, put},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for creating or renaming a task list.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TitlePayload {
    /// Title of the task list
    #[serde(default)]
    title: Option<String>,
}

/// Request body for creating or editing a task.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DescriptionPayload {
    /// Description of the task
    #[serde(default)]
    description: Option<String>,
}

/// Successful response carrying a single task list.
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskListResponse {
    success: bool,
    data: TaskList,
}

impl TaskListResponse {
    pub fn new(data: TaskList) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Successful response carrying several task lists.
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskListsResponse {
    success: bool,
    data: Vec<TaskList>,
}

impl TaskListsResponse {
    pub fn new(data: Vec<TaskList>) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Confirmation message returned after a deletion.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageJson {
    message: String,
}

/// Successful response carrying a confirmation message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    success: bool,
    data: MessageJson,
}

impl MessageResponse {
    pub fn new(message: String) -> Self {
        Self {
            success: true,
            data: MessageJson { message },
        }
    }
}

/// JSON response for API errors.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    success: bool,
    error: String,
}

impl ErrorResponse {
    pub fn new(error: String) -> Self {
        Self {
            success: false,
            error,
        }
    }
}

/// Errors returned by the task list API, each mapped to one status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required field was missing or a parameter was invalid.
    #[error("{0}")]
    BadRequest(String),
    /// The addressed task list or task does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Anything else. The message is generic; the cause is only logged.
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Maps a service error, using `failure` as the client-facing message for storage errors.
    fn from_service(err: TaskListServiceError, failure: &'static str) -> Self {
        match err {
            TaskListServiceError::MissingField(_) => ApiError::BadRequest(err.to_string()),
            TaskListServiceError::TaskListNotFound(_)
            | TaskListServiceError::TaskNotFound { .. } => ApiError::NotFound(err.to_string()),
            TaskListServiceError::Storage(source) => {
                tracing::error!("{}: {}", failure, source);
                ApiError::Internal(failure)
            }
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// Malformed or non-JSON bodies are treated like a body without the field.
fn title_from(payload: Result<Json<TitlePayload>, JsonRejection>) -> String {
    payload
        .map_err(|rejection| tracing::debug!("Unreadable title payload: {}", rejection))
        .ok()
        .and_then(|Json(payload)| payload.title)
        .unwrap_or_default()
}

fn description_from(payload: Result<Json<DescriptionPayload>, JsonRejection>) -> String {
    payload
        .map_err(|rejection| tracing::debug!("Unreadable description payload: {}", rejection))
        .ok()
        .and_then(|Json(payload)| payload.description)
        .unwrap_or_default()
}

// Path parameters that cannot be decoded still answer with the error envelope.
fn params_from<T>(path: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    path.map(|Path(params)| params)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Handler for GET /api/tasklists - Returns every task list.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasklists",
    responses(
        (status = 200, description = "All task lists in stored order", body = TaskListsResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Task lists"
)]
pub async fn get_task_lists_handler(
    State(state): State<TaskListState>,
) -> Result<Json<TaskListsResponse>, ApiError> {
    let task_lists = state
        .service
        .get_all_task_lists()
        .await
        .map_err(|err| ApiError::from_service(err, "Failed to get task lists"))?;
    Ok(Json(TaskListsResponse::new(task_lists)))
}

/// Handler for GET /api/tasklists/{id} - Returns a single task list.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasklists/{id}",
    params(("id" = String, Path, description = "Task list ID")),
    responses(
        (status = 200, description = "The task list", body = TaskListResponse),
        (status = 404, description = "Task list not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Task lists"
)]
pub async fn get_task_list_handler(
    State(state): State<TaskListState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let id = params_from(id)?;
    let task_list = state
        .service
        .get_task_list_by_id(&id)
        .await
        .map_err(|err| ApiError::from_service(err, "Failed to get task list"))?;
    Ok(Json(TaskListResponse::new(task_list)))
}

/// Handler for POST /api/tasklists - Creates a task list.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/api/tasklists",
    request_body = TitlePayload,
    responses(
        (status = 201, description = "Task list created", body = TaskListResponse),
        (status = 400, description = "Title is missing", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Task lists"
)]
pub async fn create_task_list_handler(
    State(state): State<TaskListState>,
    payload: Result<Json<TitlePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskListResponse>), ApiError> {
    let task_list = state
        .service
        .create_task_list(title_from(payload))
        .await
        .map_err(|err| ApiError::from_service(err, "Failed to create task list"))?;
    Ok((StatusCode::CREATED, Json(TaskListResponse::new(task_list))))
}

/// Handler for PUT /api/tasklists/{id} - Renames a task list.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    put,
    path = "/api/tasklists/{id}",
    params(("id" = String, Path, description = "Task list ID")),
    request_body = TitlePayload,
    responses(
        (status = 200, description = "Task list updated", body = TaskListResponse),
        (status = 400, description = "Title is missing", body = ErrorResponse),
        (status = 404, description = "Task list not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Task lists"
)]
pub async fn update_task_list_handler(
    State(state): State<TaskListState>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<TitlePayload>, JsonRejection>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let id = params_from(id)?;
    let task_list = state
        .service
        .update_task_list(&id, title_from(payload))
        .await
        .map_err(|err| ApiError::from_service(err, "Failed to update task list"))?;
    Ok(Json(TaskListResponse::new(task_list)))
}

/// Handler for DELETE /api/tasklists/{id} - Deletes a task list and its tasks.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/tasklists/{id}",
    params(("id" = String, Path, description = "Task list ID")),
    responses(
        (status = 200, description = "Task list deleted", body = MessageResponse),
        (status = 404, description = "Task list not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Task lists"
)]
pub async fn delete_task_list_handler(
    State(state): State<TaskListState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = params_from(id)?;
    state
        .service
        .delete_task_list(&id)
        .await
        .map_err(|err| ApiError::from_service(err, "Failed to delete task list"))?;
    Ok(Json(MessageResponse::new(format!(
        "Task list with ID {} deleted successfully",
        id
    ))))
}

/// Handler for GET /api/tasklists/filter/{status} - Returns the task lists matching a status.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasklists/filter/{status}",
    params(("status" = FilterStatus, Path, description = "One of all, completed or pending")),
    responses(
        (status = 200, description = "Matching task lists", body = TaskListsResponse),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Task lists"
)]
pub async fn filter_task_lists_handler(
    State(state): State<TaskListState>,
    status: Result<Path<String>, PathRejection>,
) -> Result<Json<TaskListsResponse>, ApiError> {
    let status = params_from(status)?
        .parse::<FilterStatus>()
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;
    let task_lists = state
        .service
        .filter_task_lists(status)
        .await
        .map_err(|err| ApiError::from_service(err, "Failed to filter task lists"))?;
    Ok(Json(TaskListsResponse::new(task_lists)))
}

/// Handler for POST /api/tasklists/{id}/tasks - Appends a task to a task list.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/api/tasklists/{id}/tasks",
    params(("id" = String, Path, description = "Task list ID")),
    request_body = DescriptionPayload,
    responses(
        (status = 201, description = "Task added", body = TaskListResponse),
        (status = 400, description = "Description is missing", body = ErrorResponse),
        (status = 404, description = "Task list not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn add_task_handler(
    State(state): State<TaskListState>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<DescriptionPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskListResponse>), ApiError> {
    let id = params_from(id)?;
    let task_list = state
        .service
        .add_task(&id, description_from(payload))
        .await
        .map_err(|err| ApiError::from_service(err, "Failed to add task"))?;
    Ok((StatusCode::CREATED, Json(TaskListResponse::new(task_list))))
}

/// Handler for PUT /api/tasklists/{id}/tasks/{task_id} - Edits a task's description.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    put,
    path = "/api/tasklists/{id}/tasks/{task_id}",
    params(
        ("id" = String, Path, description = "Task list ID"),
        ("task_id" = String, Path, description = "Task ID")
    ),
    request_body = DescriptionPayload,
    responses(
        (status = 200, description = "Task updated", body = TaskListResponse),
        (status = 400, description = "Description is missing", body = ErrorResponse),
        (status = 404, description = "Task list or task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<TaskListState>,
    ids: Result<Path<(String, String)>, PathRejection>,
    payload: Result<Json<DescriptionPayload>, JsonRejection>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let (id, task_id) = params_from(ids)?;
    let task_list = state
        .service
        .update_task(&id, &task_id, description_from(payload))
        .await
        .map_err(|err| ApiError::from_service(err, "Failed to update task"))?;
    Ok(Json(TaskListResponse::new(task_list)))
}

/// Handler for DELETE /api/tasklists/{id}/tasks/{task_id} - Removes a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/tasklists/{id}/tasks/{task_id}",
    params(
        ("id" = String, Path, description = "Task list ID"),
        ("task_id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task removed", body = TaskListResponse),
        (status = 404, description = "Task list or task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<TaskListState>,
    ids: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let (id, task_id) = params_from(ids)?;
    let task_list = state
        .service
        .delete_task(&id, &task_id)
        .await
        .map_err(|err| ApiError::from_service(err, "Failed to delete task"))?;
    Ok(Json(TaskListResponse::new(task_list)))
}

/// Handler for PATCH /api/tasklists/{id}/tasks/{task_id}/toggle - Flips a task's completion.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    patch,
    path = "/api/tasklists/{id}/tasks/{task_id}/toggle",
    params(
        ("id" = String, Path, description = "Task list ID"),
        ("task_id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task toggled", body = TaskListResponse),
        (status = 404, description = "Task list or task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn toggle_task_handler(
    State(state): State<TaskListState>,
    ids: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let (id, task_id) = params_from(ids)?;
    let task_list = state
        .service
        .toggle_task_completion(&id, &task_id)
        .await
        .map_err(|err| ApiError::from_service(err, "Failed to toggle task completion"))?;
    Ok(Json(TaskListResponse::new(task_list)))
}

/// Creates and returns the task list API router.
pub fn create_api_router(state: TaskListState) -> Router {
    Router::new()
        .route(
            "/api/tasklists",
            get(get_task_lists_handler).post(create_task_list_handler),
        )
        .route(
            "/api/tasklists/filter/{status}",
            get(filter_task_lists_handler),
        )
        .route(
            "/api/tasklists/{id}",
            get(get_task_list_handler)
                .put(update_task_list_handler)
                .delete(delete_task_list_handler),
        )
        .route("/api/tasklists/{id}/tasks", post(add_task_handler))
        .route(
            "/api/tasklists/{id}/tasks/{task_id}",
            put(update_task_handler).delete(delete_task_handler),
        )
        .route(
            "/api/tasklists/{id}/tasks/{task_id}/toggle",
            patch(toggle_task_handler),
        )
        .with_state(state)
}
