use crate::task_list::{
    FilterStatus, InvalidFilterStatus, TaskList, TaskListService, TaskListServiceError,
};
use askama::Template;
use axum::{
    Form, Router,
    extract::{
        Path, Query, State,
        rejection::{FormRejection, PathRejection},
    },
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

/// Shared state for every task list route, API and HTML alike.
#[derive(Clone)]
pub struct TaskListState {
    pub service: Arc<TaskListService>,
}

impl TaskListState {
    pub fn new(service: TaskListService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IndexQuery {
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TitleForm {
    #[serde(default)]
    title: String,
}

impl TitleForm {
    fn title(self) -> String {
        self.title.trim().to_string()
    }
}

#[derive(Debug, Deserialize)]
struct DescriptionForm {
    #[serde(default)]
    description: String,
}

impl DescriptionForm {
    fn description(self) -> String {
        self.description.trim().to_string()
    }
}

/// Custom error type for the HTML handlers.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Represents an error during template rendering.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
    /// Represents a failed task list operation.
    #[error("{0}")]
    Service(#[from] TaskListServiceError),
    /// The `status` query parameter was not a known filter.
    #[error("{0}")]
    InvalidFilter(#[from] InvalidFilterStatus),
    /// The submitted form could not be read.
    #[error("{0}")]
    InvalidForm(#[from] FormRejection),
    #[error("{0}")]
    InvalidPath(#[from] PathRejection),
}

impl WebError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            WebError::Service(TaskListServiceError::MissingField(_))
            | WebError::InvalidFilter(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            WebError::InvalidForm(rejection) => (rejection.status(), rejection.body_text()),
            WebError::InvalidPath(rejection) => (rejection.status(), rejection.body_text()),
            WebError::Service(TaskListServiceError::TaskListNotFound(_))
            | WebError::Service(TaskListServiceError::TaskNotFound { .. }) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            _ => {
                tracing::error!("Request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred while processing your request. Please try again later."
                        .to_string(),
                )
            }
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status_code, user_facing_error_message) = self.status_and_message();
        let template = ErrorTemplate {
            heading: status_code.canonical_reason().unwrap_or("Error"),
            message: &user_facing_error_message,
        };
        match template.render() {
            Ok(html) => (status_code, Html(html)).into_response(),
            Err(err) => {
                tracing::error!("Failed to render error page: {}", err);
                (status_code, user_facing_error_message).into_response()
            }
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    heading: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "task_lists/index.html")]
struct IndexTemplate {
    task_lists: Vec<TaskList>,
    status: FilterStatus,
    filters: [FilterStatus; 3],
}

impl IndexTemplate {
    pub fn new(task_lists: Vec<TaskList>, status: FilterStatus) -> Self {
        Self {
            task_lists,
            status,
            filters: FilterStatus::VALUES,
        }
    }
}

/// Handler for the / endpoint that renders the (optionally filtered) task lists.
#[tracing::instrument(skip(state))]
async fn index_handler(
    State(state): State<TaskListState>,
    Query(query): Query<IndexQuery>,
) -> Result<Html<String>, WebError> {
    let status = match query.status.as_deref() {
        None | Some("") => FilterStatus::All,
        Some(status) => status.parse::<FilterStatus>()?,
    };
    let task_lists = state.service.filter_task_lists(status).await?;
    let template = IndexTemplate::new(task_lists, status);
    template.render().map(Html).map_err(WebError::from)
}

#[tracing::instrument(skip(state))]
async fn create_task_list_handler(
    State(state): State<TaskListState>,
    form: Result<Form<TitleForm>, FormRejection>,
) -> Result<Redirect, WebError> {
    let Form(form) = form?;
    state.service.create_task_list(form.title()).await?;
    Ok(Redirect::to("/"))
}

#[tracing::instrument(skip(state))]
async fn rename_task_list_handler(
    State(state): State<TaskListState>,
    id: Result<Path<String>, PathRejection>,
    form: Result<Form<TitleForm>, FormRejection>,
) -> Result<Redirect, WebError> {
    let Path(id) = id?;
    let Form(form) = form?;
    state.service.update_task_list(&id, form.title()).await?;
    Ok(Redirect::to("/"))
}

#[tracing::instrument(skip(state))]
async fn delete_task_list_handler(
    State(state): State<TaskListState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Redirect, WebError> {
    let Path(id) = id?;
    state.service.delete_task_list(&id).await?;
    Ok(Redirect::to("/"))
}

#[tracing::instrument(skip(state))]
async fn add_task_handler(
    State(state): State<TaskListState>,
    id: Result<Path<String>, PathRejection>,
    form: Result<Form<DescriptionForm>, FormRejection>,
) -> Result<Redirect, WebError> {
    let Path(id) = id?;
    let Form(form) = form?;
    state.service.add_task(&id, form.description()).await?;
    Ok(Redirect::to("/"))
}

#[tracing::instrument(skip(state))]
async fn edit_task_handler(
    State(state): State<TaskListState>,
    ids: Result<Path<(String, String)>, PathRejection>,
    form: Result<Form<DescriptionForm>, FormRejection>,
) -> Result<Redirect, WebError> {
    let Path((id, task_id)) = ids?;
    let Form(form) = form?;
    state
        .service
        .update_task(&id, &task_id, form.description())
        .await?;
    Ok(Redirect::to("/"))
}

#[tracing::instrument(skip(state))]
async fn delete_task_handler(
    State(state): State<TaskListState>,
    ids: Result<Path<(String, String)>, PathRejection>,
) -> Result<Redirect, WebError> {
    let Path((id, task_id)) = ids?;
    state.service.delete_task(&id, &task_id).await?;
    Ok(Redirect::to("/"))
}

#[tracing::instrument(skip(state))]
async fn toggle_task_handler(
    State(state): State<TaskListState>,
    ids: Result<Path<(String, String)>, PathRejection>,
) -> Result<Redirect, WebError> {
    let Path((id, task_id)) = ids?;
    state.service.toggle_task_completion(&id, &task_id).await?;
    Ok(Redirect::to("/"))
}

/// Creates and returns the router for the HTML task list pages.
pub fn create_task_list_router(state: TaskListState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/tasklists", post(create_task_list_handler))
        .route("/tasklists/{id}/rename", post(rename_task_list_handler))
        .route("/tasklists/{id}/delete", post(delete_task_list_handler))
        .route("/tasklists/{id}/tasks", post(add_task_handler))
        .route("/tasklists/{id}/tasks/{task_id}/edit", post(edit_task_handler))
        .route(
            "/tasklists/{id}/tasks/{task_id}/delete",
            post(delete_task_handler),
        )
        .route(
            "/tasklists/{id}/tasks/{task_id}/toggle",
            post(toggle_task_handler),
        )
        .with_state(state)
}
