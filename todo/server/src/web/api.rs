use crate::task_list::api::v1;
use crate::task_list::web::TaskListState;
use crate::task_list::{FilterStatus, Task, TaskList};
use axum::{Router, response::Json, routing::get};
use serde_json::{Value, json};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI description of the JSON API, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Task List API",
        description = "Create, rename, filter and delete task lists and their tasks."
    ),
    paths(
        v1::get_task_lists_handler,
        v1::get_task_list_handler,
        v1::create_task_list_handler,
        v1::update_task_list_handler,
        v1::delete_task_list_handler,
        v1::filter_task_lists_handler,
        v1::add_task_handler,
        v1::update_task_handler,
        v1::delete_task_handler,
        v1::toggle_task_handler,
    ),
    components(schemas(
        Task,
        TaskList,
        FilterStatus,
        v1::TitlePayload,
        v1::DescriptionPayload,
        v1::TaskListResponse,
        v1::TaskListsResponse,
        v1::MessageResponse,
        v1::MessageJson,
        v1::ErrorResponse,
    )),
    tags(
        (name = "Task lists", description = "Operations on whole task lists"),
        (name = "Tasks", description = "Operations on the tasks inside a list")
    )
)]
pub struct ApiDoc;

/// Handler for GET /api - Lists the available endpoints.
#[tracing::instrument]
pub async fn api_index_handler() -> Json<Value> {
    Json(json!({
        "message": "ToDo API Server",
        "endpoints": {
            "taskLists": "/api/tasklists",
            "taskListById": "/api/tasklists/{id}",
            "createTaskList": "/api/tasklists",
            "updateTaskList": "/api/tasklists/{id}",
            "deleteTaskList": "/api/tasklists/{id}",
            "filterTaskLists": "/api/tasklists/filter/{status}",
            "addTask": "/api/tasklists/{id}/tasks",
            "updateTask": "/api/tasklists/{id}/tasks/{taskId}",
            "deleteTask": "/api/tasklists/{id}/tasks/{taskId}",
            "toggleTaskCompletion": "/api/tasklists/{id}/tasks/{taskId}/toggle",
            "openApi": "/api-docs/openapi.json",
            "swaggerUi": "/swagger-ui"
        }
    }))
}

/// Creates the routes for the JSON API, its index and its documentation.
pub fn create_api_router(task_list_state: TaskListState) -> Router {
    Router::new()
        .route("/api", get(api_index_handler))
        .merge(v1::create_api_router(task_list_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_document_every_task_list_route() {
        let doc = ApiDoc::openapi();
        let mut paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        paths.sort();

        assert_eq!(
            paths,
            vec![
                "/api/tasklists",
                "/api/tasklists/filter/{status}",
                "/api/tasklists/{id}",
                "/api/tasklists/{id}/tasks",
                "/api/tasklists/{id}/tasks/{task_id}",
                "/api/tasklists/{id}/tasks/{task_id}/toggle",
            ]
        );
    }
}
