#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use todo_server::store::JsonFileStore;
use todo_server::task_list::TaskListService;
use todo_server::task_list::web::TaskListState;
use todo_server::web::create_app;
use tower::ServiceExt;

/// Test context for endpoint tests backed by a throwaway data file.
pub struct TestContext {
    // kept so the directory is not deleted while the test runs
    pub dir: tempfile::TempDir,
    pub data_file: PathBuf,
    pub app: Router,
}

pub async fn setup() -> anyhow::Result<TestContext> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    let dir = tempfile::tempdir()?;
    let data_file = dir.path().join("data").join("todo-data.json");
    let store = JsonFileStore::open(&data_file).await?;
    let state = TaskListState::new(TaskListService::new(Arc::new(store)));
    Ok(TestContext {
        dir,
        data_file,
        app: create_app(state),
    })
}

/// Error envelope with a fixed field order, for snapshots.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
}

/// Sends a request to the app and returns the status and the parsed JSON body.
pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Creates a task list through the API and returns its JSON representation.
pub async fn create_task_list(app: &Router, title: &str) -> Value {
    let (status, body) = send_json(
        app,
        Method::POST,
        "/api/tasklists",
        Some(serde_json::json!({ "title": title })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"].clone()
}

/// Adds a task through the API and returns the updated task list.
pub async fn add_task(app: &Router, list_id: &str, description: &str) -> Value {
    let (status, body) = send_json(
        app,
        Method::POST,
        &format!("/api/tasklists/{}/tasks", list_id),
        Some(serde_json::json!({ "description": description })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"].clone()
}

pub fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}
