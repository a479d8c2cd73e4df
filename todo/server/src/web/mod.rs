use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::store::JsonFileStore;
use crate::task_list::TaskListService;
use crate::task_list::web::{TaskListState, create_task_list_router};

pub mod api;

/// Builds the full application router: JSON API, HTML pages and health check.
pub fn create_app(task_list_state: TaskListState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .merge(api::create_api_router(task_list_state.clone()))
        .merge(create_task_list_router(task_list_state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let store = JsonFileStore::open(&config.data_file).await?;
    tracing::info!("Data file location: {}", store.path().display());

    let task_list_state = TaskListState::new(TaskListService::new(Arc::new(store)));
    let app = create_app(task_list_state);

    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);
    tracing::info!(
        "API documentation available at http://{}/swagger-ui",
        server_address
    );

    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn can_answer_health_check() {
        let app = Router::new().route("/health", axum::routing::get(health_check_handler));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"OK");
    }
}
