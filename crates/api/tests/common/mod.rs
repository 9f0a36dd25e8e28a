use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use tracklane_api::config::{ServerConfig, StorageConfig};
use tracklane_api::router::build_app_router;
use tracklane_api::state::AppState;
use tracklane_core::clock::FixedClock;
use tracklane_core::repository::InMemoryRepository;
use tracklane_core::service::WorkItemService;

/// Build a test `ServerConfig` with safe defaults and in-memory storage.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".parse().unwrap()],
        request_timeout_secs: 30,
        storage: StorageConfig::Memory,
    }
}

/// Full application router over an empty in-memory store.
///
/// The clock is pinned to 2024-03-05 15:07 UTC. The returned router shares
/// one store across clones, so a test can issue several requests against
/// `app.clone()`.
pub fn build_test_app() -> Router {
    let config = test_config();
    let now = Utc.with_ymd_and_hms(2024, 3, 5, 15, 7, 0).unwrap();
    let service = WorkItemService::new(
        Arc::new(InMemoryRepository::new()),
        Arc::new(FixedClock(now)),
    );

    let state = AppState {
        service,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
