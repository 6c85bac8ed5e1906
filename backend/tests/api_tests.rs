//! End-to-end HTTP tests against the router with an in-memory store.

#![cfg(all(feature = "http-server", feature = "local-repo"))]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use todo_backend::config::{CorsPolicy, Settings};
use todo_backend::db::repositories::LocalRepository;
use todo_backend::http::{bind_listener, create_router, AppState};

fn app_with(repo: LocalRepository, cors: &CorsPolicy) -> Router {
    create_router(AppState::new(Arc::new(repo)), cors)
}

fn app() -> (Router, LocalRepository) {
    let repo = LocalRepository::new();
    let router = app_with(repo.clone(), &Settings::default().cors_policy());
    (router, repo)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, todo) = send(app, Method::POST, "/todos", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    todo
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_health_does_not_touch_store() {
    let (app, repo) = app();
    repo.set_healthy(false);
    let (status, _) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_applies_defaults() {
    let (app, _) = app();
    let todo = create(&app, json!({"title": "Buy milk"})).await;
    assert_eq!(todo["title"], "Buy milk");
    assert_eq!(todo["description"], Value::Null);
    assert_eq!(todo["completed"], false);
    assert!(todo["id"].is_i64());
}

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let (app, _) = app();
    let created = create(
        &app,
        json!({"title": "Write report", "description": "Q3", "completed": true}),
    )
    .await;

    let uri = format!("/todos/{}", created["id"]);
    let (status, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_without_title_is_rejected() {
    let (app, repo) = app();
    let (status, body) =
        send(&app, Method::POST, "/todos", Some(json!({"completed": true}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(repo.todo_count(), 0);
}

#[tokio::test]
async fn test_create_with_blank_or_long_title_is_rejected() {
    let (app, repo) = app();
    let (status, _) = send(&app, Method::POST, "/todos", Some(json!({"title": "   "}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let long = "x".repeat(201);
    let (status, _) = send(&app, Method::POST, "/todos", Some(json!({"title": long}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(repo.todo_count(), 0);
}

#[tokio::test]
async fn test_create_with_wrong_types_is_rejected() {
    let (app, _) = app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/todos",
        Some(json!({"title": "ok", "completed": "yes"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_with_malformed_json_is_rejected() {
    let (app, repo) = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/todos")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(repo.todo_count(), 0);
}

#[tokio::test]
async fn test_list_ordering_and_pagination() {
    let (app, _) = app();
    let mut ids = Vec::new();
    for i in 0..5 {
        let todo = create(&app, json!({"title": format!("todo {}", i)})).await;
        ids.push(todo["id"].as_i64().unwrap());
    }

    let (status, body) = send(&app, Method::GET, "/todos", None).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(listed, ids);

    let (_, body) = send(&app, Method::GET, "/todos?skip=1&limit=2", None).await;
    let paged: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(paged, ids[1..3].to_vec());
}

#[tokio::test]
async fn test_list_with_bad_query_is_rejected() {
    let (app, _) = app();
    let (status, _) = send(&app, Method::GET, "/todos?limit=-1", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = send(&app, Method::GET, "/todos?skip=abc", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::GET, "/todos/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "Todo not found");
}

#[tokio::test]
async fn test_non_integer_id_is_rejected() {
    let (app, _) = app();
    let (status, _) = send(&app, Method::GET, "/todos/abc", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_merges_partial_body() {
    let (app, _) = app();
    let todo = create(&app, json!({"title": "Buy milk", "description": "oat"})).await;
    let uri = format!("/todos/{}", todo["id"]);

    let (status, updated) =
        send(&app, Method::PUT, &uri, Some(json!({"completed": true}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Buy milk");
    assert_eq!(updated["description"], "oat");
    assert_eq!(updated["completed"], true);

    let (_, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn test_update_null_description_clears_it() {
    let (app, _) = app();
    let todo = create(&app, json!({"title": "Buy milk", "description": "oat"})).await;
    let uri = format!("/todos/{}", todo["id"]);

    let (status, updated) =
        send(&app, Method::PUT, &uri, Some(json!({"description": null}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["description"], Value::Null);
    assert_eq!(updated["title"], "Buy milk");
}

#[tokio::test]
async fn test_update_null_title_is_ignored() {
    let (app, _) = app();
    let todo = create(&app, json!({"title": "Keep me"})).await;
    let uri = format!("/todos/{}", todo["id"]);

    let (status, updated) = send(&app, Method::PUT, &uri, Some(json!({"title": null}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Keep me");
}

#[tokio::test]
async fn test_update_with_empty_title_is_rejected() {
    let (app, _) = app();
    let todo = create(&app, json!({"title": "Keep me"})).await;
    let uri = format!("/todos/{}", todo["id"]);

    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({"title": ""}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (_, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched["title"], "Keep me");
}

#[tokio::test]
async fn test_update_missing_is_not_found() {
    let (app, _) = app();
    let (status, _) = send(
        &app,
        Method::PUT,
        "/todos/42",
        Some(json!({"completed": true})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let (app, _) = app();
    let todo = create(&app, json!({"title": "Temporary"})).await;
    let uri = format!("/todos/{}", todo["id"]);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unavailable_store_maps_to_503() {
    let (app, repo) = app();
    repo.set_healthy(false);
    let (status, body) = send(&app, Method::GET, "/todos", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    assert_eq!(body["message"], "Service temporarily unavailable");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_cors_allow_list_echoes_known_origin() {
    let (app, _) = app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/todos")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_allow_list_ignores_unknown_origin() {
    let (app, _) = app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_allow_any_has_no_credentials() {
    let app = app_with(LocalRepository::new(), &CorsPolicy::AllowAny);
    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header(header::ORIGIN, "http://anywhere.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
}

#[tokio::test]
async fn test_bind_listener_resolves_hostnames() {
    let settings = Settings {
        host: "localhost".to_string(),
        port: 0,
        ..Default::default()
    };
    let listener = bind_listener(&settings).await.unwrap();
    let addr = listener.local_addr().unwrap();
    assert!(addr.ip().is_loopback());
    assert_ne!(addr.port(), 0);
}
