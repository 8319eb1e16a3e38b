//! HTTP surface tests: status codes, auth enforcement, and response
//! envelopes, driven through the router without a socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use taskhub::server::{router, AppState, MockValidator, TaskService};
use tower::ServiceExt;

/// Router over a fresh in-memory service. The mock validator treats the
/// bearer token itself as the user id, so tests pick the acting user per
/// request.
fn app() -> Router {
    let service = Arc::new(TaskService::in_memory());
    router(AppState::new(service, Arc::new(MockValidator)))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {user}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_task(app: &Router, user: &str, body: Value) -> Value {
    let (status, body) = send(app, "POST", "/tasks", Some(user), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    body["task"].clone()
}

#[tokio::test]
async fn task_routes_require_a_bearer_token() {
    let app = app();
    for (method, uri) in [
        ("GET", "/tasks"),
        ("POST", "/tasks"),
        ("GET", "/events"),
    ] {
        let (status, body) = send(&app, method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["error"], "Unauthenticated");
    }
}

#[tokio::test]
async fn non_bearer_authorization_header_is_rejected() {
    let app = app();
    let request = Request::builder()
        .method("GET")
        .uri("/tasks")
        .header(header::AUTHORIZATION, "Basic YWxpY2U6cHc=")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_returns_201_with_the_task_envelope() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/tasks",
        Some("alice"),
        Some(json!({ "title": "Buy milk" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Task created successfully");
    assert_eq!(body["task"]["title"], "Buy milk");
    assert_eq!(body["task"]["status"], "pending");
    assert_eq!(body["task"]["owner_id"], "alice");
}

#[tokio::test]
async fn create_with_empty_title_returns_422_with_field_detail() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/tasks",
        Some("alice"),
        Some(json!({ "title": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "The given data was invalid.");
    assert!(body["errors"]["title"].is_array());

    // Nothing was persisted.
    let (_, list) = send(&app, "GET", "/tasks", Some("alice"), None).await;
    assert_eq!(list["tasks"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn listing_is_owner_scoped_with_optional_status_filter() {
    let app = app();
    create_task(&app, "alice", json!({ "title": "pending one" })).await;
    create_task(
        &app,
        "alice",
        json!({ "title": "done one", "status": "completed" }),
    )
    .await;
    create_task(&app, "bob", json!({ "title": "bobs task" })).await;

    let (status, body) = send(&app, "GET", "/tasks", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 2);

    let (_, filtered) = send(&app, "GET", "/tasks?status=completed", Some("alice"), None).await;
    let tasks = filtered["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "done one");

    let (status, _) = send(&app, "GET", "/tasks?status=bogus", Some("alice"), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn non_owner_access_returns_403_and_unknown_id_404() {
    let app = app();
    let task = create_task(&app, "alice", json!({ "title": "private" })).await;
    let id = task["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", &format!("/tasks/{id}"), Some("bob"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/tasks/{id}"),
        Some("bob"),
        Some(json!({ "title": "hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &format!("/tasks/{id}"), Some("bob"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let missing = uuid::Uuid::new_v4();
    let (status, body) = send(&app, "GET", &format!("/tasks/{missing}"), Some("alice"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Task not found");
}

#[tokio::test]
async fn put_applies_partial_updates_and_null_clears_due_date() {
    let app = app();
    let task = create_task(
        &app,
        "alice",
        json!({
            "title": "stable",
            "description": "original",
            "due_date": "2026-06-01"
        }),
    )
    .await;
    let id = task["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/tasks/{id}"),
        Some("alice"),
        Some(json!({ "description": "revised" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["title"], "stable");
    assert_eq!(body["task"]["description"], "revised");
    assert!(!body["task"]["due_date"].is_null());

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/tasks/{id}"),
        Some("alice"),
        Some(json!({ "due_date": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["task"]["due_date"].is_null());
    assert_eq!(body["task"]["description"], "revised");
}

#[tokio::test]
async fn patch_updates_status_and_validates_it() {
    let app = app();
    let task = create_task(&app, "alice", json!({ "title": "work" })).await;
    let id = task["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/tasks/{id}/status"),
        Some("alice"),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task status updated successfully");
    assert_eq!(body["task"]["status"], "completed");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/tasks/{id}/status"),
        Some("alice"),
        Some(json!({ "status": "archived" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["status"].is_array());

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/tasks/{id}/status"),
        Some("alice"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // The failed updates left the stored status alone.
    let (_, body) = send(&app, "GET", &format!("/tasks/{id}"), Some("alice"), None).await;
    assert_eq!(body["task"]["status"], "completed");
}

#[tokio::test]
async fn delete_succeeds_once_then_404s() {
    let app = app();
    let task = create_task(&app, "alice", json!({ "title": "ephemeral" })).await;
    let id = task["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "DELETE", &format!("/tasks/{id}"), Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task deleted successfully");

    let (status, _) = send(&app, "DELETE", &format!("/tasks/{id}"), Some("alice"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", &format!("/tasks/{id}"), Some("alice"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
