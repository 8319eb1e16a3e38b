//! HTTP surface for the task service.
//!
//! Routes mirror the REST contract: `/tasks` CRUD plus a per-user SSE
//! stream at `/events`. All routes sit behind bearer-token authentication;
//! errors are translated to status codes and JSON bodies in one place.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use crate::error::Error;
use crate::server::auth::{AuthContext, TokenValidator};
use crate::server::service::TaskService;
use crate::types::{CreateTaskParams, TaskId, UpdateTaskParams};

/// Default bound on request handling time.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared state behind every route.
#[derive(Clone)]
pub struct AppState {
    service: Arc<TaskService>,
    auth: Arc<dyn TokenValidator>,
    request_timeout: Duration,
}

impl AppState {
    /// Create state with the default request timeout.
    pub fn new(service: Arc<TaskService>, auth: Arc<dyn TokenValidator>) -> Self {
        Self {
            service,
            auth,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let timeout = state.request_timeout;
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/{id}/status", patch(update_task_status))
        .route("/events", get(task_events))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Error wrapper implementing axum's response conversion.
///
/// Internal failures are logged here with full detail and surfaced as a
/// generic 500; everything else maps per the error taxonomy.
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Error::Internal(detail) = &self.0 {
            tracing::error!(%detail, "internal error while handling request");
        }
        (self.0.status_code(), Json(self.0.response_body())).into_response()
    }
}

/// Resolve the bearer token and stash the caller's identity in request
/// extensions. Everything behind this middleware can assume an
/// [`AuthContext`] is present.
async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty());

    let Some(token) = token else {
        return ApiError::from(Error::unauthenticated("missing bearer token")).into_response();
    };

    match state.auth.validate(token).await {
        Ok(ctx) => {
            request.extensions_mut().insert(ctx);
            next.run(request).await
        },
        Err(err) => ApiError::from(err).into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct ListTasksQuery {
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateStatusBody {
    status: Option<String>,
}

async fn create_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(params): Json<CreateTaskParams>,
) -> Result<Response, ApiError> {
    let task = state.service.create(ctx.user_id(), params).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Task created successfully", "task": task })),
    )
        .into_response())
}

async fn list_tasks(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Response, ApiError> {
    let tasks = state
        .service
        .list(ctx.user_id(), query.status.as_deref())
        .await?;
    Ok(Json(json!({ "tasks": tasks })).into_response())
}

async fn get_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<TaskId>,
) -> Result<Response, ApiError> {
    let task = state.service.get(ctx.user_id(), id).await?;
    Ok(Json(json!({ "task": task })).into_response())
}

async fn update_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<TaskId>,
    Json(params): Json<UpdateTaskParams>,
) -> Result<Response, ApiError> {
    let task = state.service.update(ctx.user_id(), id, params).await?;
    Ok(Json(json!({ "message": "Task updated successfully", "task": task })).into_response())
}

async fn update_task_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<TaskId>,
    Json(body): Json<UpdateStatusBody>,
) -> Result<Response, ApiError> {
    let status = body
        .status
        .ok_or_else(|| Error::validation("status", "The status field is required."))?;
    let task = state.service.update_status(ctx.user_id(), id, &status).await?;
    Ok(
        Json(json!({ "message": "Task status updated successfully", "task": task }))
            .into_response(),
    )
}

async fn delete_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<TaskId>,
) -> Result<Response, ApiError> {
    state.service.delete(ctx.user_id(), id).await?;
    Ok(Json(json!({ "message": "Task deleted successfully" })).into_response())
}

/// Stream the caller's change events as Server-Sent Events.
async fn task_events(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>> {
    let receiver = state.service.events().subscribe(ctx.user_id());
    let stream = BroadcastStream::new(receiver)
        // A lagged receiver just skips the events it missed.
        .filter_map(|event| event.ok())
        .map(|event| Event::default().event("task").json_data(&event));
    Sse::new(stream).keep_alive(KeepAlive::default())
}
