//! HTTP client for the task service.
//!
//! Wraps the REST surface with typed methods, bearer authentication, and a
//! bounded request timeout. Each successful response applies the matching
//! mutation to the local [`TaskCache`]; a failed request surfaces the error
//! and leaves the cache untouched.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::client::cache::TaskCache;
use crate::error::{Error, Result};
use crate::types::{CreateTaskParams, Task, TaskId, UpdateTaskParams};

/// Default bound on a single request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct TaskEnvelope {
    task: Task,
}

#[derive(Debug, Deserialize)]
struct TasksEnvelope {
    tasks: Vec<Task>,
}

/// Typed client for the task API.
#[derive(Debug, Clone)]
pub struct TaskClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    cache: Arc<TaskCache>,
}

impl TaskClient {
    /// Create a client with the default request timeout.
    pub fn new(base_url: Url, token: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, token, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(
        base_url: Url,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url,
            token: token.into(),
            cache: Arc::new(TaskCache::new()),
        })
    }

    /// The local task mirror this client maintains.
    pub fn cache(&self) -> &Arc<TaskCache> {
        &self.cache
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Create a task and mirror it locally.
    pub async fn create_task(&self, params: &CreateTaskParams) -> Result<Task> {
        let response = self
            .http
            .post(self.endpoint("tasks"))
            .bearer_auth(&self.token)
            .json(params)
            .send()
            .await
            .map_err(map_transport_error)?;
        let task = read_task(response, None).await?;
        self.cache.insert(task.clone());
        Ok(task)
    }

    /// Fetch the caller's tasks, replacing the local mirror.
    pub async fn list_tasks(&self, status_filter: Option<&str>) -> Result<Vec<Task>> {
        let mut request = self
            .http
            .get(self.endpoint("tasks"))
            .bearer_auth(&self.token);
        if let Some(status) = status_filter {
            request = request.query(&[("status", status)]);
        }
        let response = request.send().await.map_err(map_transport_error)?;
        let response = check_status(response, None).await?;
        let envelope: TasksEnvelope = response
            .json()
            .await
            .map_err(|e| Error::internal(format!("malformed task list response: {e}")))?;

        // A full fetch only overwrites the mirror when unfiltered;
        // otherwise it would drop tasks the filter excluded.
        if status_filter.is_none() {
            self.cache.replace_all(envelope.tasks.clone());
        }
        Ok(envelope.tasks)
    }

    /// Fetch one task and mirror it locally.
    pub async fn get_task(&self, id: TaskId) -> Result<Task> {
        let response = self
            .http
            .get(self.endpoint(&format!("tasks/{id}")))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(map_transport_error)?;
        let task = read_task(response, Some(id)).await?;
        self.cache.insert(task.clone());
        Ok(task)
    }

    /// Apply a partial update and mirror the result.
    pub async fn update_task(&self, id: TaskId, params: &UpdateTaskParams) -> Result<Task> {
        let response = self
            .http
            .put(self.endpoint(&format!("tasks/{id}")))
            .bearer_auth(&self.token)
            .json(params)
            .send()
            .await
            .map_err(map_transport_error)?;
        let task = read_task(response, Some(id)).await?;
        self.cache.insert(task.clone());
        Ok(task)
    }

    /// Change a task's status and mirror the result.
    pub async fn update_status(&self, id: TaskId, status: &str) -> Result<Task> {
        let response = self
            .http
            .patch(self.endpoint(&format!("tasks/{id}/status")))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await
            .map_err(map_transport_error)?;
        let task = read_task(response, Some(id)).await?;
        self.cache.insert(task.clone());
        Ok(task)
    }

    /// Delete a task and drop it from the mirror.
    pub async fn delete_task(&self, id: TaskId) -> Result<()> {
        let response = self
            .http
            .delete(self.endpoint(&format!("tasks/{id}")))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(map_transport_error)?;
        check_status(response, Some(id)).await?;
        self.cache.remove(id);
        Ok(())
    }
}

/// Map a reqwest transport failure to the error taxonomy. Timeouts get the
/// dedicated variant so callers can show a retry hint.
fn map_transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout
    } else {
        Error::internal(format!("request failed: {err}"))
    }
}

/// Turn a non-success response into the matching error.
async fn check_status(response: reqwest::Response, id: Option<TaskId>) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body: serde_json::Value = response.json().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 => Error::unauthenticated("server rejected credentials"),
        403 => Error::Forbidden,
        404 => match id {
            Some(id) => Error::not_found(id),
            None => Error::not_found("unknown"),
        },
        422 => validation_from_body(&body),
        _ => Error::internal(format!("unexpected status {status}")),
    })
}

/// Recover field-level detail from a 422 body, falling back to a generic
/// validation error when the shape is unexpected.
fn validation_from_body(body: &serde_json::Value) -> Error {
    if let Some(errors) = body.get("errors").and_then(|v| v.as_object()) {
        if let Some((field, messages)) = errors.iter().next() {
            let message = messages
                .as_array()
                .and_then(|m| m.first())
                .and_then(|m| m.as_str())
                .unwrap_or("invalid value");
            return Error::validation(field.clone(), message);
        }
    }
    Error::validation("request", "The given data was invalid.")
}

async fn read_task(response: reqwest::Response, id: Option<TaskId>) -> Result<Task> {
    let response = check_status(response, id).await?;
    let envelope: TaskEnvelope = response
        .json()
        .await
        .map_err(|e| Error::internal(format!("malformed task response: {e}")))?;
    Ok(envelope.task)
}
