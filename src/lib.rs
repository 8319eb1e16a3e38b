//! # taskhub
//!
//! Owner-scoped task management. The server side is a CRUD service behind
//! an axum HTTP surface: every task belongs to exactly one user, and only
//! that user can view, update, or delete it. Successful mutations broadcast
//! change events on the owner's private channel (exposed over SSE). The
//! client side mirrors the task list in a local cache, updated
//! optimistically per response, and derives an ephemeral notification feed
//! from that cache on a cancellable timer.
//!
//! ## Running a server
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskhub::server::{router, AppState, StaticTokenValidator, TaskService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = Arc::new(TaskService::in_memory());
//!     let auth = Arc::new(StaticTokenValidator::new().with_token("dev-token", "alice"));
//!     let app = router(AppState::new(service, auth));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Using the service directly
//!
//! ```rust
//! use taskhub::server::TaskService;
//! use taskhub::types::{CreateTaskParams, TaskStatus};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> taskhub::Result<()> {
//! let service = TaskService::in_memory();
//! let task = service
//!     .create("alice", CreateTaskParams::with_title("Buy milk"))
//!     .await?;
//! assert_eq!(task.status, TaskStatus::Pending);
//! assert_eq!(task.owner_id, "alice");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    CreateTaskParams, Task, TaskEvent, TaskEventKind, TaskId, TaskStatus, TaskSummary,
    UpdateTaskParams,
};
