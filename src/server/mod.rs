//! Server-side task management: authentication, authorization, storage,
//! the service itself, change events, and the HTTP surface.

pub mod auth;
pub mod authz;
pub mod events;
pub mod http;
pub mod service;
pub mod store;

pub use auth::{AuthContext, MockValidator, StaticTokenValidator, TokenValidator};
pub use authz::{permit, TaskAction};
pub use events::EventBroadcaster;
pub use http::{router, AppState};
pub use service::TaskService;
pub use store::{InMemoryTaskStore, TaskStore};
