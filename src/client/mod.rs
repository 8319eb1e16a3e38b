//! Client-side task management: a typed HTTP client, an optimistic local
//! cache, and the derived notification feed with its refresh timer.

pub mod api;
pub mod cache;
pub mod feed;

pub use api::TaskClient;
pub use cache::TaskCache;
pub use feed::{
    derive_notifications, FeedFilter, FeedRefresher, Notification, NotificationFeed,
    NotificationKind,
};
