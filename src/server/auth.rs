//! Bearer-token authentication.
//!
//! Identity management lives outside this crate; the server only needs to
//! turn a bearer token into an opaque user id. [`TokenValidator`] is that
//! seam, [`AuthContext`] is the only auth type the rest of the server sees.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Validated caller identity.
///
/// Task operations consume only the user id; everything else about the
/// caller is the identity provider's business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Opaque identifier of the authenticated user.
    pub subject: String,
}

impl AuthContext {
    /// Create a context for the given user id.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }

    /// The authenticated user's id.
    pub fn user_id(&self) -> &str {
        &self.subject
    }
}

/// Turns a bearer token into an [`AuthContext`].
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validate a token, returning the caller's identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthenticated`] for unknown or malformed tokens.
    async fn validate(&self, token: &str) -> Result<AuthContext>;
}

/// Token validator backed by a fixed token-to-user table.
///
/// Suitable when tokens are provisioned out of band (deploy-time
/// configuration, a gateway that mints them, or tests).
#[derive(Debug, Default)]
pub struct StaticTokenValidator {
    tokens: DashMap<String, String>,
}

impl StaticTokenValidator {
    /// Create an empty validator. Every request is rejected until tokens
    /// are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for a user. Builder-style.
    pub fn with_token(self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), user_id.into());
        self
    }

    /// Register a token for a user.
    pub fn insert(&self, token: impl Into<String>, user_id: impl Into<String>) {
        self.tokens.insert(token.into(), user_id.into());
    }
}

#[async_trait]
impl TokenValidator for StaticTokenValidator {
    async fn validate(&self, token: &str) -> Result<AuthContext> {
        self.tokens
            .get(token)
            .map(|entry| AuthContext::new(entry.value().clone()))
            .ok_or_else(|| Error::unauthenticated("unknown token"))
    }
}

/// Validator that accepts any token whose value is a user id.
///
/// **Never use in production.** It exists so tests and local development
/// can pick the acting user directly from the token.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockValidator;

#[async_trait]
impl TokenValidator for MockValidator {
    async fn validate(&self, token: &str) -> Result<AuthContext> {
        if token.is_empty() {
            return Err(Error::unauthenticated("empty token"));
        }
        Ok(AuthContext::new(token))
    }
}
