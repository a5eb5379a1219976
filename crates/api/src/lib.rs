//! Remote service client and wire types.
//!
//! This crate owns everything that crosses the wire: the session token
//! pair, request/response payload types, the [`RemoteService`] trait the
//! upload pipeline is written against, and the `reqwest`-backed
//! [`ApiClient`] that implements it.
//!
//! Upload logic depends only on the trait, so it stays decoupled from the
//! HTTP stack and testable with mocks.

mod client;
mod service;
mod types;

pub use client::{ApiClient, DEFAULT_HOST};
pub use service::{RemoteService, ServiceFuture};
pub use types::{BagRegistration, BagSummary, Part, Robot, Session, TopicRegistration};

/// Errors from remote service calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("authentication rejected (HTTP {status})")]
    Auth { status: u16 },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// True for failures that a token refresh plus a full upload retry can
    /// plausibly recover from: transport faults, server-side errors, and
    /// rejected credentials. Protocol violations and malformed payloads
    /// recur deterministically and are not retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Transport(_) | ApiError::Api { .. } | ApiError::Auth { .. }
        )
    }
}
