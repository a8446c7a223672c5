//! Error types for each stage of the feed pipeline.
//!
//! - `ApiError`: a single REST call failed
//! - `FeedError`: the aggregation could not start (the follow list is a hard dependency)
//! - `ConnectionFailure`: one connection contributed nothing; recorded, never fatal
//! - `ComposeError`: a post submission was rejected or failed
//! - `ConfigError`: invalid configuration values

use std::fmt;

use thiserror::Error;

/// Errors from the REST backend client
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid request URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("API error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that abort a whole feed resolution
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Could not load connections of viewer {viewer_id}: {source}")]
    DirectoryUnreachable {
        viewer_id: String,
        #[source]
        source: ApiError,
    },
}

/// Which per-connection fetch failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    UserLookup,
    PostFetch,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::UserLookup => write!(f, "user lookup"),
            FailureStage::PostFetch => write!(f, "post fetch"),
        }
    }
}

/// A connection whose posts could not be collected.
#[derive(Debug, Error)]
#[error("{stage} failed for connection {user_id}: {error}")]
pub struct ConnectionFailure {
    pub user_id: String,
    pub stage: FailureStage,
    #[source]
    pub error: ApiError,
}

impl ConnectionFailure {
    pub fn new(user_id: impl Into<String>, stage: FailureStage, error: ApiError) -> Self {
        Self {
            user_id: user_id.into(),
            stage,
            error,
        }
    }
}

/// Errors from composing a post
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Post has no content and no media")]
    EmptyPost,

    #[error("No logged-in viewer")]
    NoSession,

    #[error("Failed to create post: {0}")]
    Api(#[from] ApiError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
