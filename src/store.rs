//! Port traits for the two backend collaborators.
//!
//! `network::ApiClient` implements both against the REST API; tests plug in
//! in-memory versions.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::post::{NewPost, Post};
use crate::user::{Connection, User};

/// Resolves users and their follow lists
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `GET /users/{id}`
    async fn fetch_user(&self, user_id: &str) -> Result<User, ApiError>;

    /// `GET /followers/{id}/followed`
    async fn fetch_followed(&self, user_id: &str) -> Result<Vec<Connection>, ApiError>;
}

/// Reads and creates posts
#[async_trait]
pub trait PostStore: Send + Sync {
    /// `GET /posts/user/{id}`
    async fn fetch_user_posts(&self, user_id: &str) -> Result<Vec<Post>, ApiError>;

    /// `POST /posts`
    async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError>;
}
