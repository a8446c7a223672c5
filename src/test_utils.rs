//! In-memory implementations of the port traits
//!
//! These are configured up front with builder methods and record enough about
//! the calls they receive for tests to verify behavior.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::ApiError;
use crate::post::{NewPost, Post};
use crate::store::{PostStore, UserDirectory};
use crate::user::{Connection, Status, User};

pub fn unavailable() -> ApiError {
    ApiError::Status {
        status: 503,
        body: "Service Unavailable".to_string(),
    }
}

pub fn user(id: &str, status: Option<&str>) -> User {
    let mut user = User::new(id, format!("user-{id}"));
    user.set_status(status.map(Status::from));
    user
}

pub fn post(id: &str, author_id: &str, status: &str, created_at: Option<&str>) -> Post {
    let mut post = Post::new(id, User::new(author_id, format!("user-{author_id}")), format!("post {id}"));
    post.set_status(Some(Status::from(status)));
    post.set_created_at(created_at.map(str::to_string));
    post
}

// ============================================================================
// In-Memory User Directory
// ============================================================================

#[derive(Default)]
pub struct InMemoryDirectory {
    users: HashMap<String, User>,
    followed: HashMap<String, Vec<Connection>>,
    failing_users: HashSet<String>,
    offline: bool,
    pub user_lookups: AtomicUsize,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the directory record returned by `fetch_user`
    pub fn with_user(mut self, user: User) -> Self {
        self.users.insert(user.id().to_string(), user);
        self
    }

    /// Add a connection to `viewer_id`'s follow list, as it appears in that list
    pub fn with_follow(mut self, viewer_id: &str, connection: User) -> Self {
        self.followed
            .entry(viewer_id.to_string())
            .or_default()
            .push(Connection::from(connection));
        self
    }

    pub fn with_failing_user(mut self, user_id: &str) -> Self {
        self.failing_users.insert(user_id.to_string());
        self
    }

    /// Every follow-list request fails
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn fetch_user(&self, user_id: &str) -> Result<User, ApiError> {
        self.user_lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing_users.contains(user_id) {
            return Err(unavailable());
        }
        self.users.get(user_id).cloned().ok_or(ApiError::Status {
            status: 404,
            body: format!("user {user_id} not found"),
        })
    }

    async fn fetch_followed(&self, user_id: &str) -> Result<Vec<Connection>, ApiError> {
        if self.offline {
            return Err(unavailable());
        }
        Ok(self.followed.get(user_id).cloned().unwrap_or_default())
    }
}

// ============================================================================
// In-Memory Post Store
// ============================================================================

#[derive(Default)]
pub struct InMemoryPostStore {
    posts: HashMap<String, Vec<Post>>,
    failing_users: HashSet<String>,
    reject_create: bool,
    delay: Option<Duration>,
    gate: Option<Arc<Notify>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub fetches_started: AtomicUsize,
    pub fetches_completed: AtomicUsize,
    pub created: Mutex<Vec<NewPost>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(mut self, user_id: &str, posts: Vec<Post>) -> Self {
        self.posts.entry(user_id.to_string()).or_default().extend(posts);
        self
    }

    pub fn with_failing_user(mut self, user_id: &str) -> Self {
        self.failing_users.insert(user_id.to_string());
        self
    }

    pub fn rejecting_creates(mut self) -> Self {
        self.reject_create = true;
        self
    }

    /// Each post fetch sleeps for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Each post fetch waits until `gate` is notified
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn created_posts(&self) -> Vec<NewPost> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn fetch_user_posts(&self, user_id: &str) -> Result<Vec<Post>, ApiError> {
        self.fetches_started.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.fetches_completed.fetch_add(1, Ordering::SeqCst);

        if self.failing_users.contains(user_id) {
            return Err(unavailable());
        }
        Ok(self.posts.get(user_id).cloned().unwrap_or_default())
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
        self.created.lock().unwrap().push(post.clone());
        if self.reject_create {
            return Err(ApiError::Status {
                status: 400,
                body: "rejected".to_string(),
            });
        }

        let mut created = Post::new(
            format!("created-{}", self.created_posts().len()),
            User::new(&post.user_id, ""),
            &post.content,
        );
        created.set_status(Some(Status::from("1")));
        Ok(created)
    }
}
