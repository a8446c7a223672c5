//! Feed module for aggregating posts across a viewer's connections.
//!
//! `FeedAggregator` gathers the visible posts of every active connection and
//! resolves their media. `Feed` is the presentation side: the same posts
//! sorted newest first, with a few read helpers.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use futures::stream::{self, StreamExt};
use tracing::{debug, error, warn};

use crate::config::FeedConfig;
use crate::error::{ConnectionFailure, FailureStage, FeedError};
use crate::media::MediaResolver;
use crate::post::Post;
use crate::session::Session;
use crate::store::{PostStore, UserDirectory};
use crate::user::Connection;

/// Result of one aggregation run.
///
/// `posts` are unsorted and in connection order. Connections that failed are
/// listed in `failures` and contributed nothing.
#[derive(Debug, Default)]
pub struct FeedResolution {
    pub posts: Vec<Post>,
    pub failures: Vec<ConnectionFailure>,
    /// Connections dropped because their directory record is inactive
    pub skipped_inactive: usize,
}

impl FeedResolution {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn into_feed(self) -> Feed {
        Feed::from_posts(self.posts)
    }
}

enum ConnectionOutcome {
    Posts(Vec<Post>),
    Inactive,
    Failed(ConnectionFailure),
}

pub struct FeedAggregator<D, P>
where
    D: UserDirectory,
    P: PostStore,
{
    directory: Arc<D>,
    posts: Arc<P>,
    resolver: MediaResolver,
    max_concurrency: usize,
}

impl<D, P> FeedAggregator<D, P>
where
    D: UserDirectory,
    P: PostStore,
{
    pub fn new(directory: Arc<D>, posts: Arc<P>, config: &FeedConfig) -> Self {
        Self {
            directory,
            posts,
            resolver: MediaResolver::from_config(config),
            max_concurrency: config.max_concurrency.max(1),
        }
    }

    pub fn directory(&self) -> &Arc<D> {
        &self.directory
    }

    pub fn post_store(&self) -> &Arc<P> {
        &self.posts
    }

    pub fn resolver(&self) -> &MediaResolver {
        &self.resolver
    }

    /// Resolve the feed of the session's viewer, or of the sentinel id when
    /// nobody is logged in.
    pub async fn resolve_feed_for(&self, session: &Session) -> Result<FeedResolution, FeedError> {
        self.resolve_feed(session.viewer_or_sentinel()).await
    }

    /// Collect the visible posts of every active connection of `viewer_id`.
    ///
    /// Only a failure to load the follow list is an error. A connection whose
    /// record or posts cannot be fetched is recorded in
    /// `FeedResolution::failures` and skipped.
    pub async fn resolve_feed(&self, viewer_id: &str) -> Result<FeedResolution, FeedError> {
        let connections = self
            .directory
            .fetch_followed(viewer_id)
            .await
            .map_err(|source| {
                error!(viewer_id, error = %source, "failed to load followed connections");
                FeedError::DirectoryUnreachable {
                    viewer_id: viewer_id.to_string(),
                    source,
                }
            })?;

        let active: Vec<Connection> = connections.into_iter().filter(Connection::is_active).collect();
        debug!(viewer_id, active = active.len(), "collecting posts from active connections");

        let fetches: Vec<_> = active
            .iter()
            .map(|connection| self.collect_connection(connection.id()))
            .collect();
        let outcomes: Vec<ConnectionOutcome> = stream::iter(fetches)
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let mut resolution = FeedResolution::default();
        for outcome in outcomes {
            match outcome {
                ConnectionOutcome::Posts(posts) => resolution
                    .posts
                    .extend(posts.into_iter().map(|post| self.resolver.resolve_post(post))),
                ConnectionOutcome::Inactive => resolution.skipped_inactive += 1,
                ConnectionOutcome::Failed(failure) => {
                    warn!(
                        viewer_id,
                        user_id = %failure.user_id,
                        stage = %failure.stage,
                        error = %failure.error,
                        "skipping connection"
                    );
                    resolution.failures.push(failure);
                }
            }
        }

        debug!(
            viewer_id,
            posts = resolution.posts.len(),
            failures = resolution.failures.len(),
            skipped_inactive = resolution.skipped_inactive,
            "feed resolved"
        );
        Ok(resolution)
    }

    /// The follow list and the directory record are checked independently;
    /// either one marking the user inactive drops the connection.
    async fn collect_connection(&self, user_id: &str) -> ConnectionOutcome {
        let user = match self.directory.fetch_user(user_id).await {
            Ok(user) => user,
            Err(error) => {
                return ConnectionOutcome::Failed(ConnectionFailure::new(
                    user_id,
                    FailureStage::UserLookup,
                    error,
                ))
            }
        };
        if !user.is_active() {
            return ConnectionOutcome::Inactive;
        }

        match self.posts.fetch_user_posts(user_id).await {
            Ok(posts) => ConnectionOutcome::Posts(posts.into_iter().filter(Post::is_visible).collect()),
            Err(error) => ConnectionOutcome::Failed(ConnectionFailure::new(
                user_id,
                FailureStage::PostFetch,
                error,
            )),
        }
    }
}

/// Order posts newest first. Missing or invalid timestamps count as the
/// epoch; posts with equal timestamps keep their relative order.
pub fn sort_by_recency(posts: &mut [Post]) {
    posts.sort_by_key(|post| std::cmp::Reverse(post.sort_key()));
}

/// A collection of posts ready for display, sorted newest first.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    pub posts: Vec<Post>,
}

impl Feed {
    pub fn from_posts(mut posts: Vec<Post>) -> Feed {
        sort_by_recency(&mut posts);
        Feed { posts }
    }

    /// Filter posts by a specific time range.
    ///
    /// # Arguments
    ///
    /// * `start` - The start time of the range (inclusive)
    /// * `end` - The end time of the range (inclusive)
    ///
    /// Posts without a parseable timestamp are never in range.
    pub fn posts_in_range(
        &self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Vec<&Post> {
        self.posts
            .iter()
            .filter(|post| {
                post.time()
                    .is_some_and(|post_time| post_time >= start && post_time <= end)
            })
            .collect()
    }

    pub fn get_recent_posts(&self, limit: usize) -> Vec<&Post> {
        self.posts.iter().take(limit).collect()
    }

    pub fn posts_by_author(&self, author_id: &str) -> Vec<&Post> {
        self.posts
            .iter()
            .filter(|post| post.author().id() == author_id)
            .collect()
    }

    /// Distinct author ids, sorted.
    pub fn authors(&self) -> Vec<String> {
        let mut authors: Vec<String> = self
            .posts
            .iter()
            .map(|post| post.author().id().to_string())
            .collect();

        authors.sort();
        authors.dedup();
        authors
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Feed with {} posts:", self.posts.len())?;
        for (i, post) in self.posts.iter().enumerate() {
            writeln!(f, "--- Post {} ---", i + 1)?;
            if let Some(time) = post.time() {
                writeln!(f, "Time: {time}")?;
            }
            writeln!(f, "{post}")?;
            writeln!(f)?;
        }
        Ok(())
    }
}
