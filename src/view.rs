//! State behind the home feed screen.
//!
//! `HomeFeedView` owns the in-flight feed load, the sorted feed, the viewer's
//! avatar and a queue of notices for the UI to show. Loads are tokio tasks
//! stamped with a generation; a load is aborted when superseded or when the
//! view is dropped, and only a result of the current generation is applied.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::{ComposeError, FeedError};
use crate::feed::{Feed, FeedAggregator, FeedResolution};
use crate::media::MediaResolver;
use crate::new_post::NewPostState;
use crate::post::Post;
use crate::session::Session;
use crate::store::{PostStore, UserDirectory};

pub const FEED_LOAD_FAILED: &str = "Failed to fetch posts";
pub const POST_CREATED: &str = "Post created successfully!";
pub const POST_FAILED: &str = "Failed to create post";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A short message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// A running feed resolution. Dropping it aborts the fetches.
pub struct FeedTask {
    generation: u64,
    handle: JoinHandle<Result<FeedResolution, FeedError>>,
}

impl FeedTask {
    pub fn spawn<D, P>(aggregator: Arc<FeedAggregator<D, P>>, viewer_id: String, generation: u64) -> Self
    where
        D: UserDirectory + 'static,
        P: PostStore + 'static,
    {
        let handle = tokio::spawn(async move { aggregator.resolve_feed(&viewer_id).await });
        Self { generation, handle }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for FeedTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// The viewer's resolved profile picture.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerAvatar {
    url: String,
}

impl ViewerAvatar {
    pub fn new(resolver: &MediaResolver) -> Self {
        Self {
            url: resolver.default_avatar_url().to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the viewer's record and keep its picture.
    ///
    /// Without a session this does nothing; on failure the previous value stays.
    pub async fn refresh<D>(&mut self, directory: &D, session: &Session, resolver: &MediaResolver)
    where
        D: UserDirectory + ?Sized,
    {
        let Some(viewer_id) = session.viewer_id() else {
            return;
        };

        match directory.fetch_user(viewer_id).await {
            Ok(user) => {
                if let Some(picture) = user.profile_picture().filter(|p| !p.is_empty()) {
                    self.url = resolver.resolve(Some(picture));
                }
            }
            Err(e) => warn!(viewer_id, error = %e, "failed to refresh viewer avatar"),
        }
    }
}

pub struct HomeFeedView<D, P>
where
    D: UserDirectory + 'static,
    P: PostStore + 'static,
{
    aggregator: Arc<FeedAggregator<D, P>>,
    session: Session,
    feed: Feed,
    task: Option<FeedTask>,
    generation: u64,
    avatar: ViewerAvatar,
    notices: VecDeque<Notice>,
}

impl<D, P> HomeFeedView<D, P>
where
    D: UserDirectory + 'static,
    P: PostStore + 'static,
{
    pub fn new(aggregator: Arc<FeedAggregator<D, P>>, session: Session) -> Self {
        let avatar = ViewerAvatar::new(aggregator.resolver());
        Self {
            aggregator,
            session,
            feed: Feed::default(),
            task: None,
            generation: 0,
            avatar,
            notices: VecDeque::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    pub fn posts(&self) -> &[Post] {
        &self.feed.posts
    }

    pub fn avatar(&self) -> &ViewerAvatar {
        &self.avatar
    }

    pub fn is_loading(&self) -> bool {
        self.task.is_some()
    }

    /// Generation of the most recently started load.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a fresh load, aborting any load still in flight.
    pub fn start_loading(&mut self) {
        self.generation += 1;
        let viewer_id = self.session.viewer_or_sentinel().to_string();
        debug!(%viewer_id, generation = self.generation, "loading home feed");
        self.task = Some(FeedTask::spawn(
            Arc::clone(&self.aggregator),
            viewer_id,
            self.generation,
        ));
    }

    pub fn cancel_loading(&mut self) {
        self.task = None;
    }

    /// Wait for the current load and apply it. Returns false when nothing was
    /// loading or the result belongs to an older generation.
    pub async fn finish_loading(&mut self) -> bool {
        let Some(mut task) = self.task.take() else {
            return false;
        };
        let outcome = (&mut task.handle).await;
        self.apply_load(task.generation(), outcome)
    }

    /// Apply a finished load if it belongs to the current generation.
    pub fn apply_load(
        &mut self,
        generation: u64,
        outcome: Result<Result<FeedResolution, FeedError>, tokio::task::JoinError>,
    ) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "discarding superseded feed load");
            return false;
        }

        match outcome {
            Ok(Ok(resolution)) => {
                if resolution.is_partial() {
                    warn!(
                        failures = resolution.failures.len(),
                        "feed loaded without some connections"
                    );
                }
                self.feed = resolution.into_feed();
            }
            Ok(Err(e)) => {
                error!(error = %e, "feed load failed");
                self.fail_load();
            }
            Err(join_error) => {
                error!(error = %join_error, "feed task did not complete");
                self.fail_load();
            }
        }
        true
    }

    pub async fn reload(&mut self) {
        self.start_loading();
        self.finish_loading().await;
    }

    fn fail_load(&mut self) {
        self.feed = Feed::default();
        self.notices.push_back(Notice::error(FEED_LOAD_FAILED));
    }

    pub async fn refresh_avatar(&mut self) {
        self.avatar
            .refresh(
                self.aggregator.directory().as_ref(),
                &self.session,
                self.aggregator.resolver(),
            )
            .await;
    }

    /// The stored session changed (e.g. another tab logged in); re-read the avatar.
    pub async fn on_storage_change(&mut self, session: Session) {
        self.session = session;
        self.refresh_avatar().await;
    }

    /// Submit the compose form and queue the matching notice.
    ///
    /// An empty form is ignored without a notice.
    pub async fn submit_post(&mut self, form: &mut NewPostState) -> Result<Post, ComposeError> {
        let result = form
            .submit(self.aggregator.post_store().as_ref(), &self.session)
            .await;

        match &result {
            Ok(_) => self.notices.push_back(Notice::success(POST_CREATED)),
            Err(ComposeError::Api(_)) => self.notices.push_back(Notice::error(POST_FAILED)),
            Err(ComposeError::EmptyPost) | Err(ComposeError::NoSession) => {}
        }
        result
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }
}
