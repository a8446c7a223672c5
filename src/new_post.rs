//! New post module for the compose form at the top of the home feed.
//!
//! This module holds the form state (text, cursor, attached media) and
//! submits it to the `PostStore`.

use tracing::{debug, error};

use crate::error::ComposeError;
use crate::post::{NewPost, Post};
use crate::session::Session;
use crate::store::PostStore;
use crate::util;

/// Submit a post with already-uploaded media references.
///
/// Posts with no text (after trimming) and no media are rejected before any
/// request is made. There is no retry; callers resubmit on failure.
pub async fn compose_post<P>(
    store: &P,
    author_id: &str,
    content: &str,
    media_refs: &[String],
) -> Result<Post, ComposeError>
where
    P: PostStore + ?Sized,
{
    if content.trim().is_empty() && media_refs.is_empty() {
        return Err(ComposeError::EmptyPost);
    }

    let body = NewPost {
        user_id: author_id.to_string(),
        content: content.to_string(),
        media_urls: media_refs.to_vec(),
    };

    match store.create_post(&body).await {
        Ok(post) => {
            debug!(author_id, post_id = post.id(), "post created");
            Ok(post)
        }
        Err(e) => {
            error!(author_id, error = %e, "failed to create post");
            Err(ComposeError::Api(e))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPostState {
    pub content: String,
    /// References returned by the media upload, in attachment order
    pub media_refs: Vec<String>,
    /// Byte offset into `content`, always on a char boundary
    pub content_cursor: usize,
    is_submitting: bool,
}

impl NewPostState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_input(&mut self, c: char) {
        let mut buf = [0u8; 4];
        util::insert_at_cursor(&mut self.content, &mut self.content_cursor, c.encode_utf8(&mut buf));
    }

    pub fn handle_backspace(&mut self) {
        util::backspace_at_cursor(&mut self.content, &mut self.content_cursor);
    }

    pub fn handle_newline(&mut self) {
        self.handle_input('\n');
    }

    /// Insert an emoji (possibly several code points) at the cursor.
    pub fn insert_emoji(&mut self, emoji: &str) {
        util::insert_at_cursor(&mut self.content, &mut self.content_cursor, emoji);
    }

    pub fn attach_media(&mut self, media_ref: String) {
        self.media_refs.push(media_ref);
    }

    pub fn remove_media(&mut self, index: usize) -> Option<String> {
        (index < self.media_refs.len()).then(|| self.media_refs.remove(index))
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.content_cursor = 0;
        self.media_refs.clear();
    }

    pub fn is_ready_to_submit(&self) -> bool {
        !self.content.trim().is_empty() || !self.media_refs.is_empty()
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn to_new_post(&self, author_id: &str) -> NewPost {
        NewPost {
            user_id: author_id.to_string(),
            content: self.content.clone(),
            media_urls: self.media_refs.clone(),
        }
    }

    /// Submit the form as the session's viewer.
    ///
    /// A form that is not ready is left untouched. On success the form is
    /// cleared; on failure it is kept so the user can resubmit.
    pub async fn submit<P>(&mut self, store: &P, session: &Session) -> Result<Post, ComposeError>
    where
        P: PostStore + ?Sized,
    {
        if !self.is_ready_to_submit() {
            return Err(ComposeError::EmptyPost);
        }

        self.is_submitting = true;
        let result = match session.viewer_id() {
            Some(author_id) => compose_post(store, author_id, &self.content, &self.media_refs).await,
            None => Err(ComposeError::NoSession),
        };
        self.is_submitting = false;

        if result.is_ok() {
            self.clear();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::InMemoryPostStore;

    #[tokio::test]
    async fn test_empty_post_sends_nothing() {
        let store = InMemoryPostStore::new();
        let mut state = NewPostState::new();
        state.handle_input(' ');
        state.handle_newline();
        let before = state.clone();

        let err = state.submit(&store, &Session::logged_in("5")).await.unwrap_err();

        assert!(matches!(err, ComposeError::EmptyPost));
        assert_eq!(state, before);
        assert!(store.created_posts().is_empty());
    }

    #[tokio::test]
    async fn test_media_only_post_is_allowed() {
        let store = InMemoryPostStore::new();
        let mut state = NewPostState::new();
        state.attach_media("upload/abc.png".to_string());

        state.submit(&store, &Session::logged_in("5")).await.unwrap();

        let sent = store.created_posts();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].content, "");
        assert_eq!(sent[0].media_urls, vec!["upload/abc.png".to_string()]);
    }

    #[tokio::test]
    async fn test_successful_submit_clears_form() {
        let store = InMemoryPostStore::new();
        let mut state = NewPostState::new();
        for c in "hello".chars() {
            state.handle_input(c);
        }
        state.insert_emoji("🚀");

        let post = state.submit(&store, &Session::logged_in("5")).await.unwrap();

        assert_eq!(post.content(), "hello🚀");
        assert_eq!(store.created_posts()[0].user_id, "5");
        assert!(state.content.is_empty());
        assert_eq!(state.content_cursor, 0);
        assert!(!state.is_submitting());
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_form() {
        let store = InMemoryPostStore::new().rejecting_creates();
        let mut state = NewPostState::new();
        state.handle_input('x');
        state.attach_media("a.png".to_string());

        let err = state.submit(&store, &Session::logged_in("5")).await.unwrap_err();

        assert!(matches!(err, ComposeError::Api(_)));
        assert_eq!(state.content, "x");
        assert_eq!(state.media_refs.len(), 1);
        assert!(!state.is_submitting());
    }

    #[tokio::test]
    async fn test_no_session_sends_nothing() {
        let store = InMemoryPostStore::new();
        let mut state = NewPostState::new();
        state.handle_input('x');

        let err = state.submit(&store, &Session::anonymous()).await.unwrap_err();

        assert!(matches!(err, ComposeError::NoSession));
        assert!(store.created_posts().is_empty());
        assert!(!state.is_submitting());
        assert_eq!(state.content, "x");
    }

    #[test]
    fn test_editing_with_cursor() {
        let mut state = NewPostState::new();
        for c in "héllo".chars() {
            state.handle_input(c);
        }
        state.handle_backspace();
        state.handle_backspace();
        assert_eq!(state.content, "hél");

        state.attach_media("one".to_string());
        assert_eq!(state.remove_media(3), None);
        assert_eq!(state.remove_media(0), Some("one".to_string()));
    }

    #[test]
    fn test_cursor_left_inside_replaced_content() {
        let mut state = NewPostState::new();
        state.content = "é".to_string();
        state.content_cursor = 1;

        state.handle_input('x');
        assert_eq!(state.content, "xé");

        state.content_cursor = 3;
        state.handle_backspace();
        assert_eq!(state.content, "x");
    }
}
