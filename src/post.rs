//! Post module for the Connect REST backend.
//!
//! This module contains the Post struct and the records nested inside it,
//! decoded from the camelCase JSON the backend returns.

use std::fmt::Display;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::user::{Status, User};
use crate::util;

/// A media file attached to a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAttachment {
    #[serde(default, deserialize_with = "util::string_or_number")]
    id: String,
    #[serde(default, deserialize_with = "util::null_as_default")]
    media_url: String,
    #[serde(default, deserialize_with = "util::null_as_default")]
    media_type: String,
}

impl MediaAttachment {
    pub fn new(id: impl Into<String>, media_url: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            media_url: media_url.into(),
            media_type: media_type.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn media_url(&self) -> &str {
        &self.media_url
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn set_media_url(&mut self, media_url: String) {
        self.media_url = media_url;
    }
}

/// One user's emoji reaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    #[serde(default, deserialize_with = "util::null_as_default")]
    pub user: User,
    #[serde(default, deserialize_with = "util::null_as_default")]
    pub emoji: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default, deserialize_with = "util::string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "util::null_as_default")]
    pub user: User,
    #[serde(default, deserialize_with = "util::null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "util::optional_string_or_number")]
    pub created_at: Option<String>,
}

impl Comment {
    pub fn time(&self) -> Option<DateTime<FixedOffset>> {
        self.created_at.as_deref().and_then(util::parse_timestamp)
    }
}

/// A post as returned by `GET /posts/user/{id}` and `POST /posts`.
///
/// Every field is optional on the wire; absent values decode to empty
/// defaults. List endpoints skip entries that still fail to decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(default, deserialize_with = "util::string_or_number")]
    id: String,
    #[serde(default, deserialize_with = "util::null_as_default")]
    author: User,
    #[serde(default, deserialize_with = "util::null_as_default")]
    content: String,
    #[serde(default, deserialize_with = "util::optional_string_or_number")]
    created_at: Option<String>,
    #[serde(default, deserialize_with = "util::lenient_count")]
    reactions: u64,
    #[serde(default, deserialize_with = "util::null_as_default")]
    liked_by: Vec<Reaction>,
    #[serde(default, deserialize_with = "util::lenient_count")]
    comments: u64,
    #[serde(default, deserialize_with = "util::null_as_default")]
    comments_list: Vec<Comment>,
    #[serde(default, deserialize_with = "util::null_as_default")]
    media_urls: Vec<MediaAttachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<Status>,
}

impl Display for Post {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Post:\nID: {}\nAuthor: {}\nCreated: {:?}\nStatus: {:?}\nReactions: {}\nComments: {}\nMedia: {} attached\nContent:\n{}",
            self.id, self.author, self.created_at, self.status, self.reactions, self.comments, self.media_urls.len(), self.content
        )
    }
}

impl Post {
    pub fn new(id: impl Into<String>, author: User, content: impl Into<String>) -> Self {
        Post {
            id: id.into(),
            author,
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn author(&self) -> &User {
        &self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    pub fn time(&self) -> Option<DateTime<FixedOffset>> {
        self.created_at.as_deref().and_then(util::parse_timestamp)
    }

    /// Epoch milliseconds used for ordering; missing or invalid timestamps are 0.
    pub fn sort_key(&self) -> i64 {
        util::sort_timestamp(self.created_at.as_deref())
    }

    pub fn reactions(&self) -> u64 {
        self.reactions
    }

    pub fn liked_by(&self) -> &[Reaction] {
        &self.liked_by
    }

    pub fn comments(&self) -> u64 {
        self.comments
    }

    pub fn comments_list(&self) -> &[Comment] {
        &self.comments_list
    }

    pub fn media_urls(&self) -> &[MediaAttachment] {
        &self.media_urls
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Only posts flagged `"1"` belong in a feed.
    pub fn is_visible(&self) -> bool {
        self.status.as_ref().is_some_and(Status::is_visible)
    }

    pub fn author_mut(&mut self) -> &mut User {
        &mut self.author
    }

    pub fn media_urls_mut(&mut self) -> &mut [MediaAttachment] {
        &mut self.media_urls
    }

    pub fn liked_by_mut(&mut self) -> &mut [Reaction] {
        &mut self.liked_by
    }

    pub fn comments_list_mut(&mut self) -> &mut [Comment] {
        &mut self.comments_list
    }

    pub fn set_created_at(&mut self, created_at: Option<String>) {
        self.created_at = created_at;
    }

    pub fn set_status(&mut self, status: Option<Status>) {
        self.status = status;
    }

    pub fn set_media_urls(&mut self, media_urls: Vec<MediaAttachment>) {
        self.media_urls = media_urls;
    }

    pub fn set_liked_by(&mut self, liked_by: Vec<Reaction>) {
        self.reactions = liked_by.len() as u64;
        self.liked_by = liked_by;
    }

    pub fn set_comments_list(&mut self, comments_list: Vec<Comment>) {
        self.comments = comments_list.len() as u64;
        self.comments_list = comments_list;
    }

    pub fn summary(&self, len: usize) -> String {
        if self.content.chars().count() <= len {
            return self.content.clone();
        }
        let mut summary: String = self.content.chars().take(len).collect();
        summary.push_str("...");
        summary
    }

    pub fn format_for_display(&self, now: DateTime<Utc>) -> String {
        let mut output = String::new();

        let author = if self.author.username().is_empty() {
            "unknown"
        } else {
            self.author.username()
        };
        output.push_str(&format!(
            "--- {} • {} ---\n",
            author,
            util::time_ago_from(self.created_at(), now)
        ));

        output.push_str(self.content());

        let mut metadata = Vec::new();
        if self.reactions > 0 {
            metadata.push(format!(
                "{} reaction{}",
                self.reactions,
                if self.reactions == 1 { "" } else { "s" }
            ));
        }
        if self.comments > 0 {
            metadata.push(format!(
                "{} comment{}",
                self.comments,
                if self.comments == 1 { "" } else { "s" }
            ));
        }
        if !self.media_urls.is_empty() {
            metadata.push(format!("{} attachment(s)", self.media_urls.len()));
        }
        if !metadata.is_empty() {
            output.push_str(&format!("\n{}", metadata.join(" | ")));
        }

        output
    }
}

/// Body of `POST /posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub user_id: String,
    pub content: String,
    /// References to media that has already been uploaded
    pub media_urls: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"{
        "id": 101,
        "author": {"id": 5, "username": "grace", "profilePicture": "grace.png"},
        "content": "Shipping today",
        "createdAt": "2025-03-01T10:00:00",
        "reactions": 2,
        "likedBy": [
            {"user": {"id": 6, "username": "linus"}, "emoji": "🔥"},
            {"user": {"id": 7, "username": "ken"}, "emoji": "🔥"}
        ],
        "comments": 1,
        "commentsList": [
            {"id": 9, "user": {"id": 6, "username": "linus"}, "content": "nice", "createdAt": null}
        ],
        "mediaUrls": [{"id": 3, "mediaUrl": "launch.jpg", "mediaType": "image"}],
        "status": "1"
    }"#;

    #[test]
    fn test_decode_backend_post() {
        let post: Post = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(post.id(), "101");
        assert_eq!(post.author().username(), "grace");
        assert_eq!(post.reactions(), 2);
        assert_eq!(post.liked_by().len(), 2);
        assert_eq!(post.comments_list()[0].content, "nice");
        assert!(post.comments_list()[0].time().is_none());
        assert_eq!(post.media_urls()[0].media_url(), "launch.jpg");
        assert!(post.is_visible());
        assert!(post.time().is_some());
    }

    #[test]
    fn test_sparse_post_decodes_with_defaults() {
        let post: Post = serde_json::from_str(r#"{"id": "x", "mediaUrls": null, "author": null}"#).unwrap();

        assert!(post.media_urls().is_empty());
        assert_eq!(post.author().id(), "");
        assert_eq!(post.sort_key(), 0);
        assert!(!post.is_visible());
    }

    #[test]
    fn test_float_fields_decode() {
        let post: Post =
            serde_json::from_str(r#"{"id": "x", "status": 1.0, "reactions": 2.0, "comments": -1}"#).unwrap();

        assert!(post.is_visible());
        assert_eq!(post.reactions(), 2);
        assert_eq!(post.comments(), 0);
    }

    #[test]
    fn test_padded_status_text_is_not_visible() {
        for status in ["01", "+1", " 1 "] {
            let json = format!(r#"{{"id": "x", "status": "{status}"}}"#);
            let post: Post = serde_json::from_str(&json).unwrap();
            assert!(!post.is_visible(), "{status:?} should not be visible");
        }
    }

    #[test]
    fn test_visibility_requires_status_one() {
        let mut post = Post::new("1", User::new("u", "u"), "hello");
        assert!(!post.is_visible());

        post.set_status(Some(Status::from("0")));
        assert!(!post.is_visible());

        post.set_status(Some(Status::from("1")));
        assert!(post.is_visible());
    }

    #[test]
    fn test_summary_truncates_on_char_boundaries() {
        let post = Post::new("1", User::default(), "héllo wörld");
        assert_eq!(post.summary(5), "héllo...");
        assert_eq!(post.summary(50), "héllo wörld");
    }

    #[test]
    fn test_format_for_display() {
        let post: Post = serde_json::from_str(SAMPLE).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

        let rendered = post.format_for_display(now);
        assert!(rendered.starts_with("--- grace • 2 hours ago ---\n"));
        assert!(rendered.contains("Shipping today"));
        assert!(rendered.contains("2 reactions | 1 comment | 1 attachment(s)"));
    }

    #[test]
    fn test_new_post_body_is_camel_case() {
        let body = NewPost {
            user_id: "5".to_string(),
            content: "hi".to_string(),
            media_urls: vec!["a.png".to_string()],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"userId": "5", "content": "hi", "mediaUrls": ["a.png"]}));
    }
}
