//! Turns stored media and avatar references into absolute URLs.

use crate::config::FeedConfig;
use crate::post::Post;
use crate::user::User;

#[derive(Debug, Clone, PartialEq)]
pub struct MediaResolver {
    base_url: String,
    default_avatar_url: String,
}

impl MediaResolver {
    pub fn new(base_url: impl Into<String>, default_avatar_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            default_avatar_url: default_avatar_url.into(),
        }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(&config.media_base_url, &config.default_avatar_url)
    }

    pub fn default_avatar_url(&self) -> &str {
        &self.default_avatar_url
    }

    /// Absolute references (anything starting with "http") pass through,
    /// relative ones get the CDN base, and missing ones fall back to the
    /// default avatar.
    pub fn resolve(&self, reference: Option<&str>) -> String {
        match reference {
            None | Some("") => self.default_avatar_url.clone(),
            Some(url) if url.starts_with("http") => url.to_string(),
            Some(relative) => format!("{}{}", self.base_url, relative),
        }
    }

    pub fn resolve_user(&self, user: &mut User) {
        let resolved = self.resolve(user.profile_picture());
        user.set_profile_picture(Some(resolved));
    }

    /// Resolve every avatar and attachment reachable from a post.
    pub fn resolve_post(&self, mut post: Post) -> Post {
        self.resolve_user(post.author_mut());

        for media in post.media_urls_mut() {
            let resolved = self.resolve(Some(media.media_url()));
            media.set_media_url(resolved);
        }
        for reaction in post.liked_by_mut() {
            self.resolve_user(&mut reaction.user);
        }
        for comment in post.comments_list_mut() {
            self.resolve_user(&mut comment.user);
        }

        post
    }
}

impl Default for MediaResolver {
    fn default() -> Self {
        Self::from_config(&FeedConfig::default())
    }
}
