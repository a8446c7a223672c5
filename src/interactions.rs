//! Reaction and comment affordances shown under each post.

use crate::post::Post;
use crate::util;

/// Emojis offered by the compose form and the reaction picker.
pub const EMOJI_PALETTE: [&str; 8] = ["😀", "😂", "❤️", "👍", "🎉", "🔥", "💯", "🚀"];

/// Reactions on a post grouped by emoji, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReactionSummary {
    pub counts: Vec<(String, usize)>,
}

impl ReactionSummary {
    pub fn from_post(post: &Post) -> Self {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for reaction in post.liked_by() {
            match counts.iter_mut().find(|(emoji, _)| *emoji == reaction.emoji) {
                Some((_, count)) => *count += 1,
                None => counts.push((reaction.emoji.clone(), 1)),
            }
        }
        ReactionSummary { counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn count_for(&self, emoji: &str) -> usize {
        self.counts
            .iter()
            .find(|(e, _)| e == emoji)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// The emoji `user_id` reacted with, if any.
pub fn reaction_of<'a>(post: &'a Post, user_id: &str) -> Option<&'a str> {
    post.liked_by()
        .iter()
        .find(|reaction| reaction.user.id() == user_id)
        .map(|reaction| reaction.emoji.as_str())
}

/// The comment box; at most one post has it open at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentDraft {
    active_post_id: Option<String>,
    pub text: String,
    pub cursor: usize,
}

impl CommentDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_post_id(&self) -> Option<&str> {
        self.active_post_id.as_deref()
    }

    pub fn is_open_for(&self, post_id: &str) -> bool {
        self.active_post_id.as_deref() == Some(post_id)
    }

    /// Open the box for `post_id`, or close it if it is already open there.
    /// Moving to another post discards the text typed so far.
    pub fn toggle(&mut self, post_id: &str) {
        if self.is_open_for(post_id) {
            self.active_post_id = None;
        } else {
            self.active_post_id = Some(post_id.to_string());
            self.text.clear();
            self.cursor = 0;
        }
    }

    pub fn handle_input(&mut self, c: char) {
        let mut buf = [0u8; 4];
        util::insert_at_cursor(&mut self.text, &mut self.cursor, c.encode_utf8(&mut buf));
    }

    pub fn insert_emoji(&mut self, emoji: &str) {
        util::insert_at_cursor(&mut self.text, &mut self.cursor, emoji);
    }

    pub fn handle_backspace(&mut self) {
        util::backspace_at_cursor(&mut self.text, &mut self.cursor);
    }

    pub fn is_ready_to_submit(&self) -> bool {
        self.active_post_id.is_some() && !self.text.trim().is_empty()
    }
}
