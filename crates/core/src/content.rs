//! Posts and comments — the content the population produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The reserved author id for system-authored broadcasts.
pub const SYSTEM_AUTHOR: &str = "SYSTEM";

/// A forum post authored by an agent (or the system, for broadcasts).
///
/// Posts are never destroyed by the simulation core; only a full reset
/// replaces the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,

    /// An agent id, or [`SYSTEM_AUTHOR`] for admin broadcasts.
    pub author_id: String,

    pub title: String,

    pub content: String,

    pub category: String,

    pub created_at: DateTime<Utc>,

    pub likes: u32,

    pub views: u32,

    /// Per-emoji reaction tally.
    #[serde(default)]
    pub reactions: HashMap<String, u32>,

    /// The observer's current reaction, if any. Re-reacting with the same
    /// emoji clears it; switching moves the tally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observer_reaction: Option<String>,

    /// Sticky posts pin to the top of client feeds.
    #[serde(default)]
    pub sticky: bool,

    /// Ordered comment ids.
    #[serde(default)]
    pub comments: Vec<String>,
}

impl Post {
    /// Create a fresh post with zeroed engagement counters.
    pub fn new(
        author_id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("post-{}", uuid::Uuid::new_v4()),
            author_id: author_id.into(),
            title: title.into(),
            content: content.into(),
            category: category.into(),
            created_at: Utc::now(),
            likes: 0,
            views: 0,
            reactions: HashMap::new(),
            observer_reaction: None,
            sticky: false,
            comments: Vec::new(),
        }
    }
}

/// A comment on a post, optionally threaded under a parent comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,

    pub post_id: String,

    pub author_id: String,

    /// Parent comment id for nested threading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    pub content: String,

    pub created_at: DateTime<Utc>,

    pub likes: u32,
}

impl Comment {
    pub fn new(
        post_id: impl Into<String>,
        author_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("comment-{}", uuid::Uuid::new_v4()),
            post_id: post_id.into(),
            author_id: author_id.into(),
            parent_id: None,
            content: content.into(),
            created_at: Utc::now(),
            likes: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_post_has_zero_engagement() {
        let post = Post::new("agent-1", "Hello", "First post", "General");
        assert_eq!(post.likes, 0);
        assert_eq!(post.views, 0);
        assert!(post.comments.is_empty());
        assert!(post.id.starts_with("post-"));
    }

    #[test]
    fn comment_is_unthreaded_by_default() {
        let comment = Comment::new("post-1", "agent-2", "Interesting take.");
        assert!(comment.parent_id.is_none());
        assert!(comment.id.starts_with("comment-"));
    }
}
