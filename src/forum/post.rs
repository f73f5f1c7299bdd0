//! Post model for agora.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::path::PostPath;
use crate::Result;

/// A post in a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    /// Unique post ID, increasing in creation order.
    pub id: i64,
    /// ID of the post this replies to (0 = top level).
    pub parent: i64,
    /// Materialized ancestry path.
    #[serde(skip)]
    pub path: PostPath,
    /// Nickname of the author.
    pub author: String,
    pub message: String,
    #[serde(rename = "isEdited")]
    pub is_edited: bool,
    /// Slug of the forum.
    pub forum: String,
    #[serde(rename = "thread")]
    pub thread_id: i64,
    pub created: DateTime<Utc>,
}

/// Data for creating a new post.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// ID of the post to reply to (0 = top level).
    pub parent: i64,
    /// Nickname of the author.
    pub author: String,
    pub message: String,
    /// Creation time; defaults to the batch's shared timestamp.
    pub created: Option<DateTime<Utc>>,
}

impl NewPost {
    /// Create a top-level post.
    pub fn new(author: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            parent: 0,
            author: author.into(),
            message: message.into(),
            created: None,
        }
    }

    /// Create a reply to `parent`.
    pub fn reply(parent: i64, author: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            parent,
            ..Self::new(author, message)
        }
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }
}

/// Column list matching [`PostRow`].
pub(crate) const POST_COLUMNS: &str =
    "id, parent, path, author, message, is_edited, forum, thread_id, created";

/// Internal struct for mapping database rows to Post.
#[derive(sqlx::FromRow)]
pub(crate) struct PostRow {
    id: i64,
    parent: i64,
    path: Vec<u8>,
    author: String,
    message: String,
    is_edited: bool,
    forum: String,
    thread_id: i64,
    created: DateTime<Utc>,
}

impl PostRow {
    pub(crate) fn into_post(self) -> Result<Post> {
        Ok(Post {
            id: self.id,
            parent: self.parent,
            path: PostPath::from_bytes(&self.path)?,
            author: self.author,
            message: self.message,
            is_edited: self.is_edited,
            forum: self.forum,
            thread_id: self.thread_id,
            created: self.created,
        })
    }
}

/// Convert a batch of rows, failing on the first malformed path.
pub(crate) fn rows_into_posts(rows: Vec<PostRow>) -> Result<Vec<Post>> {
    rows.into_iter().map(PostRow::into_post).collect()
}
