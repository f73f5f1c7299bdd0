//! Post details with optionally embedded related entities.

use serde::Serialize;

use super::post::Post;
use super::thread::Thread;
use super::types::Forum;
use crate::db::User;

/// Which related entities to embed alongside a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelatedSet {
    pub user: bool,
    pub thread: bool,
    pub forum: bool,
}

impl RelatedSet {
    /// Parse a comma-separated list such as `user,thread`.
    ///
    /// Unknown tokens are ignored.
    pub fn parse(list: &str) -> Self {
        list.split(',').map(str::trim).fold(Self::default(), |mut set, token| {
            match token {
                "user" => set.user = true,
                "thread" => set.thread = true,
                "forum" => set.forum = true,
                _ => {}
            }
            set
        })
    }

    pub fn all() -> Self {
        Self {
            user: true,
            thread: true,
            forum: true,
        }
    }
}

/// A post with the related entities that were asked for.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetails {
    pub post: Post,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<Thread>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forum: Option<Forum>,
}
