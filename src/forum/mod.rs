//! Forum module for agora.
//!
//! This module provides the discussion content of the store:
//! - Forums, threads and forum membership
//! - Nested posts with materialized paths and batched atomic insertion
//! - Cursor-paginated traversal in flat, tree and parent_tree order
//! - One-vote-per-user thread voting
//! - The service facade used by the HTTP API

mod details;
mod path;
mod post;
mod post_repository;
mod repository;
mod resolve;
mod service;
mod thread;
mod thread_repository;
mod traversal;
mod types;
mod vote;

#[cfg(test)]
pub(crate) mod test_support;

pub use details::{PostDetails, RelatedSet};
pub use path::{PathAssigner, PostPath};
pub use post::{NewPost, Post};
pub use post_repository::PostRepository;
pub use repository::ForumRepository;
pub use resolve::{resolve_forum, resolve_thread, resolve_user, ForumKey, ThreadKey, UserKey};
pub use service::ForumService;
pub use thread::{NewThread, Thread, ThreadListQuery, ThreadRef, ThreadUpdate};
pub use thread_repository::ThreadRepository;
pub use traversal::{Direction, PostListQuery, SortMode, TraversalEngine};
pub use types::{Forum, ForumUsersQuery, NewForum};
pub use vote::{Voice, VoteLedger};

/// Page size used when a list request gives no limit.
pub const DEFAULT_PAGE_LIMIT: i64 = 100;
