//! Paginated traversal of a thread's posts.
//!
//! Three orders are supported, each ascending or descending, each resumable
//! from the id of the last post of the previous page:
//!
//! - `flat`: by post id.
//! - `tree`: by materialized path, so every post directly follows its parent
//!   and earlier siblings' subtrees.
//! - `parent_tree`: whole top-level subtrees; `limit` counts top-level posts.
//!   Roots follow the chosen direction, posts inside a subtree are always in
//!   ascending tree order.
//!
//! The cursor post itself is never returned. A cursor that names no post
//! yields an empty page for `tree` and `parent_tree`.

use std::fmt;
use std::str::FromStr;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::post::{rows_into_posts, Post, PostRow, POST_COLUMNS};
use super::DEFAULT_PAGE_LIMIT;
use crate::{AgoraError, Result};

/// Traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Flat,
    Tree,
    ParentTree,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Flat => "flat",
            SortMode::Tree => "tree",
            SortMode::ParentTree => "parent_tree",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = AgoraError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "flat" => Ok(SortMode::Flat),
            "tree" => Ok(SortMode::Tree),
            "parent_tree" => Ok(SortMode::ParentTree),
            _ => Err(AgoraError::BadRequest(format!("unknown sort mode: {s}"))),
        }
    }
}

/// Traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn from_desc(desc: bool) -> Self {
        if desc {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }

    /// Comparison selecting values strictly beyond a cursor.
    fn beyond(self) -> &'static str {
        match self {
            Direction::Asc => " > ",
            Direction::Desc => " < ",
        }
    }
}

/// A page request.
#[derive(Debug, Clone)]
pub struct PostListQuery {
    pub sort: SortMode,
    pub direction: Direction,
    /// Id of the last post of the previous page.
    pub since: Option<i64>,
    pub limit: i64,
}

impl Default for PostListQuery {
    fn default() -> Self {
        Self {
            sort: SortMode::Flat,
            direction: Direction::Asc,
            since: None,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PostListQuery {
    pub fn new(sort: SortMode) -> Self {
        Self {
            sort,
            ..Self::default()
        }
    }

    pub fn desc(mut self, desc: bool) -> Self {
        self.direction = Direction::from_desc(desc);
        self
    }

    pub fn since(mut self, since: i64) -> Self {
        self.since = Some(since);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// The cursor, with 0 meaning none.
    fn cursor(&self) -> Option<i64> {
        self.since.filter(|&id| id != 0)
    }
}

/// Runs paginated post queries against persisted ids and paths.
pub struct TraversalEngine<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TraversalEngine<'a> {
    /// Create a new TraversalEngine with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch one page of posts of a thread.
    pub async fn list(&self, thread_id: i64, query: &PostListQuery) -> Result<Vec<Post>> {
        if query.limit <= 0 {
            return Ok(Vec::new());
        }

        let mut builder = match query.sort {
            SortMode::Flat => flat_query(thread_id, query),
            SortMode::Tree => tree_query(thread_id, query),
            SortMode::ParentTree => parent_tree_query(thread_id, query),
        };

        let rows = builder
            .build_query_as::<PostRow>()
            .fetch_all(self.pool)
            .await?;
        rows_into_posts(rows)
    }
}

fn select_posts() -> QueryBuilder<'static, Sqlite> {
    QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts WHERE "))
}

fn flat_query(thread_id: i64, query: &PostListQuery) -> QueryBuilder<'static, Sqlite> {
    let dir = query.direction;
    let mut builder = select_posts();
    builder.push("thread_id = ").push_bind(thread_id);

    if let Some(since) = query.cursor() {
        builder.push(" AND id").push(dir.beyond()).push_bind(since);
    }

    builder
        .push(format!(" ORDER BY id {} LIMIT ", dir.keyword()))
        .push_bind(query.limit);
    builder
}

fn tree_query(thread_id: i64, query: &PostListQuery) -> QueryBuilder<'static, Sqlite> {
    let dir = query.direction;
    let mut builder = select_posts();
    builder.push("thread_id = ").push_bind(thread_id);

    if let Some(since) = query.cursor() {
        builder
            .push(" AND path")
            .push(dir.beyond())
            .push("(SELECT path FROM posts WHERE id = ")
            .push_bind(since)
            .push(")");
    }

    builder
        .push(format!(" ORDER BY path {} LIMIT ", dir.keyword()))
        .push_bind(query.limit);
    builder
}

fn parent_tree_query(thread_id: i64, query: &PostListQuery) -> QueryBuilder<'static, Sqlite> {
    let dir = query.direction;
    let mut builder = select_posts();
    builder
        .push("root_id IN (SELECT id FROM posts WHERE thread_id = ")
        .push_bind(thread_id)
        .push(" AND parent = 0");

    if let Some(since) = query.cursor() {
        builder
            .push(" AND root_id")
            .push(dir.beyond())
            .push("(SELECT root_id FROM posts WHERE id = ")
            .push_bind(since)
            .push(")");
    }

    builder
        .push(format!(" ORDER BY id {} LIMIT ", dir.keyword()))
        .push_bind(query.limit)
        .push(format!(") ORDER BY root_id {}, path ASC", dir.keyword()));
    builder
}
