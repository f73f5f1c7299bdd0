//! Post repository for agora.
//!
//! Posts are append-only. A batch insert is one transaction: it assigns ids
//! and paths, writes the rows, records forum membership and bumps the post
//! counters, or writes nothing at all.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::path::{PathAssigner, PostPath};
use super::post::{NewPost, Post, PostRow, POST_COLUMNS};
use super::repository::add_members;
use super::resolve::ThreadKey;
use crate::datetime::{self, to_db_timestamp};
use crate::db::{CounterDelta, CounterLedger};
use crate::{AgoraError, Result};

/// Rows per multi-row statement, well below SQLite's bind parameter limit.
const BATCH_CHUNK: usize = 500;

/// Repository for post operations.
pub struct PostRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PostRepository<'a> {
    /// Create a new PostRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a batch of posts into a thread.
    ///
    /// Fails with `Conflict` if a parent is neither a post of this thread nor
    /// an earlier post of the batch, and with `NotFound` for an unknown
    /// author. Returns the posts in input order.
    pub async fn insert_batch(&self, thread: &ThreadKey, posts: &[NewPost]) -> Result<Vec<Post>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;

        // Counter bump first so the write lock is held for everything below
        CounterLedger::apply(
            &mut tx,
            CounterDelta::Posts {
                forum_id: thread.forum_id,
                count: posts.len() as i64,
            },
        )
        .await?;

        let mut assigner = PathAssigner::new();
        for (id, path) in load_parent_paths(&mut tx, thread.id, posts).await? {
            assigner.seed(id, path);
        }
        let authors = load_authors(&mut tx, posts).await?;

        let max_id: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) FROM posts")
            .fetch_one(&mut *tx)
            .await?;
        let now = datetime::now();

        let mut inserted = Vec::with_capacity(posts.len());
        let mut row_authors = Vec::with_capacity(posts.len());
        for (offset, new_post) in posts.iter().enumerate() {
            let id = max_id + 1 + offset as i64;

            if new_post.parent != 0 && !assigner.knows(new_post.parent) {
                return Err(AgoraError::Conflict(format!(
                    "parent post {} is not in thread {}",
                    new_post.parent, thread.id
                )));
            }
            let (author_id, author) = authors
                .get(&new_post.author.to_ascii_lowercase())
                .cloned()
                .ok_or_else(|| AgoraError::not_found("user"))?;

            row_authors.push(author_id);
            inserted.push(Post {
                id,
                parent: new_post.parent,
                path: assigner.assign(id, new_post.parent),
                author,
                message: new_post.message.clone(),
                is_edited: false,
                forum: thread.forum.clone(),
                thread_id: thread.id,
                created: new_post.created.map(|c| datetime::truncate(&c)).unwrap_or(now),
            });
        }

        for (chunk, chunk_authors) in inserted
            .chunks(BATCH_CHUNK)
            .zip(row_authors.chunks(BATCH_CHUNK))
        {
            insert_rows(&mut tx, chunk, chunk_authors).await?;
        }

        let mut author_ids = row_authors;
        author_ids.sort_unstable();
        author_ids.dedup();
        add_members(&mut tx, thread.forum_id, &author_ids).await?;
        tx.commit().await?;

        info!(
            "Inserted {} posts into thread {} (ids {}..={})",
            inserted.len(),
            thread.id,
            max_id + 1,
            max_id + inserted.len() as i64
        );
        Ok(inserted)
    }

    /// Replace a post's message.
    ///
    /// A missing or identical message leaves the post untouched. Returns the
    /// current post either way.
    pub async fn update_message(&self, id: i64, message: Option<&str>) -> Result<Post> {
        if let Some(message) = message {
            let updated = sqlx::query_as::<_, PostRow>(&format!(
                "UPDATE posts SET message = ?, is_edited = 1
                 WHERE id = ? AND message <> ?
                 RETURNING {POST_COLUMNS}"
            ))
            .bind(message)
            .bind(id)
            .bind(message)
            .fetch_optional(self.pool)
            .await?;

            if let Some(row) = updated {
                debug!("Edited post {}", id);
                return row.into_post();
            }
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AgoraError::not_found("post"))
    }

    /// Get a post by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(PostRow::into_post).transpose()
    }
}

/// Stored paths of the existing posts of `thread_id` that the batch replies to.
async fn load_parent_paths(
    conn: &mut SqliteConnection,
    thread_id: i64,
    posts: &[NewPost],
) -> Result<Vec<(i64, PostPath)>> {
    let mut parents: Vec<i64> = posts.iter().map(|p| p.parent).filter(|&p| p != 0).collect();
    parents.sort_unstable();
    parents.dedup();

    let mut found = Vec::with_capacity(parents.len());
    for chunk in parents.chunks(BATCH_CHUNK) {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, path FROM posts WHERE thread_id = ");
        builder.push_bind(thread_id);
        builder.push(" AND id IN (");
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows = builder
            .build_query_as::<(i64, Vec<u8>)>()
            .fetch_all(&mut *conn)
            .await?;
        for (id, path) in rows {
            found.push((id, PostPath::from_bytes(&path)?));
        }
    }

    Ok(found)
}

/// Author ids and canonical nicknames keyed by ASCII-lowercased nickname.
async fn load_authors(
    conn: &mut SqliteConnection,
    posts: &[NewPost],
) -> Result<HashMap<String, (i64, String)>> {
    let mut names: Vec<String> = posts
        .iter()
        .map(|p| p.author.to_ascii_lowercase())
        .collect();
    names.sort_unstable();
    names.dedup();

    let mut authors = HashMap::with_capacity(names.len());
    for chunk in names.chunks(BATCH_CHUNK) {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, nickname FROM users WHERE nickname IN (");
        let mut separated = builder.separated(", ");
        for name in chunk {
            separated.push_bind(name.as_str());
        }
        separated.push_unseparated(")");

        let rows = builder
            .build_query_as::<(i64, String)>()
            .fetch_all(&mut *conn)
            .await?;
        for (id, nickname) in rows {
            authors.insert(nickname.to_ascii_lowercase(), (id, nickname));
        }
    }

    Ok(authors)
}

async fn insert_rows(conn: &mut SqliteConnection, posts: &[Post], author_ids: &[i64]) -> Result<()> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "INSERT INTO posts (id, parent, path, root_id, thread_id, forum, author_id, author, message, created) ",
    );
    builder.push_values(posts.iter().zip(author_ids), |mut row, (post, author_id)| {
        row.push_bind(post.id)
            .push_bind(post.parent)
            .push_bind(post.path.to_bytes())
            .push_bind(post.path.top_level_id())
            .push_bind(post.thread_id)
            .push_bind(post.forum.clone())
            .push_bind(*author_id)
            .push_bind(post.author.clone())
            .push_bind(post.message.clone())
            .push_bind(to_db_timestamp(&post.created));
    });
    builder.build().execute(&mut *conn).await?;
    Ok(())
}
