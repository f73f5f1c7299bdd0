//! Thread repository for agora.
//!
//! This module provides thread creation, lookup, update and per-forum listing.

use sqlx::sqlite::SqliteExecutor;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use super::repository::add_members;
use super::resolve::{resolve_forum, resolve_user};
use super::thread::{NewThread, Thread, ThreadListQuery, ThreadRef, ThreadUpdate};
use crate::datetime::{self, to_db_timestamp};
use crate::db::{CounterDelta, CounterLedger, CreateOutcome};
use crate::{AgoraError, Result};

pub(crate) const THREAD_COLUMNS: &str =
    "id, forum_id, forum, author, title, message, slug, votes, created";

/// Fetch a thread by ID with any executor (pool or open transaction).
pub(crate) async fn fetch_thread<'e>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<Option<Thread>> {
    let thread = sqlx::query_as::<_, Thread>(&format!(
        "SELECT {THREAD_COLUMNS} FROM threads WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(thread)
}

/// Repository for thread operations.
pub struct ThreadRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ThreadRepository<'a> {
    /// Create a new ThreadRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new thread in a forum.
    ///
    /// Fails with `NotFound` for an unknown author or forum. If the thread
    /// slug is taken, nothing is written and the existing thread is returned.
    pub async fn create(
        &self,
        forum_slug: &str,
        new_thread: &NewThread,
    ) -> Result<CreateOutcome<Thread>> {
        let author = resolve_user(self.pool, &new_thread.author).await?;
        if let Some(ref slug) = new_thread.slug {
            if let Some(existing) = self.get_by_slug(slug).await? {
                debug!("Thread {} already exists", slug);
                return Ok(CreateOutcome::Exists(existing));
            }
        }
        let forum = resolve_forum(self.pool, forum_slug).await?;

        let created = new_thread.created.unwrap_or_else(datetime::now);

        let mut tx = self.pool.begin().await?;
        CounterLedger::apply(&mut tx, CounterDelta::Thread { forum_id: forum.id }).await?;

        let inserted = sqlx::query_as::<_, Thread>(&format!(
            "INSERT INTO threads (forum_id, forum, author_id, author, title, message, slug, created)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {THREAD_COLUMNS}"
        ))
        .bind(forum.id)
        .bind(&forum.slug)
        .bind(author.id)
        .bind(&author.nickname)
        .bind(&new_thread.title)
        .bind(&new_thread.message)
        .bind(&new_thread.slug)
        .bind(to_db_timestamp(&created))
        .fetch_one(&mut *tx)
        .await;

        let thread = match inserted {
            Ok(thread) => thread,
            // Slug taken by a concurrent create
            Err(e) => match (AgoraError::from(e), new_thread.slug.as_deref()) {
                (AgoraError::Conflict(msg), Some(slug)) => {
                    drop(tx);
                    return match self.get_by_slug(slug).await? {
                        Some(existing) => Ok(CreateOutcome::Exists(existing)),
                        None => Err(AgoraError::Conflict(msg)),
                    };
                }
                (err, _) => return Err(err),
            },
        };

        add_members(&mut tx, forum.id, &[author.id]).await?;
        tx.commit().await?;

        info!(
            "Created thread {} in {} by {}",
            thread.id, thread.forum, thread.author
        );
        Ok(CreateOutcome::Created(thread))
    }

    /// Get a thread by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Thread>> {
        fetch_thread(self.pool, id).await
    }

    /// Get a thread by slug (case-insensitive).
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Thread>> {
        let thread = sqlx::query_as::<_, Thread>(&format!(
            "SELECT {THREAD_COLUMNS} FROM threads WHERE slug = ?"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(thread)
    }

    /// Get a thread by id or slug.
    pub async fn get(&self, thread: &ThreadRef) -> Result<Option<Thread>> {
        match thread {
            ThreadRef::Id(id) => self.get_by_id(*id).await,
            ThreadRef::Slug(slug) => self.get_by_slug(slug).await,
        }
    }

    /// Update a thread's title and/or message.
    ///
    /// Only fields that are set in the update will be modified.
    pub async fn update(&self, thread: &ThreadRef, update: &ThreadUpdate) -> Result<Thread> {
        if update.is_empty() {
            return self
                .get(thread)
                .await?
                .ok_or_else(|| AgoraError::not_found("thread"));
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE threads SET ");
        let mut separated = query.separated(", ");

        if let Some(ref title) = update.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title);
        }
        if let Some(ref message) = update.message {
            separated.push("message = ");
            separated.push_bind_unseparated(message);
        }

        match thread {
            ThreadRef::Id(id) => {
                query.push(" WHERE id = ");
                query.push_bind(*id);
            }
            ThreadRef::Slug(slug) => {
                query.push(" WHERE slug = ");
                query.push_bind(slug);
            }
        }
        query.push(format!(" RETURNING {THREAD_COLUMNS}"));

        let updated = query
            .build_query_as::<Thread>()
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| AgoraError::not_found("thread"))?;

        debug!("Updated thread {}", updated.id);
        Ok(updated)
    }

    /// List threads of a forum by creation time.
    ///
    /// `since` is inclusive: `created >= since` ascending, `<=` descending.
    pub async fn list_by_forum(
        &self,
        forum_id: i64,
        query: &ThreadListQuery,
    ) -> Result<Vec<Thread>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {THREAD_COLUMNS} FROM threads WHERE forum_id = "
        ));
        builder.push_bind(forum_id);

        if let Some(since) = query.since {
            builder.push(if query.desc {
                " AND created <= "
            } else {
                " AND created >= "
            });
            builder.push_bind(to_db_timestamp(&since));
        }

        builder.push(if query.desc {
            " ORDER BY created DESC, id DESC"
        } else {
            " ORDER BY created ASC, id ASC"
        });
        builder.push(" LIMIT ");
        builder.push_bind(query.limit);

        let threads = builder
            .build_query_as::<Thread>()
            .fetch_all(self.pool)
            .await?;

        Ok(threads)
    }
}
