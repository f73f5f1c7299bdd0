//! Forum repository for agora.
//!
//! This module provides forum creation, lookup and the forum membership list.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::resolve::resolve_user;
use super::types::{Forum, ForumUsersQuery, NewForum};
use crate::db::{CounterDelta, CounterLedger, CreateOutcome, User};
use crate::{AgoraError, Result};

const FORUM_COLUMNS: &str = "id, slug, title, owner, threads, posts";

/// Repository for forum operations.
pub struct ForumRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ForumRepository<'a> {
    /// Create a new ForumRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new forum owned by an existing user.
    ///
    /// Fails with `NotFound` if the owner does not exist. If the slug is
    /// taken, nothing is written and the existing forum is returned.
    pub async fn create(&self, new_forum: &NewForum) -> Result<CreateOutcome<Forum>> {
        let mut tx = self.pool.begin().await?;

        // Owner lookup and insert in one statement; no row means either the
        // owner is missing or the slug is taken.
        let inserted = sqlx::query_as::<_, Forum>(&format!(
            "INSERT INTO forums (slug, title, owner_id, owner)
             SELECT ?, ?, id, nickname FROM users WHERE nickname = ?
             ON CONFLICT DO NOTHING
             RETURNING {FORUM_COLUMNS}"
        ))
        .bind(&new_forum.slug)
        .bind(&new_forum.title)
        .bind(&new_forum.user)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(forum) = inserted else {
            drop(tx);
            resolve_user(self.pool, &new_forum.user).await?;
            debug!("Forum {} already exists", new_forum.slug);
            let existing = self
                .get_by_slug(&new_forum.slug)
                .await?
                .ok_or_else(|| AgoraError::Database("forum insert skipped".to_string()))?;
            return Ok(CreateOutcome::Exists(existing));
        };

        CounterLedger::apply(&mut tx, CounterDelta::Forum).await?;
        tx.commit().await?;

        info!("Created forum {} owned by {}", forum.slug, forum.user);
        Ok(CreateOutcome::Created(forum))
    }

    /// Get a forum by slug (case-insensitive).
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Forum>> {
        let forum = sqlx::query_as::<_, Forum>(&format!(
            "SELECT {FORUM_COLUMNS} FROM forums WHERE slug = ?"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(forum)
    }

    /// List users who created a thread or post in the forum, by nickname.
    pub async fn list_users(&self, forum_id: i64, query: &ForumUsersQuery) -> Result<Vec<User>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT u.id, u.nickname, u.fullname, u.about, u.email
             FROM forum_users fu JOIN users u ON u.id = fu.user_id
             WHERE fu.forum_id = ",
        );
        builder.push_bind(forum_id);

        if let Some(ref since) = query.since {
            builder.push(if query.desc {
                " AND u.nickname < "
            } else {
                " AND u.nickname > "
            });
            builder.push_bind(since);
        }

        builder.push(if query.desc {
            " ORDER BY u.nickname DESC"
        } else {
            " ORDER BY u.nickname ASC"
        });
        builder.push(" LIMIT ");
        builder.push_bind(query.limit);

        let users = builder
            .build_query_as::<User>()
            .fetch_all(self.pool)
            .await?;

        Ok(users)
    }
}

/// Record forum membership for each user; existing memberships are kept.
pub(crate) async fn add_members(
    conn: &mut SqliteConnection,
    forum_id: i64,
    user_ids: &[i64],
) -> Result<()> {
    if user_ids.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO forum_users (forum_id, user_id) ");
    builder.push_values(user_ids, |mut row, user_id| {
        row.push_bind(forum_id).push_bind(*user_id);
    });
    builder.push(" ON CONFLICT (forum_id, user_id) DO NOTHING");
    builder.build().execute(&mut *conn).await?;

    Ok(())
}
