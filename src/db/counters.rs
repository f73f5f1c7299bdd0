//! Denormalized aggregate counters.
//!
//! Forum thread/post counts and the global stats row are only ever changed
//! through [`CounterLedger::apply`], inside the transaction that creates the
//! counted rows. Every change is an in-place `col = col + delta` update, so
//! concurrent writers never lose increments.

use serde::Serialize;
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqliteConnection;

use crate::{AgoraError, Result};

/// A counter change caused by a create operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterDelta {
    /// A user was created.
    User,
    /// A forum was created.
    Forum,
    /// A thread was created in the forum.
    Thread { forum_id: i64 },
    /// A batch of `count` posts was created in the forum.
    Posts { forum_id: i64, count: i64 },
}

/// Global row counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct GlobalStats {
    #[serde(rename = "user")]
    pub users: i64,
    #[serde(rename = "forum")]
    pub forums: i64,
    #[serde(rename = "thread")]
    pub threads: i64,
    #[serde(rename = "post")]
    pub posts: i64,
}

impl GlobalStats {
    /// Read the current global counters.
    pub async fn load<'e>(executor: impl SqliteExecutor<'e>) -> Result<Self> {
        let stats = sqlx::query_as::<_, GlobalStats>(
            "SELECT users, forums, threads, posts FROM stats WHERE id = 1",
        )
        .fetch_one(executor)
        .await?;
        Ok(stats)
    }
}

/// Applies counter deltas within the caller's transaction.
pub struct CounterLedger;

impl CounterLedger {
    /// Apply a delta to the forum and global counters.
    ///
    /// Fails with `NotFound("forum")` if the forum row does not exist.
    pub async fn apply(conn: &mut SqliteConnection, delta: CounterDelta) -> Result<()> {
        match delta {
            CounterDelta::User => Self::bump_global(conn, "users", 1).await,
            CounterDelta::Forum => Self::bump_global(conn, "forums", 1).await,
            CounterDelta::Thread { forum_id } => {
                Self::bump_forum(conn, forum_id, "threads", 1).await?;
                Self::bump_global(conn, "threads", 1).await
            }
            CounterDelta::Posts { forum_id, count } => {
                Self::bump_forum(conn, forum_id, "posts", count).await?;
                Self::bump_global(conn, "posts", count).await
            }
        }
    }

    /// Zero every forum and global counter.
    ///
    /// Only valid together with deleting all counted rows.
    pub async fn reset(conn: &mut SqliteConnection) -> Result<()> {
        sqlx::query("UPDATE forums SET threads = 0, posts = 0")
            .execute(&mut *conn)
            .await?;
        sqlx::query("UPDATE stats SET users = 0, forums = 0, threads = 0, posts = 0 WHERE id = 1")
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    // `column` always comes from the match arms above, never from input.
    async fn bump_forum(
        conn: &mut SqliteConnection,
        forum_id: i64,
        column: &'static str,
        delta: i64,
    ) -> Result<()> {
        let sql = format!("UPDATE forums SET {column} = {column} + ? WHERE id = ?");
        let result = sqlx::query(&sql)
            .bind(delta)
            .bind(forum_id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AgoraError::not_found("forum"));
        }
        Ok(())
    }

    async fn bump_global(
        conn: &mut SqliteConnection,
        column: &'static str,
        delta: i64,
    ) -> Result<()> {
        let sql = format!("UPDATE stats SET {column} = {column} + ? WHERE id = 1");
        sqlx::query(&sql).bind(delta).execute(&mut *conn).await?;
        Ok(())
    }
}
