//! Thread voting.
//!
//! Each user holds at most one vote per thread. `threads.votes` is kept equal
//! to the sum of the thread's votes by adjusting it with the difference
//! between the new and previous vote.

use sqlx::SqlitePool;
use tracing::debug;

use super::resolve::{ThreadKey, UserKey};
use super::thread::Thread;
use super::thread_repository::{fetch_thread, THREAD_COLUMNS};
use crate::{AgoraError, Result};

/// A single vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Voice {
    Up,
    Down,
}

impl Voice {
    pub fn value(self) -> i64 {
        match self {
            Voice::Up => 1,
            Voice::Down => -1,
        }
    }
}

impl TryFrom<i64> for Voice {
    type Error = AgoraError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(Voice::Up),
            -1 => Ok(Voice::Down),
            _ => Err(AgoraError::BadRequest(format!(
                "voice must be 1 or -1, got {value}"
            ))),
        }
    }
}

/// One-vote-per-user ledger with the running total on the thread.
pub struct VoteLedger<'a> {
    pool: &'a SqlitePool,
}

impl<'a> VoteLedger<'a> {
    /// Create a new VoteLedger with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Cast or change a user's vote on a thread and return the thread.
    ///
    /// Repeating the current vote writes nothing.
    pub async fn vote(&self, thread: &ThreadKey, user: &UserKey, voice: Voice) -> Result<Thread> {
        let requested = voice.value();
        let mut tx = self.pool.begin().await?;

        // The insert takes the write lock, so the previous vote read below
        // cannot change before this transaction commits.
        let inserted = sqlx::query(
            "INSERT INTO thread_votes (thread_id, user_id, voice) VALUES (?, ?, ?)
             ON CONFLICT (thread_id, user_id) DO NOTHING",
        )
        .bind(thread.id)
        .bind(user.id)
        .bind(requested)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let delta = if inserted == 1 {
            requested
        } else {
            let previous: i64 = sqlx::query_scalar(
                "SELECT voice FROM thread_votes WHERE thread_id = ? AND user_id = ?",
            )
            .bind(thread.id)
            .bind(user.id)
            .fetch_one(&mut *tx)
            .await?;

            if previous == requested {
                let current = fetch_thread(&mut *tx, thread.id).await?;
                tx.commit().await?;
                return current.ok_or_else(|| AgoraError::not_found("thread"));
            }

            sqlx::query("UPDATE thread_votes SET voice = ? WHERE thread_id = ? AND user_id = ?")
                .bind(requested)
                .bind(thread.id)
                .bind(user.id)
                .execute(&mut *tx)
                .await?;
            requested - previous
        };

        let updated = sqlx::query_as::<_, Thread>(&format!(
            "UPDATE threads SET votes = votes + ? WHERE id = ? RETURNING {THREAD_COLUMNS}"
        ))
        .bind(delta)
        .bind(thread.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AgoraError::not_found("thread"))?;

        tx.commit().await?;

        debug!(
            "{} voted {} on thread {} (delta {})",
            user.nickname, requested, thread.id, delta
        );
        Ok(updated)
    }
}
