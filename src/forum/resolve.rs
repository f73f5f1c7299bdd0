//! Resolution of external identifiers to internal keys.
//!
//! Nicknames and slugs are matched case-insensitively; the returned keys carry
//! the canonical stored spelling.

use sqlx::sqlite::SqliteExecutor;

use super::thread::ThreadRef;
use crate::{AgoraError, Result};

/// A resolved user.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserKey {
    pub id: i64,
    pub nickname: String,
}

/// A resolved forum.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ForumKey {
    pub id: i64,
    pub slug: String,
}

/// A resolved thread with the forum it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ThreadKey {
    pub id: i64,
    pub forum_id: i64,
    /// Canonical forum slug.
    pub forum: String,
}

/// Resolve a nickname to a user.
pub async fn resolve_user<'e>(executor: impl SqliteExecutor<'e>, nickname: &str) -> Result<UserKey> {
    sqlx::query_as::<_, UserKey>("SELECT id, nickname FROM users WHERE nickname = ?")
        .bind(nickname)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AgoraError::not_found("user"))
}

/// Resolve a forum slug.
pub async fn resolve_forum<'e>(executor: impl SqliteExecutor<'e>, slug: &str) -> Result<ForumKey> {
    sqlx::query_as::<_, ForumKey>("SELECT id, slug FROM forums WHERE slug = ?")
        .bind(slug)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AgoraError::not_found("forum"))
}

/// Resolve a thread by id or slug.
pub async fn resolve_thread<'e>(
    executor: impl SqliteExecutor<'e>,
    thread: &ThreadRef,
) -> Result<ThreadKey> {
    let key = match thread {
        ThreadRef::Id(id) => {
            sqlx::query_as::<_, ThreadKey>("SELECT id, forum_id, forum FROM threads WHERE id = ?")
                .bind(id)
                .fetch_optional(executor)
                .await?
        }
        ThreadRef::Slug(slug) => {
            sqlx::query_as::<_, ThreadKey>(
                "SELECT id, forum_id, forum FROM threads WHERE slug = ?",
            )
            .bind(slug)
            .fetch_optional(executor)
            .await?
        }
    };

    key.ok_or_else(|| AgoraError::not_found("thread"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forum::test_support::{seed_forum, seed_thread, seed_user};
    use crate::Database;

    #[tokio::test]
    async fn test_resolve_user_canonical_case() {
        let db = Database::open_in_memory().await.unwrap();
        seed_user(&db, "Alice").await;

        let key = resolve_user(db.pool(), "ALICE").await.unwrap();
        assert_eq!(key.nickname, "Alice");

        let missing = resolve_user(db.pool(), "bob").await;
        assert!(matches!(missing, Err(AgoraError::NotFound(ref what)) if what == "user"));
    }

    #[tokio::test]
    async fn test_resolve_forum() {
        let db = Database::open_in_memory().await.unwrap();
        seed_user(&db, "alice").await;
        seed_forum(&db, "Rust-Lang", "alice").await;

        let key = resolve_forum(db.pool(), "rust-lang").await.unwrap();
        assert_eq!(key.slug, "Rust-Lang");
        assert!(resolve_forum(db.pool(), "go").await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_thread_by_id_and_slug() {
        let db = Database::open_in_memory().await.unwrap();
        seed_user(&db, "alice").await;
        seed_forum(&db, "rust", "alice").await;
        let thread = seed_thread(&db, "rust", "alice", Some("Intro")).await;

        let by_id = resolve_thread(db.pool(), &ThreadRef::Id(thread.id)).await.unwrap();
        let by_slug = resolve_thread(db.pool(), &ThreadRef::parse("intro")).await.unwrap();
        assert_eq!(by_id, by_slug);
        assert_eq!(by_id.forum, "rust");

        let missing = resolve_thread(db.pool(), &ThreadRef::Id(999)).await;
        assert!(matches!(missing, Err(AgoraError::NotFound(ref what)) if what == "thread"));
    }
}
