//! User repository for agora.
//!
//! This module provides create, lookup and profile update for users.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use super::counters::{CounterDelta, CounterLedger};
use super::user::{NewUser, User, UserUpdate};
use super::CreateOutcome;
use crate::{AgoraError, Result};

const USER_COLUMNS: &str = "id, nickname, fullname, about, email";

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// If the nickname or email is already taken, nothing is written and every
    /// user holding either of them is returned.
    pub async fn create(&self, new_user: &NewUser) -> Result<CreateOutcome<User, Vec<User>>> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (nickname, fullname, about, email) VALUES (?, ?, ?, ?)
             ON CONFLICT DO NOTHING
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new_user.nickname)
        .bind(&new_user.fullname)
        .bind(&new_user.about)
        .bind(&new_user.email)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user) = inserted else {
            drop(tx);
            debug!("User {} already exists", new_user.nickname);
            let existing = self
                .find_conflicting(&new_user.nickname, &new_user.email)
                .await?;
            return Ok(CreateOutcome::Exists(existing));
        };

        CounterLedger::apply(&mut tx, CounterDelta::User).await?;
        tx.commit().await?;

        info!("Created user {} (id {})", user.nickname, user.id);
        Ok(CreateOutcome::Created(user))
    }

    /// Find every user whose nickname or email matches (case-insensitive).
    pub async fn find_conflicting(&self, nickname: &str, email: &str) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE nickname = ? OR email = ? ORDER BY id"
        ))
        .bind(nickname)
        .bind(email)
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    /// Get a user by nickname (case-insensitive).
    pub async fn get_by_nickname(&self, nickname: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE nickname = ?"
        ))
        .bind(nickname)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Update a user's profile.
    ///
    /// Only fields that are set in the update will be modified. Fails with
    /// `NotFound` for an unknown nickname and `Conflict` when the new email
    /// belongs to another user.
    pub async fn update(&self, nickname: &str, update: &UserUpdate) -> Result<User> {
        if update.is_empty() {
            return self
                .get_by_nickname(nickname)
                .await?
                .ok_or_else(|| AgoraError::not_found("user"));
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = query.separated(", ");

        if let Some(ref fullname) = update.fullname {
            separated.push("fullname = ");
            separated.push_bind_unseparated(fullname);
        }
        if let Some(ref about) = update.about {
            separated.push("about = ");
            separated.push_bind_unseparated(about);
        }
        if let Some(ref email) = update.email {
            separated.push("email = ");
            separated.push_bind_unseparated(email);
        }

        query.push(" WHERE nickname = ");
        query.push_bind(nickname);
        query.push(format!(" RETURNING {USER_COLUMNS}"));

        let user = query
            .build_query_as::<User>()
            .fetch_optional(self.pool)
            .await
            .map_err(|e| match AgoraError::from(e) {
                AgoraError::Conflict(_) => {
                    AgoraError::Conflict("email belongs to another user".to_string())
                }
                other => other,
            })?
            .ok_or_else(|| AgoraError::not_found("user"))?;

        debug!("Updated profile of {}", user.nickname);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::GlobalStats;
    use crate::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let outcome = repo
            .create(&NewUser::new("alice", "alice@example.com").with_fullname("Alice"))
            .await
            .unwrap();

        let user = outcome.created().unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.nickname, "alice");
        assert_eq!(user.fullname, "Alice");
        assert_eq!(user.about, "");
        assert_eq!(GlobalStats::load(db.pool()).await.unwrap().users, 1);
    }

    #[tokio::test]
    async fn test_create_duplicate_returns_all_conflicts() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&NewUser::new("alice", "alice@example.com"))
            .await
            .unwrap();
        repo.create(&NewUser::new("bob", "bob@example.com"))
            .await
            .unwrap();

        // Nickname matches alice, email matches bob
        let outcome = repo
            .create(&NewUser::new("ALICE", "Bob@Example.com"))
            .await
            .unwrap();

        match outcome {
            CreateOutcome::Exists(users) => {
                let names: Vec<_> = users.iter().map(|u| u.nickname.as_str()).collect();
                assert_eq!(names, vec!["alice", "bob"]);
            }
            CreateOutcome::Created(_) => panic!("duplicate user was created"),
        }

        assert_eq!(GlobalStats::load(db.pool()).await.unwrap().users, 2);
    }

    #[tokio::test]
    async fn test_get_by_nickname_case_insensitive() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("Alice", "alice@example.com"))
            .await
            .unwrap();

        let user = repo.get_by_nickname("aLiCe").await.unwrap().unwrap();
        assert_eq!(user.nickname, "Alice");
        assert!(repo.get_by_nickname("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("alice", "alice@example.com").with_fullname("Alice"))
            .await
            .unwrap();

        let user = repo
            .update("ALICE", &UserUpdate::new().about("hello").email("new@example.com"))
            .await
            .unwrap();

        assert_eq!(user.fullname, "Alice");
        assert_eq!(user.about, "hello");
        assert_eq!(user.email, "new@example.com");
    }

    #[tokio::test]
    async fn test_update_empty_returns_current() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("alice", "alice@example.com"))
            .await
            .unwrap();

        let user = repo.update("alice", &UserUpdate::new()).await.unwrap();
        assert_eq!(user.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_update_unknown_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let result = repo.update("ghost", &UserUpdate::new().about("x")).await;
        assert!(matches!(result, Err(AgoraError::NotFound(_))));

        let result = repo.update("ghost", &UserUpdate::new()).await;
        assert!(matches!(result, Err(AgoraError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_email_taken() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("alice", "alice@example.com"))
            .await
            .unwrap();
        repo.create(&NewUser::new("bob", "bob@example.com"))
            .await
            .unwrap();

        let result = repo
            .update("bob", &UserUpdate::new().email("ALICE@example.com"))
            .await;
        assert!(matches!(result, Err(AgoraError::Conflict(_))));

        let bob = repo.get_by_nickname("bob").await.unwrap().unwrap();
        assert_eq!(bob.email, "bob@example.com");
    }
}
