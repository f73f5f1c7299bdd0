//! Forum service for agora.
//!
//! This module provides the high-level operations exposed over the API:
//! it resolves nicknames, slugs and thread references and delegates to the
//! repositories and ledgers.

use tracing::warn;

use crate::db::{
    CounterLedger, CreateOutcome, Database, GlobalStats, NewUser, User, UserRepository,
    UserUpdate,
};
use crate::{AgoraError, Result};

use super::details::{PostDetails, RelatedSet};
use super::post::{NewPost, Post};
use super::post_repository::PostRepository;
use super::repository::ForumRepository;
use super::resolve::{resolve_forum, resolve_thread, resolve_user};
use super::thread::{NewThread, Thread, ThreadListQuery, ThreadRef, ThreadUpdate};
use super::thread_repository::ThreadRepository;
use super::traversal::{PostListQuery, TraversalEngine};
use super::types::{Forum, ForumUsersQuery, NewForum};
use super::vote::{Voice, VoteLedger};

/// Service for forum operations.
pub struct ForumService<'a> {
    db: &'a Database,
}

impl<'a> ForumService<'a> {
    /// Create a new ForumService with the given database reference.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // ---- users ----

    /// Register a user, or report every user holding the nickname or email.
    pub async fn create_user(&self, new_user: &NewUser) -> Result<CreateOutcome<User, Vec<User>>> {
        UserRepository::new(self.db.pool()).create(new_user).await
    }

    /// Get a user profile.
    pub async fn user_profile(&self, nickname: &str) -> Result<User> {
        UserRepository::new(self.db.pool())
            .get_by_nickname(nickname)
            .await?
            .ok_or_else(|| AgoraError::not_found("user"))
    }

    /// Update a user profile.
    pub async fn update_user(&self, nickname: &str, update: &UserUpdate) -> Result<User> {
        UserRepository::new(self.db.pool())
            .update(nickname, update)
            .await
    }

    // ---- forums ----

    /// Create a forum.
    pub async fn create_forum(&self, new_forum: &NewForum) -> Result<CreateOutcome<Forum>> {
        ForumRepository::new(self.db.pool()).create(new_forum).await
    }

    /// Get a forum with its current counters.
    pub async fn forum_details(&self, slug: &str) -> Result<Forum> {
        ForumRepository::new(self.db.pool())
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| AgoraError::not_found("forum"))
    }

    /// List the users active in a forum.
    pub async fn forum_users(&self, slug: &str, query: &ForumUsersQuery) -> Result<Vec<User>> {
        let forum = resolve_forum(self.db.pool(), slug).await?;
        ForumRepository::new(self.db.pool())
            .list_users(forum.id, query)
            .await
    }

    // ---- threads ----

    /// Create a thread in a forum.
    pub async fn create_thread(
        &self,
        forum_slug: &str,
        new_thread: &NewThread,
    ) -> Result<CreateOutcome<Thread>> {
        ThreadRepository::new(self.db.pool())
            .create(forum_slug, new_thread)
            .await
    }

    /// Get a thread by id or slug.
    pub async fn thread_details(&self, thread: &ThreadRef) -> Result<Thread> {
        ThreadRepository::new(self.db.pool())
            .get(thread)
            .await?
            .ok_or_else(|| AgoraError::not_found("thread"))
    }

    /// Update a thread's title and/or message.
    pub async fn update_thread(&self, thread: &ThreadRef, update: &ThreadUpdate) -> Result<Thread> {
        ThreadRepository::new(self.db.pool())
            .update(thread, update)
            .await
    }

    /// List the threads of a forum.
    pub async fn forum_threads(&self, slug: &str, query: &ThreadListQuery) -> Result<Vec<Thread>> {
        let forum = resolve_forum(self.db.pool(), slug).await?;
        ThreadRepository::new(self.db.pool())
            .list_by_forum(forum.id, query)
            .await
    }

    // ---- posts ----

    /// Insert a batch of posts into a thread.
    pub async fn insert_posts(&self, thread: &ThreadRef, posts: &[NewPost]) -> Result<Vec<Post>> {
        let key = resolve_thread(self.db.pool(), thread).await?;
        PostRepository::new(self.db.pool())
            .insert_batch(&key, posts)
            .await
    }

    /// Edit a post's message.
    pub async fn update_post(&self, id: i64, message: Option<&str>) -> Result<Post> {
        PostRepository::new(self.db.pool())
            .update_message(id, message)
            .await
    }

    /// Fetch one page of a thread's posts.
    pub async fn list_posts(&self, thread: &ThreadRef, query: &PostListQuery) -> Result<Vec<Post>> {
        let key = resolve_thread(self.db.pool(), thread).await?;
        TraversalEngine::new(self.db.pool())
            .list(key.id, query)
            .await
    }

    /// Get a post with the requested related entities.
    pub async fn post_details(&self, id: i64, related: RelatedSet) -> Result<PostDetails> {
        let pool = self.db.pool();
        let post = PostRepository::new(pool)
            .get_by_id(id)
            .await?
            .ok_or_else(|| AgoraError::not_found("post"))?;

        let author = if related.user {
            UserRepository::new(pool).get_by_nickname(&post.author).await?
        } else {
            None
        };
        let thread = if related.thread {
            ThreadRepository::new(pool).get_by_id(post.thread_id).await?
        } else {
            None
        };
        let forum = if related.forum {
            ForumRepository::new(pool).get_by_slug(&post.forum).await?
        } else {
            None
        };

        Ok(PostDetails {
            post,
            author,
            thread,
            forum,
        })
    }

    // ---- votes ----

    /// Vote on a thread. `voice` must be 1 or -1.
    pub async fn vote(&self, thread: &ThreadRef, nickname: &str, voice: i64) -> Result<Thread> {
        let voice = Voice::try_from(voice)?;
        let user = resolve_user(self.db.pool(), nickname).await?;
        let key = resolve_thread(self.db.pool(), thread).await?;
        VoteLedger::new(self.db.pool()).vote(&key, &user, voice).await
    }

    // ---- service ----

    /// Current global counters.
    pub async fn status(&self) -> Result<GlobalStats> {
        GlobalStats::load(self.db.pool()).await
    }

    /// Delete every user, forum, thread, vote and post and zero all counters.
    pub async fn clear(&self) -> Result<()> {
        let mut tx = self.db.begin().await?;

        for table in [
            "posts",
            "thread_votes",
            "forum_users",
            "threads",
            "forums",
            "users",
        ] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
        }
        CounterLedger::reset(&mut tx).await?;
        tx.commit().await?;

        warn!("All forum data cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forum::SortMode;

    async fn setup() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        let service = ForumService::new(&db);
        for nick in ["alice", "bob"] {
            service
                .create_user(&NewUser::new(nick, format!("{nick}@example.com")))
                .await
                .unwrap();
        }
        service
            .create_forum(&NewForum::new("rust", "Rust", "alice"))
            .await
            .unwrap();
        service
            .create_thread("rust", &NewThread::new("Intro", "alice", "hi").with_slug("intro"))
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_status_counts() {
        let db = setup().await;
        let service = ForumService::new(&db);
        service
            .insert_posts(
                &ThreadRef::parse("intro"),
                &[NewPost::new("alice", "a"), NewPost::reply(1, "bob", "b")],
            )
            .await
            .unwrap();

        let status = service.status().await.unwrap();
        assert_eq!(
            status,
            GlobalStats {
                users: 2,
                forums: 1,
                threads: 1,
                posts: 2
            }
        );

        let forum = service.forum_details("RUST").await.unwrap();
        assert_eq!(forum.threads, 1);
        assert_eq!(forum.posts, 2);
    }

    #[tokio::test]
    async fn test_insert_posts_unknown_thread() {
        let db = setup().await;
        let service = ForumService::new(&db);

        let result = service
            .insert_posts(&ThreadRef::Id(99), &[NewPost::new("alice", "a")])
            .await;
        assert!(matches!(result, Err(AgoraError::NotFound(ref w)) if w == "thread"));

        let result = service.insert_posts(&ThreadRef::Id(99), &[]).await;
        assert!(matches!(result, Err(AgoraError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_posts_by_slug() {
        let db = setup().await;
        let service = ForumService::new(&db);
        service
            .insert_posts(
                &ThreadRef::parse("intro"),
                &[
                    NewPost::new("alice", "1"),
                    NewPost::reply(1, "bob", "2"),
                    NewPost::reply(1, "bob", "3"),
                    NewPost::new("bob", "4"),
                ],
            )
            .await
            .unwrap();

        let tree = service
            .list_posts(&ThreadRef::parse("INTRO"), &PostListQuery::new(SortMode::Tree))
            .await
            .unwrap();
        let ids: Vec<i64> = tree.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        let missing = service
            .list_posts(&ThreadRef::parse("nope"), &PostListQuery::default())
            .await;
        assert!(matches!(missing, Err(AgoraError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_vote_validation_order() {
        let db = setup().await;
        let service = ForumService::new(&db);

        // Invalid voice is rejected before anything is resolved
        let result = service.vote(&ThreadRef::Id(99), "ghost", 5).await;
        assert!(matches!(result, Err(AgoraError::BadRequest(_))));

        let result = service.vote(&ThreadRef::Id(1), "ghost", 1).await;
        assert!(matches!(result, Err(AgoraError::NotFound(ref w)) if w == "user"));

        let result = service.vote(&ThreadRef::Id(99), "alice", 1).await;
        assert!(matches!(result, Err(AgoraError::NotFound(ref w)) if w == "thread"));

        let thread = service.vote(&ThreadRef::parse("intro"), "bob", -1).await.unwrap();
        assert_eq!(thread.votes, -1);
    }

    #[tokio::test]
    async fn test_post_details_related() {
        let db = setup().await;
        let service = ForumService::new(&db);
        service
            .insert_posts(&ThreadRef::Id(1), &[NewPost::new("bob", "hello")])
            .await
            .unwrap();

        let bare = service.post_details(1, RelatedSet::default()).await.unwrap();
        assert!(bare.author.is_none() && bare.thread.is_none() && bare.forum.is_none());

        let full = service.post_details(1, RelatedSet::all()).await.unwrap();
        assert_eq!(full.author.unwrap().nickname, "bob");
        assert_eq!(full.thread.unwrap().slug.as_deref(), Some("intro"));
        assert_eq!(full.forum.unwrap().posts, 1);

        let missing = service.post_details(2, RelatedSet::all()).await;
        assert!(matches!(missing, Err(AgoraError::NotFound(ref w)) if w == "post"));
    }

    #[tokio::test]
    async fn test_forum_users_and_threads() {
        let db = setup().await;
        let service = ForumService::new(&db);
        service
            .insert_posts(&ThreadRef::Id(1), &[NewPost::new("bob", "joining")])
            .await
            .unwrap();

        let users = service
            .forum_users("rust", &ForumUsersQuery::default())
            .await
            .unwrap();
        let names: Vec<_> = users.iter().map(|u| u.nickname.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);

        let threads = service
            .forum_threads("rust", &ThreadListQuery::default())
            .await
            .unwrap();
        assert_eq!(threads.len(), 1);

        assert!(service
            .forum_users("go", &ForumUsersQuery::default())
            .await
            .is_err());
        assert!(service
            .forum_threads("go", &ThreadListQuery::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_clear() {
        let db = setup().await;
        let service = ForumService::new(&db);
        service
            .insert_posts(&ThreadRef::Id(1), &[NewPost::new("bob", "x")])
            .await
            .unwrap();
        service.vote(&ThreadRef::Id(1), "bob", 1).await.unwrap();

        service.clear().await.unwrap();

        assert_eq!(service.status().await.unwrap(), GlobalStats::default());
        assert!(service.user_profile("alice").await.is_err());
        assert!(service.forum_details("rust").await.is_err());

        // Everything can be created again afterwards
        let outcome = service
            .create_user(&NewUser::new("alice", "alice@example.com"))
            .await
            .unwrap();
        assert!(outcome.is_created());
        assert_eq!(service.status().await.unwrap().users, 1);
    }
}
