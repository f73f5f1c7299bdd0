//! Seeding helpers for unit tests.

use crate::db::{NewUser, UserRepository};
use crate::Database;

use super::repository::ForumRepository;
use super::thread::{NewThread, Thread};
use super::thread_repository::ThreadRepository;
use super::types::NewForum;

pub(crate) async fn seed_user(db: &Database, nickname: &str) {
    let outcome = UserRepository::new(db.pool())
        .create(&NewUser::new(nickname, format!("{nickname}@example.com")))
        .await
        .unwrap();
    assert!(outcome.is_created(), "user {nickname} already exists");
}

pub(crate) async fn seed_forum(db: &Database, slug: &str, owner: &str) {
    let outcome = ForumRepository::new(db.pool())
        .create(&NewForum::new(slug, slug.to_uppercase(), owner))
        .await
        .unwrap();
    assert!(outcome.is_created(), "forum {slug} already exists");
}

pub(crate) async fn seed_thread(
    db: &Database,
    forum: &str,
    author: &str,
    slug: Option<&str>,
) -> Thread {
    let mut new_thread = NewThread::new("Thread", author, "Opening post");
    new_thread.slug = slug.map(str::to_string);
    ThreadRepository::new(db.pool())
        .create(forum, &new_thread)
        .await
        .unwrap()
        .created()
        .unwrap()
}

pub(crate) async fn forum_posts(db: &Database, slug: &str) -> i64 {
    ForumRepository::new(db.pool())
        .get_by_slug(slug)
        .await
        .unwrap()
        .unwrap()
        .posts
}
