//! Shared helpers for agora integration tests.

#![allow(dead_code)]

use agora::db::NewUser;
use agora::forum::{ForumService, NewForum, NewThread, Post, Thread};
use agora::Database;

/// Register users and create a forum owned by the first one.
pub async fn seed_forum(db: &Database, slug: &str, nicknames: &[&str]) {
    let service = ForumService::new(db);
    for nickname in nicknames {
        let outcome = service
            .create_user(&NewUser::new(*nickname, format!("{nickname}@example.com")))
            .await
            .unwrap();
        assert!(outcome.is_created(), "user {nickname} already exists");
    }

    let owner = nicknames.first().copied().unwrap_or("admin");
    let outcome = service
        .create_forum(&NewForum::new(slug, format!("Forum {slug}"), owner))
        .await
        .unwrap();
    assert!(outcome.is_created(), "forum {slug} already exists");
}

/// Create a thread in a forum.
pub async fn seed_thread(db: &Database, forum: &str, author: &str, slug: &str) -> Thread {
    ForumService::new(db)
        .create_thread(
            forum,
            &NewThread::new(format!("Thread {slug}"), author, "Opening post").with_slug(slug),
        )
        .await
        .unwrap()
        .created()
        .unwrap()
}

/// Ids of a page of posts, in page order.
pub fn post_ids(posts: &[Post]) -> Vec<i64> {
    posts.iter().map(|p| p.id).collect()
}
