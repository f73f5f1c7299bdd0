//! Concurrency tests for agora.
//!
//! These tests run against a file-backed database with several pooled
//! connections, so concurrent requests really do contend for the SQLite
//! write lock.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use agora::config::DatabaseConfig;
use agora::forum::{ForumService, NewPost, PostListQuery, SortMode, ThreadRef};
use agora::{AgoraError, Database};
use tempfile::TempDir;

use common::{seed_forum, seed_thread};

/// Open a fresh file-backed database in a temporary directory.
async fn setup_test_db() -> (TempDir, Arc<Database>) {
    let dir = TempDir::new().unwrap();
    let config = DatabaseConfig {
        path: dir.path().join("agora.db").to_string_lossy().into_owned(),
        max_connections: 8,
        busy_timeout_ms: 10_000,
    };
    let db = Database::open_with_config(&config).await.unwrap();
    (dir, Arc::new(db))
}

/// Test concurrent post batches across several threads of one forum.
///
/// Every post gets a unique id and the forum and global post counters match
/// the number of stored posts exactly.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_post_batches() {
    let (_dir, db) = setup_test_db().await;
    seed_forum(&db, "busy", &["alice", "bob"]).await;
    let mut threads = Vec::new();
    for slug in ["one", "two", "three"] {
        threads.push(seed_thread(&db, "busy", "alice", slug).await.id);
    }

    const TASKS: usize = 12;
    const BATCH: usize = 5;

    let mut handles = Vec::new();
    for task in 0..TASKS {
        let db = Arc::clone(&db);
        let thread_id = threads[task % threads.len()];
        handles.push(tokio::spawn(async move {
            let batch: Vec<NewPost> = (0..BATCH)
                .map(|i| NewPost::new(if i % 2 == 0 { "alice" } else { "bob" }, format!("{task}/{i}")))
                .collect();
            ForumService::new(&db)
                .insert_posts(&ThreadRef::Id(thread_id), &batch)
                .await
        }));
    }

    let mut ids = HashSet::new();
    for handle in futures::future::join_all(handles).await {
        let posts = handle.unwrap().unwrap();
        assert_eq!(posts.len(), BATCH);
        // Ids inside one batch are consecutive
        for pair in posts.windows(2) {
            assert_eq!(pair[1].id, pair[0].id + 1);
        }
        for post in posts {
            assert!(ids.insert(post.id), "duplicate id {}", post.id);
        }
    }

    let total = (TASKS * BATCH) as i64;
    let service = ForumService::new(&db);
    assert_eq!(ids.len() as i64, total);
    assert_eq!(service.forum_details("busy").await.unwrap().posts, total);
    assert_eq!(service.status().await.unwrap().posts, total);

    let mut listed = 0;
    for thread_id in threads {
        listed += service
            .list_posts(
                &ThreadRef::Id(thread_id),
                &PostListQuery::new(SortMode::Flat).limit(1000),
            )
            .await
            .unwrap()
            .len();
    }
    assert_eq!(listed as i64, total);
}

/// Test that failing batches racing with good ones leave counters exact.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_failing_batches_commit_nothing() {
    let (_dir, db) = setup_test_db().await;
    seed_forum(&db, "mixed", &["alice"]).await;
    let thread_id = seed_thread(&db, "mixed", "alice", "t").await.id;

    let mut handles = Vec::new();
    for task in 0..10 {
        let db = Arc::clone(&db);
        handles.push(tokio::spawn(async move {
            let author = if task % 2 == 0 { "alice" } else { "ghost" };
            let batch = vec![
                NewPost::new("alice", "first"),
                NewPost::new(author, "second"),
            ];
            ForumService::new(&db)
                .insert_posts(&ThreadRef::Id(thread_id), &batch)
                .await
        }));
    }

    let mut succeeded = 0;
    for handle in futures::future::join_all(handles).await {
        match handle.unwrap() {
            Ok(posts) => succeeded += posts.len() as i64,
            Err(AgoraError::NotFound(what)) => assert_eq!(what, "user"),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(succeeded, 10);
    let service = ForumService::new(&db);
    assert_eq!(service.forum_details("mixed").await.unwrap().posts, 10);
    assert_eq!(service.status().await.unwrap().posts, 10);
}

/// Test concurrent voting: the thread total equals the sum of stored votes.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_votes() {
    let (_dir, db) = setup_test_db().await;
    let voters: Vec<String> = (0..16).map(|i| format!("voter{i}")).collect();
    let nicknames: Vec<&str> = voters.iter().map(String::as_str).collect();
    seed_forum(&db, "polls", &nicknames).await;
    let thread_id = seed_thread(&db, "polls", "voter0", "poll").await.id;

    let mut handles = Vec::new();
    for (i, voter) in voters.iter().enumerate() {
        let db = Arc::clone(&db);
        let voter = voter.clone();
        handles.push(tokio::spawn(async move {
            let service = ForumService::new(&db);
            let thread = ThreadRef::Id(thread_id);
            // Each voter flips a few times and settles on +1 or -1
            let sequence: &[i64] = if i % 4 == 0 { &[1, -1, -1] } else { &[-1, 1, 1] };
            for voice in sequence {
                service.vote(&thread, &voter, *voice).await?;
            }
            Ok::<_, AgoraError>(())
        }));
    }

    for handle in futures::future::join_all(handles).await {
        handle.unwrap().unwrap();
    }

    let thread = ForumService::new(&db)
        .thread_details(&ThreadRef::Id(thread_id))
        .await
        .unwrap();
    // 4 voters settle on -1, 12 on +1
    assert_eq!(thread.votes, 8);

    let (rows, sum): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(voice), 0) FROM thread_votes")
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert_eq!(rows, 16);
    assert_eq!(sum, thread.votes);
}
