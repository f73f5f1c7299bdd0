//! Database schema and migrations for agora.
//!
//! Migrations are applied sequentially when the database is first opened or
//! upgraded; the schema_version table tracks which have been applied.
//!
//! Nicknames, emails and slugs use `COLLATE NOCASE`, so equality lookups,
//! unique constraints and orderings on them are case-insensitive.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: Users, forums and forum membership
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    nickname    TEXT NOT NULL UNIQUE COLLATE NOCASE,
    fullname    TEXT NOT NULL DEFAULT '',
    about       TEXT NOT NULL DEFAULT '',
    email       TEXT NOT NULL UNIQUE COLLATE NOCASE
);

CREATE TABLE forums (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    slug        TEXT NOT NULL UNIQUE COLLATE NOCASE,
    title       TEXT NOT NULL,
    owner_id    INTEGER NOT NULL REFERENCES users(id),
    owner       TEXT NOT NULL COLLATE NOCASE,
    threads     INTEGER NOT NULL DEFAULT 0,
    posts       INTEGER NOT NULL DEFAULT 0
);

-- Users who created a thread or post in a forum
CREATE TABLE forum_users (
    forum_id    INTEGER NOT NULL REFERENCES forums(id),
    user_id     INTEGER NOT NULL REFERENCES users(id),
    PRIMARY KEY (forum_id, user_id)
);
"#,
    // v2: Threads and the one-vote-per-user ledger
    r#"
CREATE TABLE threads (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    forum_id    INTEGER NOT NULL REFERENCES forums(id),
    forum       TEXT NOT NULL COLLATE NOCASE,
    author_id   INTEGER NOT NULL REFERENCES users(id),
    author      TEXT NOT NULL COLLATE NOCASE,
    title       TEXT NOT NULL,
    message     TEXT NOT NULL,
    slug        TEXT UNIQUE COLLATE NOCASE,   -- NULL when the thread has no slug
    votes       INTEGER NOT NULL DEFAULT 0,
    created     TEXT NOT NULL
);

CREATE INDEX idx_threads_forum_created ON threads(forum_id, created);

CREATE TABLE thread_votes (
    thread_id   INTEGER NOT NULL REFERENCES threads(id),
    user_id     INTEGER NOT NULL REFERENCES users(id),
    voice       INTEGER NOT NULL CHECK (voice IN (-1, 1)),
    PRIMARY KEY (thread_id, user_id)
);
"#,
    // v3: Posts with materialized paths
    r#"
-- path: big-endian 8-byte ids [0, top-level id, ..., own id]; BLOB order is tree order
-- root_id: path[1], the top-level ancestor
CREATE TABLE posts (
    id          INTEGER PRIMARY KEY,
    parent      INTEGER NOT NULL DEFAULT 0,
    path        BLOB NOT NULL,
    root_id     INTEGER NOT NULL,
    thread_id   INTEGER NOT NULL REFERENCES threads(id),
    forum       TEXT NOT NULL COLLATE NOCASE,
    author_id   INTEGER NOT NULL REFERENCES users(id),
    author      TEXT NOT NULL COLLATE NOCASE,
    message     TEXT NOT NULL,
    is_edited   INTEGER NOT NULL DEFAULT 0,
    created     TEXT NOT NULL
);

CREATE INDEX idx_posts_thread_id ON posts(thread_id, id);
CREATE INDEX idx_posts_thread_path ON posts(thread_id, path);
CREATE INDEX idx_posts_thread_parent_root ON posts(thread_id, parent, root_id);
CREATE INDEX idx_posts_root_path ON posts(root_id, path);
"#,
    // v4: Global aggregate counters (single row)
    r#"
CREATE TABLE stats (
    id          INTEGER PRIMARY KEY CHECK (id = 1),
    users       INTEGER NOT NULL DEFAULT 0,
    forums      INTEGER NOT NULL DEFAULT 0,
    threads     INTEGER NOT NULL DEFAULT 0,
    posts       INTEGER NOT NULL DEFAULT 0
);

INSERT INTO stats (id) VALUES (1);
"#,
];
