//! agora - discussion forum store
//!
//! Users, forums, threads and tree-structured posts kept in SQLite, with
//! materialized post paths, cursor-paginated traversals, exact counters and
//! one-vote-per-user thread voting, served over a JSON HTTP API.

pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod forum;
pub mod logging;
pub mod web;

pub use config::Config;
pub use db::{CreateOutcome, Database, GlobalStats, NewUser, User, UserRepository, UserUpdate};
pub use error::{AgoraError, Result};
pub use forum::{ForumService, Post, PostListQuery, SortMode, Thread, ThreadRef};
pub use web::WebServer;
