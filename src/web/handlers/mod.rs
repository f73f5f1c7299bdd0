//! API handlers for the forum HTTP API.

pub mod forum;
pub mod post;
pub mod service;
pub mod thread;
pub mod user;

pub use forum::*;
pub use post::*;
pub use service::*;
pub use thread::*;
pub use user::*;

use std::sync::Arc;

use crate::Database;

/// Shared database handle.
pub type SharedDatabase = Arc<Database>;

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SharedDatabase,
}

impl AppState {
    pub fn new(db: SharedDatabase) -> Self {
        Self { db }
    }
}
