//! Thread model for agora.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A discussion thread in a forum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Thread {
    /// Unique thread ID.
    pub id: i64,
    /// Internal ID of the forum.
    #[serde(skip)]
    pub forum_id: i64,
    /// Slug of the forum.
    pub forum: String,
    /// Nickname of the author.
    pub author: String,
    pub title: String,
    pub message: String,
    /// Optional unique slug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Sum of all votes.
    pub votes: i64,
    pub created: DateTime<Utc>,
}

/// Data for creating a new thread.
#[derive(Debug, Clone)]
pub struct NewThread {
    pub title: String,
    /// Nickname of the author.
    pub author: String,
    pub message: String,
    /// Creation time; defaults to now.
    pub created: Option<DateTime<Utc>>,
    pub slug: Option<String>,
}

impl NewThread {
    /// Create a new thread with required fields.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            message: message.into(),
            created: None,
            slug: None,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }
}

/// Data for updating an existing thread. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ThreadUpdate {
    pub title: Option<String>,
    pub message: Option<String>,
}

impl ThreadUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set new message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Check if no fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.message.is_none()
    }
}

/// Reference to a thread by numeric id or by slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadRef {
    Id(i64),
    Slug(String),
}

impl ThreadRef {
    /// Interpret a path segment: all-digit values are ids, anything else a slug.
    pub fn parse(slug_or_id: &str) -> Self {
        if !slug_or_id.is_empty() && slug_or_id.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = slug_or_id.parse() {
                return ThreadRef::Id(id);
            }
        }
        ThreadRef::Slug(slug_or_id.to_string())
    }
}

impl fmt::Display for ThreadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadRef::Id(id) => write!(f, "{id}"),
            ThreadRef::Slug(slug) => write!(f, "{slug}"),
        }
    }
}

impl From<i64> for ThreadRef {
    fn from(id: i64) -> Self {
        ThreadRef::Id(id)
    }
}

impl From<&str> for ThreadRef {
    fn from(slug: &str) -> Self {
        ThreadRef::Slug(slug.to_string())
    }
}

/// Query for the threads of a forum, ordered by creation time.
#[derive(Debug, Clone)]
pub struct ThreadListQuery {
    /// Inclusive bound on `created` in the chosen direction.
    pub since: Option<DateTime<Utc>>,
    pub limit: i64,
    pub desc: bool,
}

impl Default for ThreadListQuery {
    fn default() -> Self {
        Self {
            since: None,
            limit: super::DEFAULT_PAGE_LIMIT,
            desc: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_thread_builder() {
        let thread = NewThread::new("Hello", "alice", "First!").with_slug("hello");
        assert_eq!(thread.title, "Hello");
        assert_eq!(thread.author, "alice");
        assert_eq!(thread.slug.as_deref(), Some("hello"));
        assert!(thread.created.is_none());
    }

    #[test]
    fn test_thread_update_empty() {
        assert!(ThreadUpdate::new().is_empty());
        assert!(!ThreadUpdate::new().message("edited").is_empty());
    }

    #[test]
    fn test_thread_ref_parse() {
        assert_eq!(ThreadRef::parse("42"), ThreadRef::Id(42));
        assert_eq!(ThreadRef::parse("my-thread"), ThreadRef::Slug("my-thread".to_string()));
        assert_eq!(ThreadRef::parse("42abc"), ThreadRef::Slug("42abc".to_string()));
        assert_eq!(ThreadRef::parse("-1"), ThreadRef::Slug("-1".to_string()));
        assert_eq!(ThreadRef::parse(""), ThreadRef::Slug(String::new()));
    }

    #[test]
    fn test_thread_serialization_omits_missing_slug() {
        let thread = Thread {
            id: 1,
            forum_id: 9,
            forum: "rust".to_string(),
            author: "alice".to_string(),
            title: "Hello".to_string(),
            message: "First".to_string(),
            slug: None,
            votes: 0,
            created: DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let json = serde_json::to_value(&thread).unwrap();
        assert!(json.get("slug").is_none());
        assert!(json.get("forum_id").is_none());
        assert_eq!(json["forum"], "rust");
        assert_eq!(json["created"], "2024-01-15T10:30:00Z");
    }
}
