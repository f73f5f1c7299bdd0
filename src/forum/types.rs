//! Forum types for agora.

use serde::Serialize;

/// A forum: a named collection of threads owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Forum {
    /// Internal row ID.
    #[serde(skip)]
    pub id: i64,
    /// Unique, case-insensitive forum slug.
    pub slug: String,
    /// Forum title.
    pub title: String,
    /// Nickname of the owning user.
    #[sqlx(rename = "owner")]
    pub user: String,
    /// Number of threads in the forum.
    pub threads: i64,
    /// Number of posts in the forum.
    pub posts: i64,
}

/// Data for creating a new forum.
#[derive(Debug, Clone)]
pub struct NewForum {
    pub slug: String,
    pub title: String,
    /// Nickname of the owning user.
    pub user: String,
}

impl NewForum {
    pub fn new(slug: impl Into<String>, title: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            user: user.into(),
        }
    }
}

/// Query for the members of a forum, ordered by nickname.
#[derive(Debug, Clone)]
pub struct ForumUsersQuery {
    /// Only nicknames strictly after this one in the chosen direction.
    pub since: Option<String>,
    pub limit: i64,
    pub desc: bool,
}

impl Default for ForumUsersQuery {
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
    fn test_forum_serialization() {
        let forum = Forum {
            id: 3,
            slug: "rust".to_string(),
            title: "Rust".to_string(),
            user: "alice".to_string(),
            threads: 2,
            posts: 10,
        };
        let json = serde_json::to_value(&forum).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "slug": "rust",
                "title": "Rust",
                "user": "alice",
                "threads": 2,
                "posts": 10
            })
        );
    }

    #[test]
    fn test_forum_users_query_default() {
        let query = ForumUsersQuery::default();
        assert_eq!(query.limit, 100);
        assert!(query.since.is_none());
        assert!(!query.desc);
    }
}
