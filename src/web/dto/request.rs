//! Request DTOs for Web API.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use super::validation::{nickname_chars, no_control_chars, not_empty_trimmed, slug_chars};
use crate::datetime::parse_timestamp;
use crate::db::{NewUser, UserUpdate};
use crate::forum::{
    ForumUsersQuery, NewForum, NewPost, NewThread, PostListQuery, SortMode, ThreadListQuery,
    ThreadUpdate, DEFAULT_PAGE_LIMIT,
};
use crate::AgoraError;

/// Record a failed check under `field`.
fn check(
    errors: &mut ValidationErrors,
    field: &'static str,
    result: Result<(), ValidationError>,
) {
    if let Err(e) = result {
        errors.add(field, e);
    }
}

fn email_format(value: &str) -> Result<(), ValidationError> {
    if value.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message("Invalid email address".into()))
    }
}

fn finish(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

// ============================================================================
// Users
// ============================================================================

/// User registration request. The nickname comes from the path.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub about: String,
    pub email: String,
}

impl CreateUserRequest {
    pub fn into_new_user(self, nickname: &str) -> NewUser {
        NewUser::new(nickname, self.email)
            .with_fullname(self.fullname)
            .with_about(self.about)
    }
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check(&mut errors, "email", email_format(&self.email));
        check(&mut errors, "fullname", no_control_chars(&self.fullname));
        check(&mut errors, "about", no_control_chars(&self.about));
        finish(errors)
    }
}

/// Profile update request. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub fullname: Option<String>,
    pub about: Option<String>,
    pub email: Option<String>,
}

impl From<UpdateUserRequest> for UserUpdate {
    fn from(req: UpdateUserRequest) -> Self {
        UserUpdate {
            fullname: req.fullname,
            about: req.about,
            email: req.email,
        }
    }
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(email) = &self.email {
            check(&mut errors, "email", email_format(email));
        }
        if let Some(fullname) = &self.fullname {
            check(&mut errors, "fullname", no_control_chars(fullname));
        }
        if let Some(about) = &self.about {
            check(&mut errors, "about", no_control_chars(about));
        }
        finish(errors)
    }
}

/// Path-only nickname check for user routes.
pub fn validate_nickname(nickname: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check(&mut errors, "nickname", nickname_chars(nickname));
    finish(errors)
}

// ============================================================================
// Forums and threads
// ============================================================================

/// Forum creation request.
#[derive(Debug, Deserialize)]
pub struct CreateForumRequest {
    pub slug: String,
    pub title: String,
    /// Owner nickname.
    pub user: String,
}

impl From<CreateForumRequest> for NewForum {
    fn from(req: CreateForumRequest) -> Self {
        NewForum::new(req.slug, req.title, req.user)
    }
}

impl Validate for CreateForumRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check(&mut errors, "slug", slug_chars(&self.slug));
        check(&mut errors, "title", not_empty_trimmed(&self.title));
        check(&mut errors, "title", no_control_chars(&self.title));
        check(&mut errors, "user", not_empty_trimmed(&self.user));
        finish(errors)
    }
}

/// Thread creation request. The forum comes from the path.
#[derive(Debug, Deserialize)]
pub struct CreateThreadRequest {
    pub title: String,
    pub author: String,
    pub message: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub slug: Option<String>,
}

impl CreateThreadRequest {
    /// The slug, with an empty string treated as absent.
    fn slug(&self) -> Option<&str> {
        self.slug.as_deref().filter(|s| !s.is_empty())
    }
}

impl From<CreateThreadRequest> for NewThread {
    fn from(req: CreateThreadRequest) -> Self {
        let slug = req.slug().map(str::to_string);
        let mut thread = NewThread::new(req.title, req.author, req.message);
        if let Some(slug) = slug {
            thread = thread.with_slug(slug);
        }
        if let Some(created) = req.created {
            thread = thread.with_created(created);
        }
        thread
    }
}

impl Validate for CreateThreadRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check(&mut errors, "title", not_empty_trimmed(&self.title));
        check(&mut errors, "title", no_control_chars(&self.title));
        check(&mut errors, "author", not_empty_trimmed(&self.author));
        check(&mut errors, "message", no_control_chars(&self.message));
        if let Some(slug) = self.slug() {
            check(&mut errors, "slug", slug_chars(slug));
        }
        finish(errors)
    }
}

/// Thread update request. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateThreadRequest {
    pub title: Option<String>,
    pub message: Option<String>,
}

impl From<UpdateThreadRequest> for ThreadUpdate {
    fn from(req: UpdateThreadRequest) -> Self {
        ThreadUpdate {
            title: req.title,
            message: req.message,
        }
    }
}

impl Validate for UpdateThreadRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(title) = &self.title {
            check(&mut errors, "title", not_empty_trimmed(title));
            check(&mut errors, "title", no_control_chars(title));
        }
        if let Some(message) = &self.message {
            check(&mut errors, "message", no_control_chars(message));
        }
        finish(errors)
    }
}

// ============================================================================
// Posts and votes
// ============================================================================

/// One element of a post batch.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    /// Parent post id, 0 for a top-level post.
    #[serde(default)]
    pub parent: i64,
    pub author: String,
    pub message: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

impl From<CreatePostRequest> for NewPost {
    fn from(req: CreatePostRequest) -> Self {
        let post = NewPost::reply(req.parent, req.author, req.message);
        match req.created {
            Some(created) => post.with_created(created),
            None => post,
        }
    }
}

impl Validate for CreatePostRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check(&mut errors, "author", not_empty_trimmed(&self.author));
        check(&mut errors, "message", no_control_chars(&self.message));
        if self.parent < 0 {
            errors.add(
                "parent",
                ValidationError::new("parent")
                    .with_message("Parent must be a post id or 0".into()),
            );
        }
        finish(errors)
    }
}

/// Post edit request. A missing message leaves the post unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub message: Option<String>,
}

impl Validate for UpdatePostRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(message) = &self.message {
            check(&mut errors, "message", no_control_chars(message));
        }
        finish(errors)
    }
}

/// Vote request. The voice is checked by the vote ledger.
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub nickname: String,
    pub voice: i64,
}

impl Validate for VoteRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check(&mut errors, "nickname", not_empty_trimmed(&self.nickname));
        finish(errors)
    }
}

// ============================================================================
// Query strings
// ============================================================================

/// Query for `GET /forum/:slug/users`.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Nickname of the last user of the previous page.
    pub since: Option<String>,
    #[serde(default)]
    pub desc: bool,
}

impl From<ListUsersQuery> for ForumUsersQuery {
    fn from(q: ListUsersQuery) -> Self {
        ForumUsersQuery {
            since: q.since.filter(|s| !s.is_empty()),
            limit: q.limit,
            desc: q.desc,
        }
    }
}

/// Query for `GET /forum/:slug/threads`.
#[derive(Debug, Deserialize)]
pub struct ListThreadsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Creation timestamp bound; unparseable values are ignored.
    pub since: Option<String>,
    #[serde(default)]
    pub desc: bool,
}

impl From<ListThreadsQuery> for ThreadListQuery {
    fn from(q: ListThreadsQuery) -> Self {
        ThreadListQuery {
            since: q.since.as_deref().and_then(parse_timestamp),
            limit: q.limit,
            desc: q.desc,
        }
    }
}

/// Query for `GET /thread/:slug_or_id/posts`.
#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Id of the last post of the previous page.
    pub since: Option<i64>,
    pub sort: Option<String>,
    #[serde(default)]
    pub desc: bool,
}

impl TryFrom<PostsQuery> for PostListQuery {
    type Error = AgoraError;

    fn try_from(q: PostsQuery) -> Result<Self, AgoraError> {
        let sort = match q.sort.as_deref() {
            None | Some("") => SortMode::Flat,
            Some(s) => s.parse()?,
        };
        let mut query = PostListQuery::new(sort).desc(q.desc).limit(q.limit);
        if let Some(since) = q.since {
            query = query.since(since);
        }
        Ok(query)
    }
}

/// Query for `GET /post/:id/details`.
#[derive(Debug, Default, Deserialize)]
pub struct DetailsQuery {
    /// Comma-separated list of `user`, `thread`, `forum`.
    #[serde(default)]
    pub related: String,
}
