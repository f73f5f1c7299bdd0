//! User model for agora.

use serde::Serialize;

/// A registered forum user.
///
/// Nicknames and emails are unique, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    /// Internal row ID.
    #[serde(skip)]
    pub id: i64,
    /// Unique handle, immutable after creation.
    pub nickname: String,
    /// Full name.
    pub fullname: String,
    /// Self-introduction text.
    pub about: String,
    /// Email address.
    pub email: String,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub nickname: String,
    pub fullname: String,
    pub about: String,
    pub email: String,
}

impl NewUser {
    /// Create a new user with empty fullname and about.
    pub fn new(nickname: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            fullname: String::new(),
            about: String::new(),
            email: email.into(),
        }
    }

    /// Set the full name.
    pub fn with_fullname(mut self, fullname: impl Into<String>) -> Self {
        self.fullname = fullname.into();
        self
    }

    /// Set the about text.
    pub fn with_about(mut self, about: impl Into<String>) -> Self {
        self.about = about.into();
        self
    }
}

/// Data for updating an existing user. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub fullname: Option<String>,
    pub about: Option<String>,
    pub email: Option<String>,
}

impl UserUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the full name.
    pub fn fullname(mut self, fullname: impl Into<String>) -> Self {
        self.fullname = Some(fullname.into());
        self
    }

    /// Set the about text.
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Set the email.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Check if the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.fullname.is_none() && self.about.is_none() && self.email.is_none()
    }
}
