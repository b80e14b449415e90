//! User model
//!
//! Registered contributors. Accounts are created through invite codes and
//! carry two moderation flags: `requires_approval` routes the user's new
//! articles through the approval queue, `is_admin` grants moderation rights.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Free-form biography shown on the team page
    pub bio: Option<String>,
    /// Name shown instead of the username
    pub display_name: Option<String>,
    /// Personal website
    pub custom_url: Option<String>,
    /// Avatar file name or URL
    pub avatar: Option<String>,
    /// Listed on the public team page
    pub include_in_team_page: bool,
    /// New articles from this user wait for admin approval
    pub requires_approval: bool,
    /// Administrator flag
    pub is_admin: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User.
    ///
    /// The password must already be hashed with
    /// `services::password::hash_password()`.
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            username,
            password_hash,
            bio: None,
            display_name: None,
            custom_url: None,
            avatar: None,
            include_in_team_page: false,
            requires_approval: true,
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Authors may edit their own articles, admins may edit any.
    pub fn can_edit(&self, author: &str) -> bool {
        self.is_admin || self.username == author
    }

    /// Display name when set, otherwise the username.
    pub fn public_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// Profile fields a user can change about themselves; `None` keeps the value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileInput {
    pub bio: Option<String>,
    pub display_name: Option<String>,
    pub custom_url: Option<String>,
    pub avatar: Option<String>,
    pub include_in_team_page: Option<bool>,
}

/// Moderation flags set by an administrator
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UserFlags {
    pub requires_approval: Option<bool>,
    pub is_admin: Option<bool>,
}
