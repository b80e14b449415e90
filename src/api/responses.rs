//! Shared API response types
//!
//! Models that carry private fields (users) get a dedicated response type;
//! everything else is serialized straight from the model or service view.

use serde::{Deserialize, Serialize};

use crate::models::{PagedResult, User};

// ============================================================================
// User Response Types
// ============================================================================

/// Full account view, returned to the account owner and administrators
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub bio: Option<String>,
    pub display_name: Option<String>,
    pub custom_url: Option<String>,
    pub avatar: Option<String>,
    pub include_in_team_page: bool,
    pub requires_approval: bool,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            bio: user.bio,
            display_name: user.display_name,
            custom_url: user.custom_url,
            avatar: user.avatar,
            include_in_team_page: user.include_in_team_page,
            requires_approval: user.requires_approval,
            is_admin: user.is_admin,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Public card on the team page
#[derive(Debug, Serialize, Deserialize)]
pub struct TeamMemberResponse {
    pub username: String,
    pub name: String,
    pub bio: Option<String>,
    pub custom_url: Option<String>,
    pub avatar: Option<String>,
}

impl From<User> for TeamMemberResponse {
    fn from(user: User) -> Self {
        Self {
            name: user.public_name().to_string(),
            username: user.username,
            bio: user.bio,
            custom_url: user.custom_url,
            avatar: user.avatar,
        }
    }
}

// ============================================================================
// Pagination Response Types
// ============================================================================

/// Paginated user list response
#[derive(Debug, Serialize)]
pub struct PaginatedUsersResponse {
    pub users: Vec<UserResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl From<PagedResult<User>> for PaginatedUsersResponse {
    fn from(result: PagedResult<User>) -> Self {
        let total_pages = result.total_pages();
        let (has_next, has_prev) = (result.has_next(), result.has_prev());
        Self {
            total: result.total,
            page: result.page,
            per_page: result.per_page,
            total_pages,
            has_next,
            has_prev,
            users: result.items.into_iter().map(UserResponse::from).collect(),
        }
    }
}

/// `{"count": n}`
#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListParams;

    fn sample_user() -> User {
        let mut user = User::new("alice".into(), "secret-hash".into());
        user.id = 7;
        user.display_name = Some("Alice A.".into());
        user
    }

    #[test]
    fn test_user_response_omits_password_hash() {
        let json = serde_json::to_string(&UserResponse::from(sample_user())).unwrap();
        assert!(json.contains("\"username\":\"alice\""));
        assert!(!json.contains("secret-hash"));
    }

    #[test]
    fn test_team_member_uses_public_name() {
        let member = TeamMemberResponse::from(sample_user());
        assert_eq!(member.name, "Alice A.");

        let mut plain = sample_user();
        plain.display_name = None;
        assert_eq!(TeamMemberResponse::from(plain).name, "alice");
    }

    #[test]
    fn test_paginated_users() {
        let params = ListParams::new(1, 10);
        let result = PagedResult::new(vec![sample_user()], 11, &params);
        let response = PaginatedUsersResponse::from(result);
        assert_eq!(response.users.len(), 1);
        assert_eq!(response.total_pages, 2);
        assert!(response.has_next);
        assert!(!response.has_prev);
    }
}
