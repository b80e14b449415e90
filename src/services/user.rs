//! User service
//!
//! Implements business logic for accounts:
//! - Registration with an invitation code (first user becomes admin)
//! - Login/logout with throttling of failed attempts
//! - Session validation and cleanup
//! - Profile and password changes
//! - Administrator moderation of accounts

use crate::db::repositories::{Registration, SessionRepository, UserRepository};
use crate::models::{ListParams, PagedResult, Session, UpdateProfileInput, User, UserFlags};
use crate::services::password::{hash_password, validate_new_password, verify_password};
use crate::services::rate_limiter::LoginRateLimiter;
use anyhow::Context;
use chrono::Duration;
use std::sync::Arc;

/// Default session expiration time in days
pub const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

pub const MAX_USERNAME_LENGTH: usize = 100;
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("User not found")]
    NotFound,

    /// Action not allowed for this user
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Too many failed logins
    #[error("Too many failed login attempts, try again later")]
    RateLimited,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Input for user registration
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub invite_code: String,
}

impl RegisterInput {
    /// Registration input whose confirmation equals the password
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        invite_code: impl Into<String>,
    ) -> Self {
        let password = password.into();
        Self {
            username: username.into(),
            confirm_password: password.clone(),
            password,
            invite_code: invite_code.into(),
        }
    }
}

/// Input for user login
#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl LoginInput {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Input for a password change
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// User service for managing users and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    limiter: LoginRateLimiter,
    session_expiration_days: i64,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            limiter: LoginRateLimiter::new(),
            session_expiration_days: DEFAULT_SESSION_EXPIRATION_DAYS,
        }
    }

    /// Set the session lifetime in days
    pub fn with_session_expiration(mut self, days: i64) -> Self {
        self.session_expiration_days = days;
        self
    }

    /// Register a new account.
    ///
    /// The invitation code is redeemed and the account inserted in one
    /// transaction, so a failed insert leaves the code unused. The very
    /// first account becomes an administrator whose articles need no
    /// approval; every later account starts with `requires_approval`.
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        let username = input.username.trim().to_string();
        if username.is_empty() {
            return Err(UserServiceError::ValidationError("Username is required".into()));
        }
        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(UserServiceError::ValidationError(format!(
                "Username must be at most {} characters",
                MAX_USERNAME_LENGTH
            )));
        }
        validate_new_password(&input.password, &input.confirm_password)
            .map_err(|e| UserServiceError::ValidationError(e.to_string()))?;

        if self
            .user_repo
            .get_by_username(&username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                username
            )));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let user = User::new(username, password_hash);

        let created = match self
            .user_repo
            .register(&user, input.invite_code.trim())
            .await
            .context("Failed to register user")?
        {
            Registration::Created(created) => created,
            Registration::InvalidInvite => {
                return Err(UserServiceError::ValidationError(
                    "Invalid or expired invitation code".into(),
                ))
            }
            Registration::UsernameTaken => {
                return Err(UserServiceError::UserExists(format!(
                    "Username '{}' is already taken",
                    user.username
                )))
            }
        };

        tracing::info!(
            "Registered user {} (admin: {})",
            created.username,
            created.is_admin
        );
        Ok(created)
    }

    /// Check credentials and open a session.
    pub async fn login(&self, input: LoginInput) -> Result<Session, UserServiceError> {
        let username = input.username.trim();
        if self.limiter.is_limited(username).await {
            tracing::warn!("Login throttled for {}", username);
            return Err(UserServiceError::RateLimited);
        }

        let user = self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to get user")?;

        let user = match user {
            Some(user) if verify_password(&input.password, &user.password_hash)? => user,
            _ => {
                self.limiter.record_failure(username).await;
                return Err(UserServiceError::AuthenticationError(
                    "Invalid username or password".to_string(),
                ));
            }
        };

        self.limiter.clear(username).await;
        self.create_session(user.id).await
    }

    /// Invalidate one session
    pub async fn logout(&self, session_id: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Expired sessions are deleted and yield `None`.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            self.session_repo
                .delete(token)
                .await
                .context("Failed to delete expired session")?;
            return Ok(None);
        }

        Ok(self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to get user by username")?)
    }

    /// Update the caller's own profile. Blank strings clear a field.
    pub async fn update_profile(
        &self,
        user_id: i64,
        input: UpdateProfileInput,
    ) -> Result<User, UserServiceError> {
        let mut user = self
            .get_by_id(user_id)
            .await?
            .ok_or(UserServiceError::NotFound)?;

        if let Some(bio) = input.bio {
            user.bio = non_blank(bio);
        }
        if let Some(display_name) = input.display_name {
            let display_name = non_blank(display_name);
            if display_name
                .as_ref()
                .is_some_and(|n| n.chars().count() > MAX_DISPLAY_NAME_LENGTH)
            {
                return Err(UserServiceError::ValidationError(format!(
                    "Display name must be at most {} characters",
                    MAX_DISPLAY_NAME_LENGTH
                )));
            }
            user.display_name = display_name;
        }
        if let Some(custom_url) = input.custom_url {
            let custom_url = non_blank(custom_url);
            if let Some(url) = &custom_url {
                if !is_http_url(url) {
                    return Err(UserServiceError::ValidationError(
                        "Custom URL must start with http:// or https://".into(),
                    ));
                }
            }
            user.custom_url = custom_url;
        }
        if let Some(avatar) = input.avatar {
            user.avatar = non_blank(avatar);
        }
        if let Some(include) = input.include_in_team_page {
            user.include_in_team_page = include;
        }

        Ok(self
            .user_repo
            .update(&user)
            .await
            .context("Failed to update profile")?)
    }

    /// Change the caller's password and sign out all of their sessions.
    pub async fn change_password(
        &self,
        user_id: i64,
        input: ChangePasswordInput,
    ) -> Result<(), UserServiceError> {
        let mut user = self
            .get_by_id(user_id)
            .await?
            .ok_or(UserServiceError::NotFound)?;

        if !verify_password(&input.current_password, &user.password_hash)? {
            return Err(UserServiceError::AuthenticationError(
                "Current password is incorrect".into(),
            ));
        }
        validate_new_password(&input.new_password, &input.confirm_password)
            .map_err(|e| UserServiceError::ValidationError(e.to_string()))?;

        user.password_hash = hash_password(&input.new_password)?;
        self.user_repo
            .update(&user)
            .await
            .context("Failed to update password")?;
        self.session_repo
            .delete_by_user(user.id)
            .await
            .context("Failed to invalidate sessions")?;

        tracing::info!("Password changed for {}", user.username);
        Ok(())
    }

    /// Paginated list of all accounts (admin)
    pub async fn list_users(&self, params: &ListParams) -> Result<PagedResult<User>, UserServiceError> {
        let (users, total) = self
            .user_repo
            .list(i64::from(params.page), params.limit())
            .await
            .context("Failed to list users")?;
        Ok(PagedResult::new(users, total, params))
    }

    /// Delete an account (admin). Administrators cannot delete themselves.
    pub async fn delete_user(&self, actor: &User, id: i64) -> Result<(), UserServiceError> {
        if actor.id == id {
            return Err(UserServiceError::Forbidden(
                "You cannot delete your own account".into(),
            ));
        }
        let target = self.get_by_id(id).await?.ok_or(UserServiceError::NotFound)?;

        self.user_repo
            .delete(target.id)
            .await
            .context("Failed to delete user")?;

        tracing::info!("User {} deleted by {}", target.username, actor.username);
        Ok(())
    }

    /// Change moderation flags of an account (admin)
    pub async fn set_flags(&self, id: i64, flags: UserFlags) -> Result<User, UserServiceError> {
        let mut user = self.get_by_id(id).await?.ok_or(UserServiceError::NotFound)?;

        if let Some(requires_approval) = flags.requires_approval {
            user.requires_approval = requires_approval;
        }
        if let Some(is_admin) = flags.is_admin {
            user.is_admin = is_admin;
        }

        let updated = self
            .user_repo
            .update(&user)
            .await
            .context("Failed to update user flags")?;

        tracing::info!(
            "Flags for {}: requires_approval={}, is_admin={}",
            updated.username,
            updated.requires_approval,
            updated.is_admin
        );
        Ok(updated)
    }

    /// Members listed on the team page
    pub async fn team(&self) -> Result<Vec<User>, UserServiceError> {
        Ok(self
            .user_repo
            .list_team()
            .await
            .context("Failed to list team")?)
    }

    /// Remove expired sessions, returning how many were deleted
    pub async fn cleanup_expired_sessions(&self) -> Result<i64, UserServiceError> {
        let removed = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to clean up sessions")?;
        self.limiter.cleanup().await;
        Ok(removed)
    }

    async fn create_session(&self, user_id: i64) -> Result<Session, UserServiceError> {
        let session = Session::start(user_id, Duration::days(self.session_expiration_days));
        let created = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;
        Ok(created)
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.contains(char::is_whitespace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxInviteRepository, SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::services::invite::InviteService;

    const PASSWORD: &str = "secret-pass1";

    async fn setup_test_service() -> (DynDatabasePool, UserService, Arc<InviteService>) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let invites = Arc::new(InviteService::new(SqlxInviteRepository::boxed(pool.clone())));
        let service = UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
        );

        (pool, service, invites)
    }

    async fn invite(invites: &InviteService) -> String {
        invites.generate(1).await.unwrap().remove(0).code
    }

    async fn register(service: &UserService, invites: &InviteService, name: &str) -> User {
        let code = invite(invites).await;
        service
            .register(RegisterInput::new(name, PASSWORD, code))
            .await
            .expect("Failed to register")
    }

    // ========================================================================
    // Registration tests
    // ========================================================================

    #[tokio::test]
    async fn test_register_first_user_becomes_admin() {
        let (_pool, service, invites) = setup_test_service().await;

        let user = register(&service, &invites, "admin").await;

        assert!(user.is_admin);
        assert!(!user.requires_approval);
    }

    #[tokio::test]
    async fn test_register_second_user_requires_approval() {
        let (_pool, service, invites) = setup_test_service().await;
        register(&service, &invites, "admin").await;

        let user = register(&service, &invites, "writer").await;

        assert!(!user.is_admin);
        assert!(user.requires_approval);
    }

    #[tokio::test]
    async fn test_register_consumes_invite() {
        let (_pool, service, invites) = setup_test_service().await;
        let code = invite(&invites).await;

        service
            .register(RegisterInput::new("one", PASSWORD, code.clone()))
            .await
            .unwrap();
        let result = service
            .register(RegisterInput::new("two", PASSWORD, code))
            .await;

        assert!(matches!(result, Err(UserServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_register_requires_valid_invite() {
        let (_pool, service, _invites) = setup_test_service().await;
        let result = service
            .register(RegisterInput::new("someone", PASSWORD, "made-up"))
            .await;
        assert!(matches!(result, Err(UserServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_username_keeps_invite() {
        let (_pool, service, invites) = setup_test_service().await;
        register(&service, &invites, "alice").await;

        let code = invite(&invites).await;
        let result = service
            .register(RegisterInput::new("alice", PASSWORD, code.clone()))
            .await;
        assert!(matches!(result, Err(UserServiceError::UserExists(_))));

        service
            .register(RegisterInput::new("bob", PASSWORD, code))
            .await
            .expect("Invite should still be usable");
    }

    #[tokio::test]
    async fn test_concurrent_same_username_burns_one_invite() {
        let (_pool, service, invites) = setup_test_service().await;
        register(&service, &invites, "admin").await;
        let first = invite(&invites).await;
        let second = invite(&invites).await;

        let (a, b) = tokio::join!(
            service.register(RegisterInput::new("dup", PASSWORD, first)),
            service.register(RegisterInput::new("dup", PASSWORD, second)),
        );

        let outcomes = [a, b];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(UserServiceError::UserExists(_)))));

        let unused = invites.list().await.unwrap().iter().filter(|c| !c.used).count();
        assert_eq!(unused, 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_registrations_make_one_admin() {
        let (_pool, service, invites) = setup_test_service().await;
        let first = invite(&invites).await;
        let second = invite(&invites).await;

        let (alice, bob) = tokio::join!(
            service.register(RegisterInput::new("alice", PASSWORD, first)),
            service.register(RegisterInput::new("bob", PASSWORD, second)),
        );
        let (alice, bob) = (alice.unwrap(), bob.unwrap());

        assert!(alice.is_admin ^ bob.is_admin);
        assert_eq!(alice.requires_approval, !alice.is_admin);
        assert_eq!(bob.requires_approval, !bob.is_admin);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (_pool, service, invites) = setup_test_service().await;
        let code = invite(&invites).await;

        let empty = service
            .register(RegisterInput::new("  ", PASSWORD, code.clone()))
            .await;
        assert!(matches!(empty, Err(UserServiceError::ValidationError(_))));

        let weak = service
            .register(RegisterInput::new("alice", "password", code.clone()))
            .await;
        assert!(matches!(weak, Err(UserServiceError::ValidationError(_))));

        let mut mismatch = RegisterInput::new("alice", PASSWORD, code);
        mismatch.confirm_password = "other-pass1".into();
        assert!(matches!(
            service.register(mismatch).await,
            Err(UserServiceError::ValidationError(_))
        ));
    }

    // ========================================================================
    // Login / session tests
    // ========================================================================

    #[tokio::test]
    async fn test_login_and_validate_session() {
        let (_pool, service, invites) = setup_test_service().await;
        let user = register(&service, &invites, "alice").await;

        let session = service
            .login(LoginInput::new("alice", PASSWORD))
            .await
            .expect("Login failed");
        assert_eq!(session.user_id, user.id);

        let found = service.validate_session(&session.id).await.unwrap().unwrap();
        assert_eq!(found.username, "alice");

        service.logout(&session.id).await.unwrap();
        assert!(service.validate_session(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_wrong_credentials() {
        let (_pool, service, invites) = setup_test_service().await;
        register(&service, &invites, "alice").await;

        assert!(matches!(
            service.login(LoginInput::new("alice", "wrong-pass1")).await,
            Err(UserServiceError::AuthenticationError(_))
        ));
        assert!(matches!(
            service.login(LoginInput::new("nobody", PASSWORD)).await,
            Err(UserServiceError::AuthenticationError(_))
        ));
    }

    #[tokio::test]
    async fn test_login_throttled_after_failures() {
        let (_pool, service, invites) = setup_test_service().await;
        register(&service, &invites, "alice").await;

        for _ in 0..crate::services::rate_limiter::MAX_FAILED_ATTEMPTS {
            let _ = service.login(LoginInput::new("alice", "wrong-pass1")).await;
        }

        assert!(matches!(
            service.login(LoginInput::new("alice", PASSWORD)).await,
            Err(UserServiceError::RateLimited)
        ));
    }

    #[tokio::test]
    async fn test_login_throttle_ignores_padding() {
        let (_pool, service, invites) = setup_test_service().await;
        register(&service, &invites, "alice").await;

        for _ in 0..crate::services::rate_limiter::MAX_FAILED_ATTEMPTS {
            let _ = service.login(LoginInput::new("alice", "wrong-pass1")).await;
        }

        for name in [" alice", "alice  ", "\talice", " ALICE "] {
            assert!(matches!(
                service.login(LoginInput::new(name, PASSWORD)).await,
                Err(UserServiceError::RateLimited)
            ));
        }
    }

    #[tokio::test]
    async fn test_padded_failures_share_one_budget() {
        let (_pool, service, invites) = setup_test_service().await;
        register(&service, &invites, "alice").await;

        for n in 0..crate::services::rate_limiter::MAX_FAILED_ATTEMPTS {
            let padded = format!("{}alice", " ".repeat(n));
            let _ = service.login(LoginInput::new(padded, "wrong-pass1")).await;
        }

        assert!(matches!(
            service.login(LoginInput::new("alice", PASSWORD)).await,
            Err(UserServiceError::RateLimited)
        ));
    }

    #[tokio::test]
    async fn test_expired_session_rejected() {
        let (_pool, service, invites) = setup_test_service().await;
        register(&service, &invites, "alice").await;
        let service = service.with_session_expiration(-1);

        let session = service.login(LoginInput::new("alice", PASSWORD)).await.unwrap();
        assert!(service.validate_session(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cleanup_expired_sessions() {
        let (_pool, service, invites) = setup_test_service().await;
        register(&service, &invites, "alice").await;
        let service = service.with_session_expiration(-1);
        service.login(LoginInput::new("alice", PASSWORD)).await.unwrap();

        assert_eq!(service.cleanup_expired_sessions().await.unwrap(), 1);
    }

    // ========================================================================
    // Profile tests
    // ========================================================================

    #[tokio::test]
    async fn test_update_profile() {
        let (_pool, service, invites) = setup_test_service().await;
        let user = register(&service, &invites, "alice").await;

        let updated = service
            .update_profile(
                user.id,
                UpdateProfileInput {
                    bio: Some("Researcher".into()),
                    display_name: Some("Alice".into()),
                    custom_url: Some("https://alice.example".into()),
                    avatar: None,
                    include_in_team_page: Some(true),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.bio.as_deref(), Some("Researcher"));
        assert_eq!(updated.public_name(), "Alice");
        assert!(updated.include_in_team_page);

        let cleared = service
            .update_profile(
                user.id,
                UpdateProfileInput {
                    bio: Some("  ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(cleared.bio.is_none());
        assert_eq!(cleared.display_name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn test_update_profile_validation() {
        let (_pool, service, invites) = setup_test_service().await;
        let user = register(&service, &invites, "alice").await;

        let bad_url = UpdateProfileInput {
            custom_url: Some("ftp://files.example".into()),
            ..Default::default()
        };
        assert!(matches!(
            service.update_profile(user.id, bad_url).await,
            Err(UserServiceError::ValidationError(_))
        ));

        let long_name = UpdateProfileInput {
            display_name: Some("x".repeat(MAX_DISPLAY_NAME_LENGTH + 1)),
            ..Default::default()
        };
        assert!(matches!(
            service.update_profile(user.id, long_name).await,
            Err(UserServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_change_password_invalidates_sessions() {
        let (_pool, service, invites) = setup_test_service().await;
        let user = register(&service, &invites, "alice").await;
        let session = service.login(LoginInput::new("alice", PASSWORD)).await.unwrap();

        let wrong = ChangePasswordInput {
            current_password: "nope".into(),
            new_password: "n3w-password".into(),
            confirm_password: "n3w-password".into(),
        };
        assert!(matches!(
            service.change_password(user.id, wrong).await,
            Err(UserServiceError::AuthenticationError(_))
        ));

        let input = ChangePasswordInput {
            current_password: PASSWORD.into(),
            new_password: "n3w-password".into(),
            confirm_password: "n3w-password".into(),
        };
        service.change_password(user.id, input).await.unwrap();

        assert!(service.validate_session(&session.id).await.unwrap().is_none());
        assert!(service.login(LoginInput::new("alice", "n3w-password")).await.is_ok());
    }

    // ========================================================================
    // Admin tests
    // ========================================================================

    #[tokio::test]
    async fn test_admin_delete_and_flags() {
        let (_pool, service, invites) = setup_test_service().await;
        let admin = register(&service, &invites, "admin").await;
        let writer = register(&service, &invites, "writer").await;

        assert!(matches!(
            service.delete_user(&admin, admin.id).await,
            Err(UserServiceError::Forbidden(_))
        ));

        let updated = service
            .set_flags(
                writer.id,
                UserFlags {
                    requires_approval: Some(false),
                    is_admin: None,
                },
            )
            .await
            .unwrap();
        assert!(!updated.requires_approval);
        assert!(!updated.is_admin);

        service.delete_user(&admin, writer.id).await.unwrap();
        assert!(service.get_by_id(writer.id).await.unwrap().is_none());
        assert!(matches!(
            service.delete_user(&admin, writer.id).await,
            Err(UserServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_users_and_team() {
        let (_pool, service, invites) = setup_test_service().await;
        let admin = register(&service, &invites, "admin").await;
        register(&service, &invites, "writer").await;
        service
            .update_profile(
                admin.id,
                UpdateProfileInput {
                    include_in_team_page: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let page = service.list_users(&ListParams::default()).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 2);

        let team = service.team().await.unwrap();
        assert_eq!(team.len(), 1);
        assert_eq!(team[0].username, "admin");
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://a.example"));
        assert!(is_http_url("http://a.example/path"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("javascript:alert(1)"));
        assert!(!is_http_url("https://a b"));
    }
}
