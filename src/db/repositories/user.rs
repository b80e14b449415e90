//! User repository
//!
//! Database operations for users.
//!
//! This module provides:
//! - `UserRepository` trait defining the interface for user data access
//! - `SqlxUserRepository` implementing the trait for SQLite

use crate::db::repositories::invite::redeem_invite;
use crate::db::repositories::is_unique_violation;
use crate::db::DynDatabasePool;
use crate::models::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::sync::Arc;

/// Outcome of an invite-gated registration
#[derive(Debug)]
pub enum Registration {
    Created(User),
    /// Unknown, used or expired invitation code
    InvalidInvite,
    UsernameTaken,
}

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: &User) -> Result<User>;

    /// Redeem `invite_code` and insert `user` in one transaction.
    ///
    /// The account becomes an administrator exempt from approval when no
    /// other user exists at insert time; the `is_admin` and
    /// `requires_approval` fields of `user` are ignored. Nothing is written
    /// unless both steps succeed.
    async fn register(&self, user: &User, invite_code: &str) -> Result<Registration>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Update profile fields, flags and password hash
    async fn update(&self, user: &User) -> Result<User>;

    /// Delete a user
    async fn delete(&self, id: i64) -> Result<()>;

    /// List all users with pagination
    async fn list(&self, page: i64, per_page: i64) -> Result<(Vec<User>, i64)>;

    /// Users who opted into the team page, by username
    async fn list_team(&self) -> Result<Vec<User>>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        create_user_sqlite(self.pool.as_sqlite(), user).await
    }

    async fn register(&self, user: &User, invite_code: &str) -> Result<Registration> {
        register_user_sqlite(self.pool.as_sqlite(), user, invite_code).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        get_user_by_id_sqlite(self.pool.as_sqlite(), id).await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        get_user_by_username_sqlite(self.pool.as_sqlite(), username).await
    }

    async fn update(&self, user: &User) -> Result<User> {
        update_user_sqlite(self.pool.as_sqlite(), user).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        delete_user_sqlite(self.pool.as_sqlite(), id).await
    }

    async fn list(&self, page: i64, per_page: i64) -> Result<(Vec<User>, i64)> {
        list_users_sqlite(self.pool.as_sqlite(), page, per_page).await
    }

    async fn list_team(&self) -> Result<Vec<User>> {
        list_team_sqlite(self.pool.as_sqlite()).await
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

const USER_COLUMNS: &str = "id, username, password_hash, bio, display_name, custom_url, avatar, \
                            include_in_team_page, requires_approval, is_admin, created_at";

async fn create_user_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;
    insert_user(&mut conn, user).await
}

async fn insert_user(conn: &mut SqliteConnection, user: &User) -> Result<User> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, password_hash, bio, display_name, custom_url, avatar,
                           include_in_team_page, requires_approval, is_admin, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.bio)
    .bind(&user.display_name)
    .bind(&user.custom_url)
    .bind(&user.avatar)
    .bind(user.include_in_team_page)
    .bind(user.requires_approval)
    .bind(user.is_admin)
    .bind(now)
    .execute(conn)
    .await
    .context("Failed to create user")?;

    Ok(User {
        id: result.last_insert_rowid(),
        created_at: now,
        ..user.clone()
    })
}

async fn register_user_sqlite(
    pool: &SqlitePool,
    user: &User,
    invite_code: &str,
) -> Result<Registration> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    // The redeem UPDATE takes the write lock, so the emptiness check below
    // cannot race another registration.
    if !redeem_invite(&mut tx, invite_code).await? {
        tx.rollback().await.context("Failed to roll back registration")?;
        return Ok(Registration::InvalidInvite);
    }

    let row = sqlx::query("SELECT NOT EXISTS (SELECT 1 FROM users) AS is_first")
        .fetch_one(&mut *tx)
        .await
        .context("Failed to check for existing users")?;
    let is_first: bool = row.try_get("is_first")?;

    let user = User {
        is_admin: is_first,
        requires_approval: !is_first,
        ..user.clone()
    };

    let created = match insert_user(&mut tx, &user).await {
        Ok(created) => created,
        Err(e) if is_unique_violation(&e) => {
            tx.rollback().await.context("Failed to roll back registration")?;
            return Ok(Registration::UsernameTaken);
        }
        Err(e) => return Err(e),
    };

    tx.commit().await.context("Failed to commit registration")?;
    Ok(Registration::Created(created))
}

async fn get_user_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by ID")?;

    row.as_ref().map(row_to_user_sqlite).transpose()
}

async fn get_user_by_username_sqlite(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS))
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by username")?;

    row.as_ref().map(row_to_user_sqlite).transpose()
}

async fn update_user_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = ?, bio = ?, display_name = ?, custom_url = ?, avatar = ?,
            include_in_team_page = ?, requires_approval = ?, is_admin = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.password_hash)
    .bind(&user.bio)
    .bind(&user.display_name)
    .bind(&user.custom_url)
    .bind(&user.avatar)
    .bind(user.include_in_team_page)
    .bind(user.requires_approval)
    .bind(user.is_admin)
    .bind(user.id)
    .execute(pool)
    .await
    .context("Failed to update user")?;

    get_user_by_id_sqlite(pool, user.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User not found after update"))
}

async fn delete_user_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete user")?;

    Ok(())
}

async fn count_users_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;

    Ok(row.get("count"))
}

async fn list_users_sqlite(pool: &SqlitePool, page: i64, per_page: i64) -> Result<(Vec<User>, i64)> {
    let offset = (page - 1).max(0) * per_page;

    let rows = sqlx::query(&format!(
        "SELECT {} FROM users ORDER BY username ASC LIMIT ? OFFSET ?",
        USER_COLUMNS
    ))
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list users")?;

    let users = rows.iter().map(row_to_user_sqlite).collect::<Result<Vec<_>>>()?;
    let total = count_users_sqlite(pool).await?;

    Ok((users, total))
}

async fn list_team_sqlite(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM users WHERE include_in_team_page = 1 ORDER BY username ASC",
        USER_COLUMNS
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list team members")?;

    rows.iter().map(row_to_user_sqlite).collect()
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        bio: row.try_get("bio")?,
        display_name: row.try_get("display_name")?,
        custom_url: row.try_get("custom_url")?,
        avatar: row.try_get("avatar")?,
        include_in_team_page: row.try_get("include_in_team_page")?,
        requires_approval: row.try_get("requires_approval")?,
        is_admin: row.try_get("is_admin")?,
        created_at: row.try_get("created_at")?,
    })
}
