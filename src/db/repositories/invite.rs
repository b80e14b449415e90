//! Invitation code repository

use crate::db::DynDatabasePool;
use crate::models::InvitationCode;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::sync::Arc;

/// Invitation code repository trait
#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Store a new unused code
    async fn create(&self, code: &str, expiration_date: DateTime<Utc>) -> Result<InvitationCode>;

    /// All codes, newest first
    async fn list(&self) -> Result<Vec<InvitationCode>>;
}

/// SQLx-based invitation code repository implementation
pub struct SqlxInviteRepository {
    pool: DynDatabasePool,
}

impl SqlxInviteRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn InviteRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl InviteRepository for SqlxInviteRepository {
    async fn create(&self, code: &str, expiration_date: DateTime<Utc>) -> Result<InvitationCode> {
        create_invite_sqlite(self.pool.as_sqlite(), code, expiration_date).await
    }

    async fn list(&self) -> Result<Vec<InvitationCode>> {
        list_invites_sqlite(self.pool.as_sqlite()).await
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_invite_sqlite(
    pool: &SqlitePool,
    code: &str,
    expiration_date: DateTime<Utc>,
) -> Result<InvitationCode> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO invitation_codes (code, used, expiration_date, created_at)
        VALUES (?, 0, ?, ?)
        "#,
    )
    .bind(code)
    .bind(expiration_date)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create invitation code")?;

    Ok(InvitationCode {
        id: result.last_insert_rowid(),
        code: code.to_string(),
        used: false,
        expiration_date,
        created_at: now,
    })
}

/// Mark a code used if it is unused and not expired.
///
/// Returns `false` when the code does not exist, was already used or has
/// expired. Runs on the caller's connection so registration can redeem and
/// insert the account in one transaction.
pub(crate) async fn redeem_invite(conn: &mut SqliteConnection, code: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE invitation_codes
        SET used = 1
        WHERE code = ? AND used = 0 AND expiration_date > ?
        "#,
    )
    .bind(code)
    .bind(Utc::now())
    .execute(conn)
    .await
    .context("Failed to redeem invitation code")?;

    Ok(result.rows_affected() == 1)
}

async fn list_invites_sqlite(pool: &SqlitePool) -> Result<Vec<InvitationCode>> {
    let rows = sqlx::query(
        r#"
        SELECT id, code, used, expiration_date, created_at
        FROM invitation_codes
        ORDER BY id DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list invitation codes")?;

    rows.iter().map(row_to_invite_sqlite).collect()
}

fn row_to_invite_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<InvitationCode> {
    Ok(InvitationCode {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        used: row.try_get("used")?,
        expiration_date: row.try_get("expiration_date")?,
        created_at: row.try_get("created_at")?,
    })
}
