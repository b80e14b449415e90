//! Article type repository
//!
//! Database operations for article types.

use crate::db::DynDatabasePool;
use crate::models::{ArticleType, ArticleTypeWithCount};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Article type repository trait
#[async_trait]
pub trait ArticleTypeRepository: Send + Sync {
    /// Create a new article type
    async fn create(&self, name: &str) -> Result<ArticleType>;

    /// Get article type by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<ArticleType>>;

    /// Get article type by name
    async fn get_by_name(&self, name: &str) -> Result<Option<ArticleType>>;

    /// All types, alphabetical
    async fn list(&self) -> Result<Vec<ArticleType>>;

    /// All types with the number of articles carrying each one
    async fn list_with_counts(&self) -> Result<Vec<ArticleTypeWithCount>>;

    /// Check if a type name already exists
    async fn exists_by_name(&self, name: &str) -> Result<bool>;
}

/// SQLx-based article type repository implementation
pub struct SqlxArticleTypeRepository {
    pool: DynDatabasePool,
}

impl SqlxArticleTypeRepository {
    /// Create a new SQLx article type repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ArticleTypeRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ArticleTypeRepository for SqlxArticleTypeRepository {
    async fn create(&self, name: &str) -> Result<ArticleType> {
        create_article_type_sqlite(self.pool.as_sqlite(), name).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ArticleType>> {
        get_article_type_by_id_sqlite(self.pool.as_sqlite(), id).await
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<ArticleType>> {
        get_article_type_by_name_sqlite(self.pool.as_sqlite(), name).await
    }

    async fn list(&self) -> Result<Vec<ArticleType>> {
        list_article_types_sqlite(self.pool.as_sqlite()).await
    }

    async fn list_with_counts(&self) -> Result<Vec<ArticleTypeWithCount>> {
        list_article_types_with_counts_sqlite(self.pool.as_sqlite()).await
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool> {
        Ok(self.get_by_name(name).await?.is_some())
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_article_type_sqlite(pool: &SqlitePool, name: &str) -> Result<ArticleType> {
    let now = Utc::now();

    let result = sqlx::query("INSERT INTO article_types (name, created_at) VALUES (?, ?)")
        .bind(name)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create article type")?;

    Ok(ArticleType {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        created_at: now,
    })
}

async fn get_article_type_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<ArticleType>> {
    let row = sqlx::query("SELECT id, name, created_at FROM article_types WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get article type by ID")?;

    row.as_ref().map(row_to_article_type_sqlite).transpose()
}

async fn get_article_type_by_name_sqlite(
    pool: &SqlitePool,
    name: &str,
) -> Result<Option<ArticleType>> {
    let row = sqlx::query("SELECT id, name, created_at FROM article_types WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await
        .context("Failed to get article type by name")?;

    row.as_ref().map(row_to_article_type_sqlite).transpose()
}

async fn list_article_types_sqlite(pool: &SqlitePool) -> Result<Vec<ArticleType>> {
    let rows = sqlx::query("SELECT id, name, created_at FROM article_types ORDER BY name ASC")
        .fetch_all(pool)
        .await
        .context("Failed to list article types")?;

    rows.iter().map(row_to_article_type_sqlite).collect()
}

async fn list_article_types_with_counts_sqlite(
    pool: &SqlitePool,
) -> Result<Vec<ArticleTypeWithCount>> {
    let rows = sqlx::query(
        r#"
        SELECT t.id, t.name, t.created_at, COUNT(a.id) as article_count
        FROM article_types t
        LEFT JOIN article_article_types aat ON aat.article_type_id = t.id
        LEFT JOIN articles a ON a.id = aat.article_id
        GROUP BY t.id, t.name, t.created_at
        ORDER BY t.name ASC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list article types with counts")?;

    rows.iter()
        .map(|row| {
            Ok(ArticleTypeWithCount {
                article_type: row_to_article_type_sqlite(row)?,
                article_count: row.try_get("article_count")?,
            })
        })
        .collect()
}

fn row_to_article_type_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<ArticleType> {
    Ok(ArticleType {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}
