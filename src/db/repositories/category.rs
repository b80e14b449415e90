//! Category repository
//!
//! Database operations for categories.

use crate::db::DynDatabasePool;
use crate::models::Category;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, name: &str) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// All categories, alphabetical
    async fn list(&self) -> Result<Vec<Category>>;

    /// Delete a category; associations are removed by cascade
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if a category name already exists
    async fn exists_by_name(&self, name: &str) -> Result<bool>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, name: &str) -> Result<Category> {
        create_category_sqlite(self.pool.as_sqlite(), name).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        get_category_by_id_sqlite(self.pool.as_sqlite(), id).await
    }

    async fn list(&self) -> Result<Vec<Category>> {
        list_categories_sqlite(self.pool.as_sqlite()).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        delete_category_sqlite(self.pool.as_sqlite(), id).await
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool> {
        exists_by_name_sqlite(self.pool.as_sqlite(), name).await
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_category_sqlite(pool: &SqlitePool, name: &str) -> Result<Category> {
    let now = Utc::now();

    let result = sqlx::query("INSERT INTO categories (name, created_at) VALUES (?, ?)")
        .bind(name)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create category")?;

    Ok(Category {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        created_at: now,
    })
}

async fn get_category_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Category>> {
    let row = sqlx::query("SELECT id, name, created_at FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by ID")?;

    row.as_ref().map(row_to_category_sqlite).transpose()
}

async fn list_categories_sqlite(pool: &SqlitePool) -> Result<Vec<Category>> {
    let rows = sqlx::query("SELECT id, name, created_at FROM categories ORDER BY name ASC")
        .fetch_all(pool)
        .await
        .context("Failed to list categories")?;

    rows.iter().map(row_to_category_sqlite).collect()
}

async fn delete_category_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete category")?;

    Ok(())
}

async fn exists_by_name_sqlite(pool: &SqlitePool, name: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM categories WHERE name = ?")
        .bind(name)
        .fetch_one(pool)
        .await
        .context("Failed to check category name")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

fn row_to_category_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Category> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> (DynDatabasePool, SqlxCategoryRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxCategoryRepository::new(pool.clone());
        (pool, repo)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo.create("Health").await.expect("Failed to create category");

        assert!(created.id > 0);
        let found = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Health");
        assert!(repo.exists_by_name("Health").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_alphabetical() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create("Military").await.unwrap();
        repo.create("Finance").await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Finance", "Military"]);
    }

    #[tokio::test]
    async fn test_duplicate_rejected() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create("Finance").await.unwrap();
        assert!(repo.create("Finance").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_removes_associations() {
        let (pool, repo) = setup_test_repo().await;
        let category = repo.create("Finance").await.unwrap();
        pool.execute(
            "INSERT INTO articles (id, title, slug, content, author, publish_date) \
             VALUES (1, 't', 's', 'c', 'a', CURRENT_TIMESTAMP)",
        )
        .await
        .unwrap();
        sqlx::query("INSERT INTO article_categories (article_id, category_id) VALUES (1, ?)")
            .bind(category.id)
            .execute(pool.as_sqlite())
            .await
            .unwrap();

        repo.delete(category.id).await.unwrap();

        assert!(repo.get_by_id(category.id).await.unwrap().is_none());
        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM article_categories")
            .fetch_one(pool.as_sqlite())
            .await
            .unwrap();
        assert_eq!(links, 0);
    }
}
