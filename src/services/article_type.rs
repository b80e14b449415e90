//! Article type service
//!
//! Types are seeded by the migrations; administrators can add new ones.
//! The public type index only lists types that carry at least one
//! approved article.

use crate::db::repositories::{is_unique_violation, ArticleTypeRepository};
use crate::models::{ArticleType, ArticleTypeWithCount};
use anyhow::Context;
use std::sync::Arc;

/// Longest accepted type or category name
pub const MAX_NAME_LENGTH: usize = 50;

/// Error types for article type operations
#[derive(Debug, thiserror::Error)]
pub enum ArticleTypeServiceError {
    #[error("Article type already exists: {0}")]
    DuplicateName(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Trim a type or category name and check its length.
pub(crate) fn validate_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(format!("Name must be at most {} characters", MAX_NAME_LENGTH));
    }
    Ok(name.to_string())
}

pub struct ArticleTypeService {
    repo: Arc<dyn ArticleTypeRepository>,
}

impl ArticleTypeService {
    pub fn new(repo: Arc<dyn ArticleTypeRepository>) -> Self {
        Self { repo }
    }

    /// Every type, alphabetical
    pub async fn list(&self) -> Result<Vec<ArticleType>, ArticleTypeServiceError> {
        Ok(self.repo.list().await.context("Failed to list article types")?)
    }

    /// Types carried by at least one article, alphabetical
    pub async fn list_in_use(&self) -> Result<Vec<ArticleTypeWithCount>, ArticleTypeServiceError> {
        let types = self
            .repo
            .list_with_counts()
            .await
            .context("Failed to list article types")?;
        Ok(types.into_iter().filter(|t| t.article_count > 0).collect())
    }

    pub async fn create(&self, name: &str) -> Result<ArticleType, ArticleTypeServiceError> {
        let name = validate_name(name).map_err(ArticleTypeServiceError::ValidationError)?;

        if self
            .repo
            .exists_by_name(&name)
            .await
            .context("Failed to check article type name")?
        {
            return Err(ArticleTypeServiceError::DuplicateName(name));
        }

        match self.repo.create(&name).await {
            Ok(created) => {
                tracing::info!("Created article type {}", created.name);
                Ok(created)
            }
            Err(e) if is_unique_violation(&e) => Err(ArticleTypeServiceError::DuplicateName(name)),
            Err(e) => Err(e.context("Failed to create article type").into()),
        }
    }

    /// Keep only ids of existing types, rejecting unknown ones
    pub async fn resolve_ids(&self, ids: &[i64]) -> Result<Vec<i64>, ArticleTypeServiceError> {
        let known = self.list().await?;
        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            if !known.iter().any(|t| t.id == *id) {
                return Err(ArticleTypeServiceError::ValidationError(format!(
                    "Unknown article type: {}",
                    id
                )));
            }
            if !resolved.contains(id) {
                resolved.push(*id);
            }
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxArticleTypeRepository;
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::models::SEED_ARTICLE_TYPES;

    async fn setup_test_service() -> (DynDatabasePool, ArticleTypeService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let service = ArticleTypeService::new(SqlxArticleTypeRepository::boxed(pool.clone()));
        (pool, service)
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Leak  "), Ok("Leak".to_string()));
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH)).is_ok());
        assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[tokio::test]
    async fn test_list_seeded() {
        let (_pool, service) = setup_test_service().await;
        assert_eq!(service.list().await.unwrap().len(), SEED_ARTICLE_TYPES.len());
    }

    #[tokio::test]
    async fn test_list_in_use_empty_without_articles() {
        let (_pool, service) = setup_test_service().await;
        assert!(service.list_in_use().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create() {
        let (_pool, service) = setup_test_service().await;
        let created = service.create(" Whistleblower ").await.unwrap();
        assert_eq!(created.name, "Whistleblower");

        assert!(matches!(
            service.create("Whistleblower").await,
            Err(ArticleTypeServiceError::DuplicateName(_))
        ));
        assert!(matches!(
            service.create("").await,
            Err(ArticleTypeServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_ids() {
        let (_pool, service) = setup_test_service().await;
        let types = service.list().await.unwrap();
        let a = types[0].id;
        let b = types[1].id;

        assert_eq!(service.resolve_ids(&[a, b, a]).await.unwrap(), vec![a, b]);
        assert!(matches!(
            service.resolve_ids(&[9999]).await,
            Err(ArticleTypeServiceError::ValidationError(_))
        ));
    }
}
