//! Category service
//!
//! Flat editorial categories managed by administrators. Deleting a
//! category detaches it from its articles.

use crate::db::repositories::{is_unique_violation, CategoryRepository};
use crate::models::Category;
use crate::services::article_type::validate_name;
use anyhow::Context;
use std::sync::Arc;

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Category name already exists
    #[error("Category name already exists: {0}")]
    DuplicateName(String),

    /// Category not found
    #[error("Category not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Category service
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// Create a category with a unique name
    pub async fn create(&self, name: &str) -> Result<Category, CategoryServiceError> {
        let name = validate_name(name).map_err(CategoryServiceError::ValidationError)?;

        if self
            .repo
            .exists_by_name(&name)
            .await
            .context("Failed to check category name")?
        {
            return Err(CategoryServiceError::DuplicateName(name));
        }

        match self.repo.create(&name).await {
            Ok(category) => {
                tracing::info!("Created category {}", category.name);
                Ok(category)
            }
            Err(e) if is_unique_violation(&e) => Err(CategoryServiceError::DuplicateName(name)),
            Err(e) => Err(e.context("Failed to create category").into()),
        }
    }

    /// All categories, alphabetical
    pub async fn list(&self) -> Result<Vec<Category>, CategoryServiceError> {
        Ok(self.repo.list().await.context("Failed to list categories")?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Category>, CategoryServiceError> {
        Ok(self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?)
    }

    /// Delete a category
    pub async fn delete(&self, id: i64) -> Result<(), CategoryServiceError> {
        let category = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| CategoryServiceError::NotFound(format!("id={}", id)))?;

        self.repo
            .delete(id)
            .await
            .context("Failed to delete category")?;

        tracing::info!("Deleted category {}", category.name);
        Ok(())
    }

    /// Keep only ids of existing categories, rejecting unknown ones
    pub async fn resolve_ids(&self, ids: &[i64]) -> Result<Vec<i64>, CategoryServiceError> {
        let known = self.list().await?;
        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            if !known.iter().any(|c| c.id == *id) {
                return Err(CategoryServiceError::ValidationError(format!(
                    "Unknown category: {}",
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
