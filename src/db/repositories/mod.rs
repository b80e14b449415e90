//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod article;
pub mod article_type;
pub mod category;
pub mod invite;
pub mod session;
pub mod user;

pub use article::{ArticleFilter, ArticleOrder, ArticleRepository, SqlxArticleRepository};
pub use article_type::{ArticleTypeRepository, SqlxArticleTypeRepository};
pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use invite::{InviteRepository, SqlxInviteRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{Registration, SqlxUserRepository, UserRepository};

/// Whether a repository error was caused by a UNIQUE constraint.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<sqlx::Error>(),
            Some(sqlx::Error::Database(db)) if db.is_unique_violation()
        )
    })
}
