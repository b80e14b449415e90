//! Data models
//!
//! This module contains the data structures used throughout the site:
//! - Database entities (Article, ArticleType, Category, User, Session, InvitationCode)
//! - Input types for publishing, editing and profile changes
//! - Pagination helpers

mod article;
mod article_type;
mod category;
mod invite;
mod pagination;
mod session;
mod user;

pub use article::{
    join_countries, Article, ArticleLinks, CreateArticleInput, LinkKind, NewArticle,
    UpdateArticleInput, MAX_LINKS_PER_KIND,
};
pub use article_type::{ArticleType, ArticleTypeWithCount, LIMITED_DISTRIBUTION, SEED_ARTICLE_TYPES};
pub use category::Category;
pub use invite::InvitationCode;
pub use pagination::{ListParams, PagedResult};
pub use session::Session;
pub use user::{UpdateProfileInput, User, UserFlags};
