//! Services layer - Business logic
//!
//! This module contains all business logic services for the site.
//! Services are responsible for:
//! - Implementing business rules (moderation, ownership, invitations)
//! - Coordinating between repositories
//! - Handling validation and error cases
//!
//! The pure helpers (slugs, sizes, facets, password policy) live here too.

pub mod article;
pub mod article_type;
pub mod category;
pub mod facets;
pub mod invite;
pub mod markdown;
pub mod password;
pub mod rate_limiter;
pub mod size;
pub mod slug;
pub mod user;

pub use article::{
    ArticlePage, ArticleService, ArticleServiceError, ArticleSummary, FacetIndex, HomePage,
    HomeSection, ImpactMetrics, Listing, RelatedGroup,
};
pub use article_type::{ArticleTypeService, ArticleTypeServiceError};
pub use category::{CategoryService, CategoryServiceError};
pub use facets::{top_facets, FacetCount, FacetDimension, DEFAULT_FACET_LIMIT};
pub use invite::{generate_invite_code, InviteService, InviteServiceError};
pub use markdown::MarkdownRenderer;
pub use password::{hash_password, validate_new_password, verify_password, PasswordPolicyError};
pub use rate_limiter::LoginRateLimiter;
pub use size::{format_size, parse_size, SizeError};
pub use slug::{generate_slug, slugify};
pub use user::{ChangePasswordInput, LoginInput, RegisterInput, UserService, UserServiceError};
