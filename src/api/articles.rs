//! Article API endpoints
//!
//! Handles HTTP requests for articles:
//! - GET /api/v1/articles/home - Home page sections
//! - GET /api/v1/articles/all/{listing} - Full listings (recent, edited, external, a-z)
//! - GET /api/v1/articles/{slug} - Article page (pending articles: admin only)
//! - POST /api/v1/articles - Publish an article
//! - PUT /api/v1/articles/{slug} - Edit an article
//! - DELETE /api/v1/articles/{id} - Delete an article

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser, MaybeUser};
use crate::models::{Article, CreateArticleInput, UpdateArticleInput};
use crate::services::{ArticlePage, ArticleSummary, HomePage, Listing};

/// Public listing routes
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/home", get(home))
        .route("/all/{listing}", get(listing))
}

/// Article page route, wrapped in `optional_auth` by the caller
pub fn page_router() -> Router<AppState> {
    Router::new().route("/{slug}", get(get_article))
}

/// Routes that need a signed-in user
pub fn protected_router() -> Router<AppState> {
    // DELETE takes a numeric id in the same path segment as the slug
    Router::new()
        .route("/", post(create_article))
        .route("/{slug}", axum::routing::put(update_article).delete(delete_article))
}

/// GET /api/v1/articles/home
async fn home(State(state): State<AppState>) -> Result<Json<HomePage>, ApiError> {
    Ok(Json(state.article_service.home().await?))
}

/// GET /api/v1/articles/all/{listing}
async fn listing(
    State(state): State<AppState>,
    Path(listing): Path<String>,
) -> Result<Json<Vec<ArticleSummary>>, ApiError> {
    let listing = Listing::from_path(&listing)
        .ok_or_else(|| ApiError::not_found(format!("Unknown listing: {}", listing)))?;
    Ok(Json(state.article_service.listing(listing).await?))
}

/// GET /api/v1/articles/{slug}
///
/// Pending articles answer 404 unless the viewer is an administrator.
async fn get_article(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(slug): Path<String>,
) -> Result<Json<ArticlePage>, ApiError> {
    let page = state
        .article_service
        .article_page(&slug, viewer.as_ref())
        .await?;
    Ok(Json(page))
}

/// POST /api/v1/articles
async fn create_article(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateArticleInput>,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    let article = state.article_service.publish(&user.0, body).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

/// PUT /api/v1/articles/{slug}
async fn update_article(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
    Json(body): Json<UpdateArticleInput>,
) -> Result<Json<Article>, ApiError> {
    let article = state.article_service.edit(&slug, &user.0, body).await?;
    Ok(Json(article))
}

/// DELETE /api/v1/articles/{id}
async fn delete_article(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.article_service.delete(id, &user.0).await?;
    Ok(StatusCode::NO_CONTENT)
}
