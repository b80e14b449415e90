//! Admin API endpoints
//!
//! Handles HTTP requests for site administration:
//! - Moderation queue and approval
//! - Account management (list, flags, delete)
//! - Invitation codes
//! - Article types and categories
//!
//! Every route here sits behind `require_auth` + `require_admin`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::PaginationQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{PaginatedUsersResponse, UserResponse};
use crate::models::{Article, ArticleType, Category, InvitationCode, UserFlags};

/// Request body for generating invitation codes
#[derive(Debug, Deserialize)]
pub struct GenerateInvitesRequest {
    #[serde(default = "default_invite_count")]
    pub count: usize,
}

fn default_invite_count() -> usize {
    1
}

/// Request body for creating a type or category
#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

/// Build the admin router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/articles/pending", get(pending_articles))
        .route("/articles/{slug}/approve", post(approve_article))
        .route("/users", get(list_users))
        .route("/users/{id}", put(update_user).delete(delete_user))
        .route("/invites", get(list_invites).post(generate_invites))
        .route("/article-types", post(create_article_type))
        .route("/categories", post(create_category))
        .route("/categories/{id}", delete(delete_category))
}

// ============================================================================
// Moderation
// ============================================================================

/// GET /api/v1/admin/articles/pending
async fn pending_articles(State(state): State<AppState>) -> Result<Json<Vec<Article>>, ApiError> {
    Ok(Json(state.article_service.pending().await?))
}

/// POST /api/v1/admin/articles/{slug}/approve
async fn approve_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Article>, ApiError> {
    Ok(Json(state.article_service.approve(&slug).await?))
}

// ============================================================================
// Users
// ============================================================================

/// GET /api/v1/admin/users?page=&per_page=
async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PaginatedUsersResponse>, ApiError> {
    let result = state.user_service.list_users(&query.into()).await?;
    Ok(Json(result.into()))
}

/// PUT /api/v1/admin/users/{id} - Change moderation flags
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(flags): Json<UserFlags>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = state.user_service.set_flags(id, flags).await?;
    Ok(Json(updated.into()))
}

/// DELETE /api/v1/admin/users/{id}
async fn delete_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.user_service.delete_user(&user.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Invitation codes
// ============================================================================

/// GET /api/v1/admin/invites
async fn list_invites(State(state): State<AppState>) -> Result<Json<Vec<InvitationCode>>, ApiError> {
    Ok(Json(state.invite_service.list().await?))
}

/// POST /api/v1/admin/invites
async fn generate_invites(
    State(state): State<AppState>,
    Json(body): Json<GenerateInvitesRequest>,
) -> Result<(StatusCode, Json<Vec<InvitationCode>>), ApiError> {
    let codes = state.invite_service.generate(body.count).await?;
    Ok((StatusCode::CREATED, Json(codes)))
}

// ============================================================================
// Taxonomy
// ============================================================================

/// POST /api/v1/admin/article-types
async fn create_article_type(
    State(state): State<AppState>,
    Json(body): Json<NameRequest>,
) -> Result<(StatusCode, Json<ArticleType>), ApiError> {
    let created = state.article_type_service.create(&body.name).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/v1/admin/categories
async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<NameRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let created = state.category_service.create(&body.name).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/v1/admin/categories/{id}
async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.category_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
