//! Public site information API
//!
//! - GET /api/v1/article-types - Types with at least one article
//! - GET /api/v1/categories - All categories
//! - GET /api/v1/team - Members who opted into the team page
//! - GET /api/v1/impact - Headline figures
//! - GET /api/v1/article_count - `{"count": n}` for the external display

use axum::{extract::State, routing::get, Json, Router};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{CountResponse, TeamMemberResponse};
use crate::models::{ArticleTypeWithCount, Category};
use crate::services::ImpactMetrics;

/// Build the public site router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/article-types", get(article_types))
        .route("/categories", get(categories))
        .route("/team", get(team))
        .route("/impact", get(impact))
        .route("/article_count", get(article_count))
}

async fn article_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<ArticleTypeWithCount>>, ApiError> {
    Ok(Json(state.article_type_service.list_in_use().await?))
}

async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.category_service.list().await?))
}

async fn team(State(state): State<AppState>) -> Result<Json<Vec<TeamMemberResponse>>, ApiError> {
    let members = state.user_service.team().await?;
    Ok(Json(members.into_iter().map(TeamMemberResponse::from).collect()))
}

async fn impact(State(state): State<AppState>) -> Result<Json<ImpactMetrics>, ApiError> {
    Ok(Json(state.article_service.impact().await?))
}

/// GET /api/v1/article_count
async fn article_count(State(state): State<AppState>) -> Result<Json<CountResponse>, ApiError> {
    let count = state.article_service.count().await?;
    Ok(Json(CountResponse { count }))
}
