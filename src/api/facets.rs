//! Facet browsing endpoints
//!
//! - GET /api/v1/facets - Types, countries and sources that have articles
//! - GET /api/v1/facets/top - Most frequent facets
//! - GET /api/v1/facets/{source,country,author,type}/{value} - Articles per facet

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::services::{ArticleSummary, FacetCount, FacetIndex};

#[derive(Debug, Deserialize)]
pub struct TopFacetsQuery {
    pub limit: Option<usize>,
}

/// Largest `limit` accepted by /facets/top
const MAX_TOP_FACETS: usize = 50;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/top", get(top))
        .route("/source/{source}", get(by_source))
        .route("/country/{country}", get(by_country))
        .route("/author/{author}", get(by_author))
        .route("/type/{name}", get(by_type))
}

async fn index(State(state): State<AppState>) -> Result<Json<FacetIndex>, ApiError> {
    Ok(Json(state.article_service.facet_index().await?))
}

/// GET /api/v1/facets/top?limit=n
async fn top(
    State(state): State<AppState>,
    Query(query): Query<TopFacetsQuery>,
) -> Result<Json<Vec<FacetCount>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(state.facet_limit)
        .min(MAX_TOP_FACETS);
    Ok(Json(state.article_service.top_facets(limit).await?))
}

async fn by_source(
    State(state): State<AppState>,
    Path(source): Path<String>,
) -> Result<Json<Vec<ArticleSummary>>, ApiError> {
    Ok(Json(state.article_service.by_source(&source).await?))
}

async fn by_country(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> Result<Json<Vec<ArticleSummary>>, ApiError> {
    Ok(Json(state.article_service.by_country(&country).await?))
}

async fn by_author(
    State(state): State<AppState>,
    Path(author): Path<String>,
) -> Result<Json<Vec<ArticleSummary>>, ApiError> {
    Ok(Json(state.article_service.by_author(&author).await?))
}

/// `all` lists every approved article
async fn by_type(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ArticleSummary>>, ApiError> {
    Ok(Json(state.article_service.by_type(&name).await?))
}
