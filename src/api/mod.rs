//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP API endpoints of the site:
//! - Auth endpoints (register, login, profile)
//! - Article endpoints (listings, pages, publishing)
//! - Facet browsing endpoints
//! - Public site endpoints (types, categories, team, impact)
//! - Admin endpoints (moderation, users, invites, taxonomy)

pub mod admin;
pub mod articles;
pub mod auth;
pub mod common;
pub mod facets;
pub mod middleware;
pub mod responses;
pub mod site;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::SiteConfig;
use crate::db::repositories::{
    SqlxArticleRepository, SqlxArticleTypeRepository, SqlxCategoryRepository,
    SqlxInviteRepository, SqlxSessionRepository, SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::services::{
    ArticleService, ArticleTypeService, CategoryService, InviteService, UserService,
};

pub use middleware::{ApiError, AppState, AuthenticatedUser, MaybeUser};

/// Wire repositories and services over one pool
pub fn build_state(pool: DynDatabasePool, site: &SiteConfig) -> AppState {
    let invite_service = Arc::new(
        InviteService::new(SqlxInviteRepository::boxed(pool.clone()))
            .with_valid_days(site.invite_valid_days),
    );
    let user_service = Arc::new(
        UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
        )
        .with_session_expiration(site.session_days),
    );
    let article_type_service = Arc::new(ArticleTypeService::new(
        SqlxArticleTypeRepository::boxed(pool.clone()),
    ));
    let category_service = Arc::new(CategoryService::new(SqlxCategoryRepository::boxed(
        pool.clone(),
    )));
    let article_service = Arc::new(
        ArticleService::new(
            SqlxArticleRepository::boxed(pool),
            article_type_service.clone(),
            category_service.clone(),
        )
        .with_home_section_size(site.home_section_size as usize)
        .with_facet_limit(site.facet_limit),
    );

    AppState {
        user_service,
        invite_service,
        article_service,
        article_type_service,
        category_service,
        session_days: site.session_days,
        facet_limit: site.facet_limit,
    }
}

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need admin role)
    let admin_routes = Router::new()
        .nest("/admin", admin::router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but not admin)
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .nest("/articles", articles::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Article page: public, but admins also see pending articles
    let article_page = Router::new()
        .nest("/articles", articles::page_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::optional_auth,
        ));

    // Public routes
    Router::new()
        .nest("/auth", auth::public_router())
        .nest("/articles", articles::public_router())
        .nest("/facets", facets::router())
        .merge(site::router())
        .merge(article_page)
        .merge(admin_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;

    // Cookie auth needs credentials, so the origin must be explicit
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Ok(Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
