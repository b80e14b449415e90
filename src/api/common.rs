//! Common API utilities and shared types
//!
//! This module contains shared utilities used across multiple API endpoints.

use axum::http::{header, HeaderMap, HeaderValue};
use serde::Deserialize;

use crate::models::ListParams;

// ============================================================================
// Pagination
// ============================================================================

/// Default page number (1-indexed)
pub fn default_page() -> u32 {
    1
}

/// Default page size for admin APIs
pub fn default_per_page() -> u32 {
    20
}

/// Admin pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl From<PaginationQuery> for ListParams {
    fn from(query: PaginationQuery) -> Self {
        ListParams::new(query.page, query.per_page)
    }
}

// ============================================================================
// Session cookie
// ============================================================================

/// `Set-Cookie` header carrying a session token
pub fn session_cookie(token: &str, days: i64) -> HeaderMap {
    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        token,
        days.max(0) * 24 * 60 * 60
    );
    cookie_header(&cookie)
}

/// `Set-Cookie` header that removes the session cookie
pub fn clear_session_cookie() -> HeaderMap {
    cookie_header("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn cookie_header(cookie: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    // Tokens are UUIDs, so the value is always a valid header
    if let Ok(value) = HeaderValue::from_str(cookie) {
        headers.insert(header::SET_COOKIE, value);
    }
    headers
}
