//! Failed-login throttle
//!
//! After `MAX_FAILED_ATTEMPTS` failures for one username inside the window,
//! further logins for that username are refused until the oldest failure
//! ages out. Usernames are compared case-insensitively.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const MAX_FAILED_ATTEMPTS: usize = 5;
pub const WINDOW_MINUTES: i64 = 15;

/// In-memory, per-process record of failed logins
#[derive(Clone, Default)]
pub struct LoginRateLimiter {
    attempts: Arc<RwLock<HashMap<String, Vec<DateTime<Utc>>>>>,
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the username has used up its failed attempts.
    pub async fn is_limited(&self, username: &str) -> bool {
        let cutoff = Utc::now() - Duration::minutes(WINDOW_MINUTES);
        let mut attempts = self.attempts.write().await;

        match attempts.get_mut(&username.to_lowercase()) {
            Some(times) => {
                times.retain(|time| *time > cutoff);
                times.len() >= MAX_FAILED_ATTEMPTS
            }
            None => false,
        }
    }

    pub async fn record_failure(&self, username: &str) {
        self.attempts
            .write()
            .await
            .entry(username.to_lowercase())
            .or_default()
            .push(Utc::now());
    }

    /// Forget the failures of a username after a successful login.
    pub async fn clear(&self, username: &str) {
        self.attempts.write().await.remove(&username.to_lowercase());
    }

    /// Drop entries whose failures have all aged out.
    pub async fn cleanup(&self) {
        let cutoff = Utc::now() - Duration::minutes(WINDOW_MINUTES);
        self.attempts.write().await.retain(|_, times| {
            times.retain(|time| *time > cutoff);
            !times.is_empty()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limit_after_max_failures() {
        let limiter = LoginRateLimiter::new();

        for _ in 0..MAX_FAILED_ATTEMPTS - 1 {
            limiter.record_failure("alice").await;
            assert!(!limiter.is_limited("alice").await);
        }
        limiter.record_failure("alice").await;
        assert!(limiter.is_limited("alice").await);
        assert!(!limiter.is_limited("bob").await);

        limiter.clear("alice").await;
        assert!(!limiter.is_limited("alice").await);
    }

    #[tokio::test]
    async fn test_case_insensitive_username() {
        let limiter = LoginRateLimiter::new();
        for name in ["Alice", "ALICE", "alice", "aLiCe", "alicE"] {
            limiter.record_failure(name).await;
        }
        assert!(limiter.is_limited("alice").await);
    }

    #[tokio::test]
    async fn test_old_failures_expire() {
        let limiter = LoginRateLimiter::new();
        let old = Utc::now() - Duration::minutes(WINDOW_MINUTES + 1);
        limiter
            .attempts
            .write()
            .await
            .insert("alice".into(), vec![old; MAX_FAILED_ATTEMPTS]);

        assert!(!limiter.is_limited("alice").await);
        limiter.cleanup().await;
        assert!(limiter.attempts.read().await.is_empty());
    }
}
