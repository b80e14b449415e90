//! Invitation code service
//!
//! Registration is closed: every account needs a single-use invitation
//! code. Codes are 16 random bytes from the OS generator, encoded as
//! unpadded URL-safe base64 (22 characters).

use crate::db::repositories::{is_unique_violation, InviteRepository};
use crate::models::InvitationCode;
use anyhow::Context;
use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{Duration, Utc};
use data_encoding::BASE64URL_NOPAD;
use std::sync::Arc;

/// Default validity of a new code in days
pub const DEFAULT_INVITE_VALID_DAYS: i64 = 365;

/// Most codes generated by one request
pub const MAX_CODES_PER_BATCH: usize = 100;

const CODE_BYTES: usize = 16;

/// Error types for invitation code operations
#[derive(Debug, thiserror::Error)]
pub enum InviteServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Generate a fresh random code.
pub fn generate_invite_code() -> String {
    let mut bytes = [0u8; CODE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    BASE64URL_NOPAD.encode(&bytes)
}

/// Service for creating and listing invitation codes
pub struct InviteService {
    invite_repo: Arc<dyn InviteRepository>,
    valid_days: i64,
}

impl InviteService {
    pub fn new(invite_repo: Arc<dyn InviteRepository>) -> Self {
        Self {
            invite_repo,
            valid_days: DEFAULT_INVITE_VALID_DAYS,
        }
    }

    /// Set how many days new codes stay valid
    pub fn with_valid_days(mut self, days: i64) -> Self {
        self.valid_days = days;
        self
    }

    /// Create `count` new unused codes.
    pub async fn generate(&self, count: usize) -> Result<Vec<InvitationCode>, InviteServiceError> {
        if count == 0 || count > MAX_CODES_PER_BATCH {
            return Err(InviteServiceError::ValidationError(format!(
                "Count must be between 1 and {}",
                MAX_CODES_PER_BATCH
            )));
        }

        let expiration = Utc::now() + Duration::days(self.valid_days);
        let mut codes = Vec::with_capacity(count);

        while codes.len() < count {
            let code = generate_invite_code();
            match self.invite_repo.create(&code, expiration).await {
                Ok(created) => codes.push(created),
                // 128 random bits; a collision only costs a retry
                Err(e) if is_unique_violation(&e) => continue,
                Err(e) => return Err(e.context("Failed to store invitation code").into()),
            }
        }

        tracing::info!("Generated {} invitation code(s)", codes.len());
        Ok(codes)
    }

    /// All codes, newest first
    pub async fn list(&self) -> Result<Vec<InvitationCode>, InviteServiceError> {
        Ok(self
            .invite_repo
            .list()
            .await
            .context("Failed to list invitation codes")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxInviteRepository;
    use crate::db::{create_test_pool, migrations};
    use std::collections::HashSet;

    async fn setup_test_service() -> InviteService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        InviteService::new(SqlxInviteRepository::boxed(pool))
    }

    #[test]
    fn test_code_format() {
        let code = generate_invite_code();
        assert_eq!(code.len(), 22);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(BASE64URL_NOPAD.decode(code.as_bytes()).unwrap().len(), CODE_BYTES);
    }

    #[test]
    fn test_codes_are_random() {
        let codes: HashSet<String> = (0..50).map(|_| generate_invite_code()).collect();
        assert_eq!(codes.len(), 50);
    }

    #[tokio::test]
    async fn test_generate_batch() {
        let service = setup_test_service().await;
        let codes = service.generate(3).await.unwrap();

        assert_eq!(codes.len(), 3);
        for code in &codes {
            assert!(!code.used);
            let days = (code.expiration_date - Utc::now()).num_days();
            assert!((364..=365).contains(&days));
        }
        assert_eq!(service.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_generate_rejects_bad_count() {
        let service = setup_test_service().await;
        assert!(matches!(
            service.generate(0).await,
            Err(InviteServiceError::ValidationError(_))
        ));
        assert!(matches!(
            service.generate(MAX_CODES_PER_BATCH + 1).await,
            Err(InviteServiceError::ValidationError(_))
        ));
    }
}
