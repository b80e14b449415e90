//! Invitation code model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Single-use code required to register an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationCode {
    pub id: i64,
    /// URL-safe random token
    pub code: String,
    /// Set once the code has been redeemed
    pub used: bool,
    /// Code cannot be redeemed after this instant
    pub expiration_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
