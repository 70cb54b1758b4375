//! Refresh Token Model

use serde::{Deserialize, Serialize};

/// Refresh token entity
///
/// Only the bcrypt hash of the bearer secret is persisted; the plaintext is
/// returned to the client exactly once at issuance. `is_revoked` is one-way:
/// once set it never transitions back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RefreshToken {
    pub id: i64,
    /// bcrypt hash of the refresh token plaintext
    pub token_hash: String,
    pub user_id: i64,
    /// Unix millis
    pub expires_at: i64,
    pub device_info: Option<String>,
    pub is_revoked: bool,
    pub revoked_at: Option<i64>,
    pub last_used_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl RefreshToken {
    /// Token is past its expiry instant
    pub fn is_expired(&self, now_millis: i64) -> bool {
        now_millis > self.expires_at
    }
}

/// Create refresh token payload (hash computed by the token ledger)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenCreate {
    pub token_hash: String,
    pub user_id: i64,
    pub expires_at: i64,
    pub device_info: Option<String>,
}
