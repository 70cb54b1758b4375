//! User Model

use serde::{Deserialize, Serialize};

/// User entity (用户)
///
/// Credential material is password hash, Google identity, or both; the auth
/// service guarantees at least one is present at creation. `is_active` gates
/// every authentication path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    /// bcrypt hash; None for Google-only accounts
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create user payload (hashing already done by the caller)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub name: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

/// User shape safe to return to clients (no credential material)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
}

impl From<User> for UserPublic {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            phone_number: u.phone_number,
            address: u.address,
            is_active: u.is_active,
            created_at: u.created_at,
        }
    }
}
