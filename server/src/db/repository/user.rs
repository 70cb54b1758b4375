//! User Repository

use sqlx::SqlitePool;

use super::RepoResult;
use shared::models::{User, UserCreate};

const USER_SELECT: &str = "SELECT id, email, name, password_hash, google_id, phone_number, address, is_active, created_at, updated_at FROM user";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Lookup by email; callers must normalize (lowercase, trimmed) first
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE email = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_google_id(pool: &SqlitePool, google_id: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE google_id = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(google_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: UserCreate) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO user (id, email, name, password_hash, google_id, phone_number, address, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)",
    )
    .bind(id)
    .bind(&data.email)
    .bind(&data.name)
    .bind(&data.password_hash)
    .bind(&data.google_id)
    .bind(&data.phone_number)
    .bind(&data.address)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| super::RepoError::Database("Failed to create user".into()))
}

/// Link a Google identity to an existing email/password account
pub async fn set_google_id(pool: &SqlitePool, id: i64, google_id: &str) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE user SET google_id = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(google_id)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(super::RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| super::RepoError::NotFound(format!("User {id} not found")))
}
