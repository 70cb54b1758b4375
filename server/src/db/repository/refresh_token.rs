//! Refresh Token Repository
//!
//! Storage for the token ledger. The "find all non-expired, newest first"
//! query deliberately includes revoked rows: reuse of a revoked token is the
//! theft signal the rotation protocol looks for.

use sqlx::SqlitePool;

use super::RepoResult;
use shared::models::{RefreshToken, RefreshTokenCreate};

const TOKEN_SELECT: &str = "SELECT id, token_hash, user_id, expires_at, device_info, is_revoked, revoked_at, last_used_at, created_at, updated_at FROM refresh_token";

pub async fn create(pool: &SqlitePool, data: RefreshTokenCreate) -> RepoResult<RefreshToken> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO refresh_token (id, token_hash, user_id, expires_at, device_info, is_revoked, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)",
    )
    .bind(id)
    .bind(&data.token_hash)
    .bind(data.user_id)
    .bind(data.expires_at)
    .bind(&data.device_info)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| super::RepoError::Database("Failed to create refresh token".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<RefreshToken>> {
    let sql = format!("{TOKEN_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, RefreshToken>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// All tokens for a user with `expires_at > now`, newest first.
///
/// Includes revoked tokens on purpose; the ordering matters because the
/// ledger's verify loop early-exits on the first hash match.
pub async fn find_live_by_user(
    pool: &SqlitePool,
    user_id: i64,
    now: i64,
) -> RepoResult<Vec<RefreshToken>> {
    let sql = format!(
        "{TOKEN_SELECT} WHERE user_id = ?1 AND expires_at > ?2 ORDER BY created_at DESC"
    );
    let rows = sqlx::query_as::<_, RefreshToken>(&sql)
        .bind(user_id)
        .bind(now)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Mark a single token revoked; `is_revoked` is one-way
pub async fn revoke(pool: &SqlitePool, id: i64, now: i64) -> RepoResult<()> {
    sqlx::query(
        "UPDATE refresh_token SET is_revoked = 1, revoked_at = ?1, updated_at = ?1 WHERE id = ?2",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Stamp last_used_at and revoke in one write (rotation path)
pub async fn mark_rotated(pool: &SqlitePool, id: i64, now: i64) -> RepoResult<()> {
    sqlx::query(
        "UPDATE refresh_token SET last_used_at = ?1, is_revoked = 1, revoked_at = ?1, updated_at = ?1 WHERE id = ?2",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Bulk-revoke every active token for a user; returns the number affected
pub async fn revoke_all_for_user(pool: &SqlitePool, user_id: i64, now: i64) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE refresh_token SET is_revoked = 1, revoked_at = ?1, updated_at = ?1 WHERE user_id = ?2 AND is_revoked = 0",
    )
    .bind(now)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}
