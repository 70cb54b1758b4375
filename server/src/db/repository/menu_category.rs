//! Menu Category Repository

use sqlx::SqlitePool;

use super::{RepoError, RepoResult};
use shared::models::{MenuCategory, MenuCategoryCreate};

const CATEGORY_SELECT: &str = "SELECT id, restaurant_id, name, description, display_order, is_active, created_at, updated_at FROM menu_category";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MenuCategory>> {
    let sql = format!("{CATEGORY_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, MenuCategory>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
) -> RepoResult<Vec<MenuCategory>> {
    let sql = format!(
        "{CATEGORY_SELECT} WHERE restaurant_id = ? AND is_active = 1 ORDER BY display_order, name"
    );
    let rows = sqlx::query_as::<_, MenuCategory>(&sql)
        .bind(restaurant_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn create(pool: &SqlitePool, data: MenuCategoryCreate) -> RepoResult<MenuCategory> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO menu_category (id, restaurant_id, name, description, display_order, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
    )
    .bind(id)
    .bind(data.restaurant_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.display_order)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create menu category".into()))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE menu_category SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}
