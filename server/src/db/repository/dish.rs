//! Dish Repository

use sqlx::{SqliteConnection, SqlitePool};

use super::{RepoError, RepoResult};
use shared::models::{Dish, DishCreate, DishUpdate};

const DISH_SELECT: &str = "SELECT id, restaurant_id, category_id, name, description, price, image_uri, is_available, average_rating, rating_count, created_at, updated_at FROM dish";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Dish>> {
    let sql = format!("{DISH_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Dish>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_restaurant(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<Dish>> {
    let sql = format!("{DISH_SELECT} WHERE restaurant_id = ? ORDER BY name");
    let rows = sqlx::query_as::<_, Dish>(&sql)
        .bind(restaurant_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Dishes with at least one rating, as (average_rating, rating_count) pairs.
/// Input to the restaurant rating aggregation.
pub async fn rated_by_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
) -> RepoResult<Vec<(f64, i64)>> {
    let rows: Vec<(f64, i64)> = sqlx::query_as(
        "SELECT average_rating, rating_count FROM dish WHERE restaurant_id = ? AND rating_count > 0",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Transaction-scoped batch load for order placement: the requested ids
/// filtered by restaurant membership, in one query. A shorter result than
/// the requested distinct-id count means unknown or cross-restaurant ids.
pub async fn find_for_order_tx(
    conn: &mut SqliteConnection,
    restaurant_id: i64,
    dish_ids: &[i64],
) -> RepoResult<Vec<Dish>> {
    if dish_ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; dish_ids.len()].join(", ");
    let sql = format!(
        "{DISH_SELECT} WHERE restaurant_id = ? AND id IN ({placeholders})"
    );
    let mut query = sqlx::query_as::<_, Dish>(&sql).bind(restaurant_id);
    for id in dish_ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(conn).await?;
    Ok(rows)
}

pub async fn create(pool: &SqlitePool, data: DishCreate) -> RepoResult<Dish> {
    if data.price < 0.0 || !data.price.is_finite() {
        return Err(RepoError::Validation("price must be non-negative".into()));
    }

    // Category must belong to the same restaurant
    let category = super::menu_category::find_by_id(pool, data.category_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {} not found", data.category_id)))?;
    if category.restaurant_id != data.restaurant_id {
        return Err(RepoError::Validation(format!(
            "Category {} does not belong to restaurant {}",
            data.category_id, data.restaurant_id
        )));
    }

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO dish (id, restaurant_id, category_id, name, description, price, image_uri, is_available, average_rating, rating_count, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, 0, 0, ?8, ?8)",
    )
    .bind(id)
    .bind(data.restaurant_id)
    .bind(data.category_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(&data.image_uri)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create dish".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: DishUpdate) -> RepoResult<Dish> {
    if let Some(price) = data.price
        && (price < 0.0 || !price.is_finite())
    {
        return Err(RepoError::Validation("price must be non-negative".into()));
    }

    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Dish {id} not found")))?;

    // Re-check the category/restaurant invariant when the category moves
    if let Some(category_id) = data.category_id {
        let category = super::menu_category::find_by_id(pool, category_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Category {category_id} not found")))?;
        if category.restaurant_id != existing.restaurant_id {
            return Err(RepoError::Validation(format!(
                "Category {} does not belong to restaurant {}",
                category_id, existing.restaurant_id
            )));
        }
    }

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE dish SET category_id = COALESCE(?1, category_id), name = COALESCE(?2, name), description = COALESCE(?3, description), price = COALESCE(?4, price), image_uri = COALESCE(?5, image_uri), is_available = COALESCE(?6, is_available), updated_at = ?7 WHERE id = ?8",
    )
    .bind(data.category_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(&data.image_uri)
    .bind(data.is_available)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Dish {id} not found")))
}

pub async fn set_available(pool: &SqlitePool, id: i64, is_available: bool) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE dish SET is_available = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(is_available)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Dish {id} not found")));
    }
    Ok(())
}

/// Test/seed helper for the rating aggregator's derived fields
pub async fn set_rating(
    pool: &SqlitePool,
    id: i64,
    average_rating: f64,
    rating_count: i64,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE dish SET average_rating = ?1, rating_count = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(average_rating)
    .bind(rating_count)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}
