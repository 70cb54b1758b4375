//! Restaurant Repository

use sqlx::{SqliteConnection, SqlitePool};

use super::{RepoError, RepoResult};
use shared::models::{Restaurant, RestaurantCreate, RestaurantSummary};

const RESTAURANT_SELECT: &str = "SELECT id, name, description, cuisine_type, address, phone_number, minimum_order, delivery_fee, service_charge_rate, tax_rate, is_active, average_rating, rating_count, created_at, updated_at FROM restaurant";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Restaurant>> {
    let sql = format!("{RESTAURANT_SELECT} ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Restaurant>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Restaurant>> {
    let sql = format!("{RESTAURANT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Restaurant>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Transaction-scoped read used by the order placement engine so the
/// commerce configuration can't change under the running transaction
pub async fn find_by_id_tx(
    conn: &mut SqliteConnection,
    id: i64,
) -> RepoResult<Option<Restaurant>> {
    let sql = format!("{RESTAURANT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Restaurant>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

pub async fn find_summary(pool: &SqlitePool, id: i64) -> RepoResult<Option<RestaurantSummary>> {
    let row = sqlx::query_as::<_, RestaurantSummary>(
        "SELECT id, name, address, phone_number FROM restaurant WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Ids of every restaurant, for batch jobs
pub async fn all_ids(pool: &SqlitePool) -> RepoResult<Vec<i64>> {
    let rows: Vec<(i64,)> = sqlx::query_as("SELECT id FROM restaurant")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

pub async fn create(pool: &SqlitePool, data: RestaurantCreate) -> RepoResult<Restaurant> {
    if !(0.0..=1.0).contains(&data.service_charge_rate) {
        return Err(RepoError::Validation(
            "service_charge_rate must be between 0 and 1".into(),
        ));
    }
    if !(0.0..=1.0).contains(&data.tax_rate) {
        return Err(RepoError::Validation(
            "tax_rate must be between 0 and 1".into(),
        ));
    }

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO restaurant (id, name, description, cuisine_type, address, phone_number, minimum_order, delivery_fee, service_charge_rate, tax_rate, is_active, average_rating, rating_count, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1, 0, 0, ?11, ?11)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.cuisine_type)
    .bind(&data.address)
    .bind(&data.phone_number)
    .bind(data.minimum_order)
    .bind(data.delivery_fee)
    .bind(data.service_charge_rate)
    .bind(data.tax_rate)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create restaurant".into()))
}

pub async fn set_active(pool: &SqlitePool, id: i64, is_active: bool) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE restaurant SET is_active = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(is_active)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Restaurant {id} not found")));
    }
    Ok(())
}

/// Aggregator-owned write: derived rating fields only
pub async fn update_rating(
    pool: &SqlitePool,
    id: i64,
    average_rating: f64,
    rating_count: i64,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE restaurant SET average_rating = ?1, rating_count = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(average_rating)
    .bind(rating_count)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Restaurant {id} not found")));
    }
    Ok(())
}
