//! Order Repository
//!
//! Placement writes go through the transaction-scoped functions; everything
//! after placement treats orders as read-mostly rows plus a status column.

use sqlx::{SqliteConnection, SqlitePool};

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderItem, OrderStatus};

const ORDER_SELECT: &str = "SELECT id, order_number, user_id, restaurant_id, status, subtotal, delivery_fee, service_charge, tax_amount, total_amount, delivery_address, delivery_instructions, estimated_delivery_time, actual_delivery_time, placed_at, created_at, updated_at FROM orders";

const ITEM_SELECT: &str = "SELECT id, order_id, dish_id, dish_name, quantity, price_at_order, subtotal, special_instructions FROM order_item";

/// Explicit filter options for order listing (no dynamic maps)
#[derive(Debug, Clone, Default)]
pub struct OrderListFilter {
    pub status: Option<OrderStatus>,
    /// Unix millis, inclusive lower bound on placed_at
    pub placed_after: Option<i64>,
    /// Unix millis, inclusive upper bound on placed_at
    pub placed_before: Option<i64>,
    pub sort: OrderSort,
    pub descending: bool,
}

/// Enumerated sort keys for order listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSort {
    #[default]
    PlacedAt,
    TotalAmount,
    OrderNumber,
}

impl OrderSort {
    fn column(self) -> &'static str {
        match self {
            OrderSort::PlacedAt => "placed_at",
            OrderSort::TotalAmount => "total_amount",
            OrderSort::OrderNumber => "order_number",
        }
    }
}

impl OrderListFilter {
    /// Most-recent-first is the default listing order
    pub fn newest_first() -> Self {
        Self {
            descending: true,
            ..Self::default()
        }
    }

    fn where_clause(&self, scope_column: &str) -> String {
        let mut clauses = vec![format!("{scope_column} = ?1")];
        if self.status.is_some() {
            clauses.push("status = ?2".into());
        }
        if self.placed_after.is_some() {
            clauses.push("placed_at >= ?3".into());
        }
        if self.placed_before.is_some() {
            clauses.push("placed_at <= ?4".into());
        }
        clauses.join(" AND ")
    }

    fn order_clause(&self) -> String {
        format!(
            "ORDER BY {} {}",
            self.sort.column(),
            if self.descending { "DESC" } else { "ASC" }
        )
    }
}

// Positional binds: ?1 scope id, ?2 status, ?3 after, ?4 before. Unused
// placeholders are still bound so indices stay stable.
fn bind_filter<'q, O>(
    query: sqlx::query::QueryAs<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>>,
    scope_id: i64,
    filter: &OrderListFilter,
) -> sqlx::query::QueryAs<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>> {
    query
        .bind(scope_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.placed_after)
        .bind(filter.placed_before)
}

fn bind_filter_scalar<'q, O>(
    query: sqlx::query::QueryScalar<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>>,
    scope_id: i64,
    filter: &OrderListFilter,
) -> sqlx::query::QueryScalar<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>> {
    query
        .bind(scope_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.placed_after)
        .bind(filter.placed_before)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_items(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let sql = format!("{ITEM_SELECT} WHERE order_id = ? ORDER BY id");
    let rows = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Greatest existing order number with the given prefix (e.g. "ORD-2026-"),
/// read inside the placement transaction
pub async fn max_order_number_tx(
    conn: &mut SqliteConnection,
    prefix: &str,
) -> RepoResult<Option<String>> {
    let pattern = format!("{prefix}%");
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT order_number FROM orders WHERE order_number LIKE ? ORDER BY order_number DESC LIMIT 1",
    )
    .bind(pattern)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(|(n,)| n))
}

/// Insert the order row inside the placement transaction
pub async fn insert_order_tx(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, order_number, user_id, restaurant_id, status, subtotal, delivery_fee, service_charge, tax_amount, total_amount, delivery_address, delivery_instructions, placed_at, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
    )
    .bind(order.id)
    .bind(&order.order_number)
    .bind(order.user_id)
    .bind(order.restaurant_id)
    .bind(order.status.as_str())
    .bind(order.subtotal)
    .bind(order.delivery_fee)
    .bind(order.service_charge)
    .bind(order.tax_amount)
    .bind(order.total_amount)
    .bind(&order.delivery_address)
    .bind(&order.delivery_instructions)
    .bind(order.placed_at)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Insert one line item inside the placement transaction
pub async fn insert_item_tx(conn: &mut SqliteConnection, item: &OrderItem) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO order_item (id, order_id, dish_id, dish_name, quantity, price_at_order, subtotal, special_instructions) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(item.id)
    .bind(item.order_id)
    .bind(item.dish_id)
    .bind(&item.dish_name)
    .bind(item.quantity)
    .bind(item.price_at_order)
    .bind(item.subtotal)
    .bind(&item.special_instructions)
    .execute(conn)
    .await?;
    Ok(())
}

/// Paginated listing scoped to one user
pub async fn list_by_user(
    pool: &SqlitePool,
    user_id: i64,
    filter: &OrderListFilter,
    limit: i64,
    offset: i64,
) -> RepoResult<(Vec<Order>, i64)> {
    list_scoped(pool, "user_id", user_id, filter, limit, offset).await
}

/// Paginated listing scoped to one restaurant
pub async fn list_by_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
    filter: &OrderListFilter,
    limit: i64,
    offset: i64,
) -> RepoResult<(Vec<Order>, i64)> {
    list_scoped(pool, "restaurant_id", restaurant_id, filter, limit, offset).await
}

async fn list_scoped(
    pool: &SqlitePool,
    scope_column: &str,
    scope_id: i64,
    filter: &OrderListFilter,
    limit: i64,
    offset: i64,
) -> RepoResult<(Vec<Order>, i64)> {
    let where_clause = filter.where_clause(scope_column);

    let sql = format!(
        "{ORDER_SELECT} WHERE {where_clause} {} LIMIT ?5 OFFSET ?6",
        filter.order_clause()
    );
    let query = sqlx::query_as::<_, Order>(&sql);
    let rows = bind_filter(query, scope_id, filter)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM orders WHERE {where_clause}");
    let count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let total = bind_filter_scalar(count_query, scope_id, filter)
        .fetch_one(pool)
        .await?;

    Ok((rows, total))
}

/// Persist a status transition; delivery timestamps are set verbatim
pub async fn update_status(
    pool: &SqlitePool,
    id: i64,
    status: OrderStatus,
    estimated_delivery_time: Option<i64>,
    actual_delivery_time: Option<i64>,
) -> RepoResult<Order> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET status = ?1, estimated_delivery_time = ?2, actual_delivery_time = ?3, updated_at = ?4 WHERE id = ?5",
    )
    .bind(status.as_str())
    .bind(estimated_delivery_time)
    .bind(actual_delivery_time)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}

/// Row counts used by placement tests to assert zero partial writes
pub async fn count_orders_and_items(pool: &SqlitePool) -> RepoResult<(i64, i64)> {
    let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await?;
    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_item")
        .fetch_one(pool)
        .await?;
    Ok((orders, items))
}
