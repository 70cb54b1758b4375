//! Order placement engine
//!
//! The whole placement runs inside one SQLite transaction: restaurant and
//! dish reads, totals, order number allocation and both inserts either all
//! commit or leave no trace. A duplicate order number aborts the attempt and
//! the transaction is retried from scratch.

use sqlx::SqlitePool;
use tracing::{info, warn};

use super::{money, order_number};
use crate::db::repository::{self, RepoError};
use crate::utils::{AppError, AppResult};
use shared::models::{Order, OrderItem, OrderStatus};

/// Retry budget for order number collisions between concurrent placements
const MAX_PLACEMENT_ATTEMPTS: u32 = 3;

/// Placement input, already past DTO validation
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub restaurant_id: i64,
    pub items: Vec<PlaceOrderLine>,
    pub delivery_address: String,
    pub delivery_instructions: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlaceOrderLine {
    pub dish_id: i64,
    pub quantity: i64,
    pub special_instructions: Option<String>,
}

/// Place an order atomically
///
/// Validation failures and business rule rejections happen before any write,
/// so a failed placement leaves zero rows behind.
pub async fn place_order(
    pool: &SqlitePool,
    user_id: i64,
    input: PlaceOrder,
) -> AppResult<(Order, Vec<OrderItem>)> {
    validate_input(&input)?;

    let mut attempt = 1;
    loop {
        match try_place(pool, user_id, &input).await {
            Ok(result) => {
                info!(
                    user_id,
                    order_id = result.0.id,
                    order_number = %result.0.order_number,
                    total = result.0.total_amount,
                    "Order placed"
                );
                return Ok(result);
            }
            Err(AppError::Conflict(msg)) if attempt < MAX_PLACEMENT_ATTEMPTS => {
                warn!(user_id, attempt, %msg, "Order number collision, retrying placement");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn validate_input(input: &PlaceOrder) -> AppResult<()> {
    if input.items.is_empty() {
        return Err(AppError::validation("Order must contain at least one item"));
    }
    if input.delivery_address.trim().is_empty() {
        return Err(AppError::validation("Delivery address is required"));
    }
    for line in &input.items {
        money::validate_quantity(line.quantity)?;
    }
    Ok(())
}

/// One placement attempt, fully inside a transaction
async fn try_place(
    pool: &SqlitePool,
    user_id: i64,
    input: &PlaceOrder,
) -> AppResult<(Order, Vec<OrderItem>)> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    // Restaurant must exist and be accepting orders; reading it inside the
    // transaction pins the commerce config used for the totals
    let restaurant = repository::restaurant::find_by_id_tx(&mut *tx, input.restaurant_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Restaurant {}", input.restaurant_id)))?;
    if !restaurant.is_active {
        return Err(AppError::business_rule(format!(
            "Restaurant {} is not accepting orders",
            restaurant.name
        )));
    }

    // Every requested dish must belong to this restaurant and be available
    let mut requested_ids: Vec<i64> = input.items.iter().map(|l| l.dish_id).collect();
    requested_ids.sort_unstable();
    requested_ids.dedup();

    let dishes =
        repository::dish::find_for_order_tx(&mut *tx, input.restaurant_id, &requested_ids).await?;
    // Invalid items are a rejected request, not a missing resource: 400
    if dishes.len() != requested_ids.len() {
        let missing: Vec<String> = requested_ids
            .iter()
            .filter(|id| !dishes.iter().any(|d| d.id == **id))
            .map(|id| id.to_string())
            .collect();
        return Err(AppError::business_rule(format!(
            "Dish(es) {} not found or do not belong to restaurant {}",
            missing.join(", "),
            input.restaurant_id
        )));
    }
    let unavailable: Vec<&str> = dishes
        .iter()
        .filter(|d| !d.is_available)
        .map(|d| d.name.as_str())
        .collect();
    if !unavailable.is_empty() {
        return Err(AppError::business_rule(format!(
            "Dish(es) currently unavailable: {}",
            unavailable.join(", ")
        )));
    }

    let mut lines: Vec<(&PlaceOrderLine, &shared::models::Dish)> = Vec::new();
    for line in &input.items {
        // Present by the length check above
        let dish = dishes
            .iter()
            .find(|d| d.id == line.dish_id)
            .ok_or_else(|| AppError::internal("Dish lookup inconsistency"))?;
        money::validate_price(dish.price, "dish price")?;
        lines.push((line, dish));
    }

    let price_lines: Vec<(f64, i64)> = lines
        .iter()
        .map(|(line, dish)| (dish.price, line.quantity))
        .collect();
    let totals = money::compute_totals(
        &price_lines,
        restaurant.delivery_fee,
        restaurant.service_charge_rate,
        restaurant.tax_rate,
    );

    if money::to_decimal(totals.subtotal) < money::to_decimal(restaurant.minimum_order) {
        return Err(AppError::business_rule(format!(
            "Order subtotal {:.2} is below the minimum of {:.2}",
            totals.subtotal, restaurant.minimum_order
        )));
    }

    // Allocate the next order number from the in-transaction maximum
    let year = order_number::current_year();
    let current_max =
        repository::order::max_order_number_tx(&mut *tx, &order_number::year_prefix(year)).await?;
    let number = order_number::next_number(year, current_max.as_deref());

    let now = shared::util::now_millis();
    let order = Order {
        id: shared::util::snowflake_id(),
        order_number: number,
        user_id,
        restaurant_id: restaurant.id,
        status: OrderStatus::Pending,
        subtotal: totals.subtotal,
        delivery_fee: totals.delivery_fee,
        service_charge: totals.service_charge,
        tax_amount: totals.tax_amount,
        total_amount: totals.total_amount,
        delivery_address: input.delivery_address.trim().to_string(),
        delivery_instructions: input.delivery_instructions.clone(),
        estimated_delivery_time: None,
        actual_delivery_time: None,
        placed_at: now,
        created_at: now,
        updated_at: now,
    };

    let items: Vec<OrderItem> = lines
        .iter()
        .map(|(line, dish)| OrderItem {
            id: shared::util::snowflake_id(),
            order_id: order.id,
            dish_id: dish.id,
            dish_name: dish.name.clone(),
            quantity: line.quantity,
            price_at_order: dish.price,
            subtotal: money::line_subtotal(dish.price, line.quantity),
            special_instructions: line.special_instructions.clone(),
        })
        .collect();

    match repository::order::insert_order_tx(&mut *tx, &order).await {
        Ok(()) => {}
        Err(RepoError::Duplicate(_)) => {
            // Another placement committed this number first; the caller
            // retries with a fresh transaction
            return Err(AppError::conflict(format!(
                "Order number {} already taken",
                order.order_number
            )));
        }
        Err(e) => return Err(e.into()),
    }
    for item in &items {
        repository::order::insert_item_tx(&mut *tx, item).await?;
    }

    tx.commit()
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    Ok((order, items))
}
