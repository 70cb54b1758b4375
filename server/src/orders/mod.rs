//! 订单域逻辑
//!
//! - [`money`] - Decimal 金额计算
//! - [`order_number`] - 订单号分配
//! - [`status`] - 状态机
//! - [`placement`] - 下单事务

pub mod money;
pub mod order_number;
pub mod placement;
pub mod status;

pub use placement::{PlaceOrder, PlaceOrderLine, place_order};

use sqlx::SqlitePool;

use crate::db::repository;
use crate::utils::{AppError, AppResult};
use shared::models::{Order, OrderDetail};

/// Assemble the API response shape for one order
pub async fn load_detail(pool: &SqlitePool, order: Order) -> AppResult<OrderDetail> {
    let items = repository::order::find_items(pool, order.id).await?;
    let restaurant = repository::restaurant::find_summary(pool, order.restaurant_id)
        .await?
        .ok_or_else(|| AppError::internal(format!("Restaurant {} missing", order.restaurant_id)))?;
    Ok(OrderDetail {
        order,
        items,
        restaurant,
    })
}
