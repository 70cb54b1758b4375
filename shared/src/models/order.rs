//! Order Models

use serde::{Deserialize, Serialize};

use super::RestaurantSummary;

/// Order lifecycle status
///
/// The legal transition table lives in the server's status state machine;
/// this type is just the wire/storage representation (snake_case strings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "out_for_delivery" => Ok(OrderStatus::OutForDelivery),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Order entity (订单) — one placement event
///
/// Invariant: `total_amount` equals the sum of the four monetary components
/// at stored (2 dp) precision, and `subtotal >= restaurant.minimum_order`
/// held at placement time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// `ORD-<year>-<6-digit sequence>`, unique, sequence scoped per year
    pub order_number: String,
    pub user_id: i64,
    pub restaurant_id: i64,
    pub status: OrderStatus,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub service_charge: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub delivery_address: String,
    pub delivery_instructions: Option<String>,
    /// Unix millis, set verbatim on status transition
    pub estimated_delivery_time: Option<i64>,
    pub actual_delivery_time: Option<i64>,
    pub placed_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line item — immutable price snapshot taken at placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub dish_id: i64,
    /// Denormalized for display; survives later dish edits
    pub dish_name: String,
    pub quantity: i64,
    /// Dish price at placement time, independent of the live price
    pub price_at_order: f64,
    /// quantity × price_at_order, 2 dp
    pub subtotal: f64,
    pub special_instructions: Option<String>,
}

/// Order with line items and a restaurant summary (API response shape)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub restaurant: RestaurantSummary,
}
