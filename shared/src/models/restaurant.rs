//! Restaurant Model

use serde::{Deserialize, Serialize};

/// Restaurant entity (餐厅)
///
/// Carries the commerce configuration used by the order placement engine.
/// `average_rating`/`rating_count` are derived fields, written only by the
/// rating aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub cuisine_type: Option<String>,
    pub address: String,
    pub phone_number: Option<String>,
    /// Minimum order subtotal, 2 dp
    pub minimum_order: f64,
    /// Flat delivery fee, 2 dp
    pub delivery_fee: f64,
    /// 0..=1, up to 8 dp
    pub service_charge_rate: f64,
    /// 0..=1, up to 8 dp
    pub tax_rate: f64,
    pub is_active: bool,
    /// Derived, 8 dp, aggregator-owned
    pub average_rating: f64,
    /// Derived, aggregator-owned
    pub rating_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create restaurant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantCreate {
    pub name: String,
    pub description: Option<String>,
    pub cuisine_type: Option<String>,
    pub address: String,
    pub phone_number: Option<String>,
    pub minimum_order: f64,
    pub delivery_fee: f64,
    pub service_charge_rate: f64,
    pub tax_rate: f64,
}

/// Compact restaurant shape embedded in order responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RestaurantSummary {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone_number: Option<String>,
}
