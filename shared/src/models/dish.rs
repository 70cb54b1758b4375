//! Dish Model

use serde::{Deserialize, Serialize};

/// Dish entity (菜品) — a purchasable item on a restaurant's menu
///
/// Invariant: `category_id` must belong to `restaurant_id` (checked by the
/// repository on create/update). `average_rating`/`rating_count` feed the
/// restaurant-level aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Dish {
    pub id: i64,
    pub restaurant_id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// 2 dp, non-negative
    pub price: f64,
    pub image_uri: Option<String>,
    pub is_available: bool,
    /// Up to 8 dp
    pub average_rating: f64,
    pub rating_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create dish payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishCreate {
    pub restaurant_id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_uri: Option<String>,
}

/// Update dish payload (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DishUpdate {
    pub category_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image_uri: Option<String>,
    pub is_available: Option<bool>,
}
