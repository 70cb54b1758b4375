//! Entity Models
//!
//! Plain data structs shared across the workspace. Conventions:
//! - ids are snowflake i64s (`util::snowflake_id`)
//! - timestamps are Unix millis (i64)
//! - monetary amounts are f64, already rounded to 2 decimal places at the
//!   point of storage; all arithmetic happens in `Decimal` on the server side

pub mod dish;
pub mod menu_category;
pub mod order;
pub mod refresh_token;
pub mod restaurant;
pub mod user;

pub use dish::{Dish, DishCreate, DishUpdate};
pub use menu_category::{MenuCategory, MenuCategoryCreate};
pub use order::{Order, OrderDetail, OrderItem, OrderStatus};
pub use refresh_token::{RefreshToken, RefreshTokenCreate};
pub use restaurant::{Restaurant, RestaurantCreate, RestaurantSummary};
pub use user::{User, UserCreate, UserPublic};
