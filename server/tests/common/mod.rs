//! Shared fixtures for integration tests

#![allow(dead_code)]

use delivery_server::db::DbService;
use delivery_server::db::repository;
use shared::models::{
    Dish, DishCreate, MenuCategory, MenuCategoryCreate, Restaurant, RestaurantCreate, User,
    UserCreate,
};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Fresh migrated SQLite database backed by a temp directory
///
/// The directory must outlive the pool, hence the struct.
pub struct TestDb {
    pub pool: SqlitePool,
    _dir: TempDir,
}

pub async fn test_db() -> TestDb {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("test.db");
    let db = DbService::new(path.to_str().expect("Non-UTF8 temp path"))
        .await
        .expect("Failed to initialize test database");
    TestDb {
        pool: db.pool,
        _dir: dir,
    }
}

pub async fn seed_user(pool: &SqlitePool, email: &str) -> User {
    repository::user::create(
        pool,
        UserCreate {
            email: email.to_string(),
            name: "Test User".to_string(),
            password_hash: Some("$2b$04$placeholderplaceholderplace".to_string()),
            google_id: None,
            phone_number: None,
            address: None,
        },
    )
    .await
    .expect("Failed to seed user")
}

pub async fn seed_restaurant(
    pool: &SqlitePool,
    name: &str,
    minimum_order: f64,
    delivery_fee: f64,
    service_charge_rate: f64,
    tax_rate: f64,
) -> Restaurant {
    repository::restaurant::create(
        pool,
        RestaurantCreate {
            name: name.to_string(),
            description: None,
            cuisine_type: Some("Italian".to_string()),
            address: "1 Test Street".to_string(),
            phone_number: Some("555-0100".to_string()),
            minimum_order,
            delivery_fee,
            service_charge_rate,
            tax_rate,
        },
    )
    .await
    .expect("Failed to seed restaurant")
}

pub async fn seed_category(pool: &SqlitePool, restaurant_id: i64) -> MenuCategory {
    repository::menu_category::create(
        pool,
        MenuCategoryCreate {
            restaurant_id,
            name: "Mains".to_string(),
            description: None,
            display_order: 1,
        },
    )
    .await
    .expect("Failed to seed category")
}

pub async fn seed_dish(
    pool: &SqlitePool,
    restaurant_id: i64,
    category_id: i64,
    name: &str,
    price: f64,
) -> Dish {
    repository::dish::create(
        pool,
        DishCreate {
            restaurant_id,
            category_id,
            name: name.to_string(),
            description: None,
            price,
            image_uri: None,
        },
    )
    .await
    .expect("Failed to seed dish")
}
