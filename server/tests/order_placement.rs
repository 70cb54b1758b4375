//! 下单事务集成测试
//!
//! 覆盖金额计算、订单号分配、失败路径零写入和状态流转。

mod common;

use delivery_server::AppError;
use delivery_server::db::repository;
use delivery_server::orders::{self, PlaceOrder, PlaceOrderLine, status};
use shared::models::{DishUpdate, OrderStatus};

fn line(dish_id: i64, quantity: i64) -> PlaceOrderLine {
    PlaceOrderLine {
        dish_id,
        quantity,
        special_instructions: None,
    }
}

fn order_input(restaurant_id: i64, items: Vec<PlaceOrderLine>) -> PlaceOrder {
    PlaceOrder {
        restaurant_id,
        items,
        delivery_address: "42 Delivery Lane".to_string(),
        delivery_instructions: Some("Ring twice".to_string()),
    }
}

#[tokio::test]
async fn places_order_with_compounded_totals() {
    let db = common::test_db().await;
    let user = common::seed_user(&db.pool, "alice@example.com").await;
    let restaurant = common::seed_restaurant(&db.pool, "Trattoria", 10.00, 2.00, 0.05, 0.10).await;
    let category = common::seed_category(&db.pool, restaurant.id).await;
    let dish = common::seed_dish(&db.pool, restaurant.id, category.id, "Margherita", 12.50).await;

    let (order, items) = orders::place_order(
        &db.pool,
        user.id,
        order_input(restaurant.id, vec![line(dish.id, 2)]),
    )
    .await
    .expect("Placement failed");

    assert_eq!(order.subtotal, 25.00);
    assert_eq!(order.delivery_fee, 2.00);
    // (25 + 2) * 0.05
    assert_eq!(order.service_charge, 1.35);
    // (25 + 2 + 1.35) * 0.10 = 2.835 rounds to 2.84
    assert_eq!(order.tax_amount, 2.84);
    // Sum of the stored components
    assert_eq!(order.total_amount, 31.19);
    assert_eq!(order.status, OrderStatus::Pending);

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].dish_name, "Margherita");
    assert_eq!(items[0].price_at_order, 12.50);
    assert_eq!(items[0].subtotal, 25.00);

    // Persisted rows match what was returned
    let stored = repository::order::find_by_id(&db.pool, order.id)
        .await
        .unwrap()
        .expect("Order row missing");
    assert_eq!(stored.total_amount, 31.19);
    assert_eq!(stored.order_number, order.order_number);
}

#[tokio::test]
async fn assigns_sequential_order_numbers() {
    let db = common::test_db().await;
    let user = common::seed_user(&db.pool, "bob@example.com").await;
    let restaurant = common::seed_restaurant(&db.pool, "Sushi Bar", 0.0, 0.0, 0.0, 0.0).await;
    let category = common::seed_category(&db.pool, restaurant.id).await;
    let dish = common::seed_dish(&db.pool, restaurant.id, category.id, "Nigiri", 8.00).await;

    let mut numbers = Vec::new();
    for _ in 0..3 {
        let (order, _) = orders::place_order(
            &db.pool,
            user.id,
            order_input(restaurant.id, vec![line(dish.id, 1)]),
        )
        .await
        .expect("Placement failed");
        numbers.push(order.order_number);
    }

    let year = chrono::Datelike::year(&chrono::Utc::now());
    assert_eq!(numbers[0], format!("ORD-{year}-000001"));
    assert_eq!(numbers[1], format!("ORD-{year}-000002"));
    assert_eq!(numbers[2], format!("ORD-{year}-000003"));
}

#[tokio::test]
async fn rejects_order_below_minimum_without_writes() {
    let db = common::test_db().await;
    let user = common::seed_user(&db.pool, "carol@example.com").await;
    let restaurant = common::seed_restaurant(&db.pool, "Steakhouse", 50.00, 3.00, 0.0, 0.0).await;
    let category = common::seed_category(&db.pool, restaurant.id).await;
    let dish = common::seed_dish(&db.pool, restaurant.id, category.id, "Fries", 4.00).await;

    let err = orders::place_order(
        &db.pool,
        user.id,
        order_input(restaurant.id, vec![line(dish.id, 2)]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)), "got {err:?}");

    let (order_rows, item_rows) = repository::order::count_orders_and_items(&db.pool)
        .await
        .unwrap();
    assert_eq!(order_rows, 0);
    assert_eq!(item_rows, 0);
}

#[tokio::test]
async fn rejects_unknown_and_foreign_dishes_without_writes() {
    let db = common::test_db().await;
    let user = common::seed_user(&db.pool, "dave@example.com").await;
    let restaurant = common::seed_restaurant(&db.pool, "Taqueria", 0.0, 0.0, 0.0, 0.0).await;
    let category = common::seed_category(&db.pool, restaurant.id).await;
    let dish = common::seed_dish(&db.pool, restaurant.id, category.id, "Taco", 3.50).await;

    let other = common::seed_restaurant(&db.pool, "Other Place", 0.0, 0.0, 0.0, 0.0).await;
    let other_category = common::seed_category(&db.pool, other.id).await;
    let foreign_dish =
        common::seed_dish(&db.pool, other.id, other_category.id, "Burrito", 9.00).await;

    // Unknown dish id rejects the request as a whole (400, not 404)
    let err = orders::place_order(
        &db.pool,
        user.id,
        order_input(restaurant.id, vec![line(999_999, 1)]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)), "got {err:?}");

    // Dish belonging to a different restaurant
    let err = orders::place_order(
        &db.pool,
        user.id,
        order_input(restaurant.id, vec![line(dish.id, 1), line(foreign_dish.id, 1)]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)), "got {err:?}");
    assert!(
        err.to_string().contains(&foreign_dish.id.to_string()),
        "got {err:?}"
    );

    let (order_rows, item_rows) = repository::order::count_orders_and_items(&db.pool)
        .await
        .unwrap();
    assert_eq!(order_rows, 0);
    assert_eq!(item_rows, 0);
}

#[tokio::test]
async fn rejects_unavailable_dish_and_inactive_restaurant() {
    let db = common::test_db().await;
    let user = common::seed_user(&db.pool, "erin@example.com").await;
    let restaurant = common::seed_restaurant(&db.pool, "Bistro", 0.0, 0.0, 0.0, 0.0).await;
    let category = common::seed_category(&db.pool, restaurant.id).await;
    let dish = common::seed_dish(&db.pool, restaurant.id, category.id, "Quiche", 7.00).await;
    let second = common::seed_dish(&db.pool, restaurant.id, category.id, "Tartine", 8.00).await;

    repository::dish::set_available(&db.pool, dish.id, false)
        .await
        .unwrap();
    repository::dish::set_available(&db.pool, second.id, false)
        .await
        .unwrap();
    let err = orders::place_order(
        &db.pool,
        user.id,
        order_input(restaurant.id, vec![line(dish.id, 1), line(second.id, 1)]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)), "got {err:?}");
    // Every offending dish is named, not just the first
    let msg = err.to_string();
    assert!(msg.contains("Quiche") && msg.contains("Tartine"), "got {msg}");

    repository::dish::set_available(&db.pool, dish.id, true)
        .await
        .unwrap();
    repository::dish::set_available(&db.pool, second.id, true)
        .await
        .unwrap();
    repository::restaurant::set_active(&db.pool, restaurant.id, false)
        .await
        .unwrap();
    let err = orders::place_order(
        &db.pool,
        user.id,
        order_input(restaurant.id, vec![line(dish.id, 1)]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)), "got {err:?}");
}

#[tokio::test]
async fn rejects_invalid_input_before_touching_the_database() {
    let db = common::test_db().await;
    let user = common::seed_user(&db.pool, "frank@example.com").await;
    let restaurant = common::seed_restaurant(&db.pool, "Diner", 0.0, 0.0, 0.0, 0.0).await;
    let category = common::seed_category(&db.pool, restaurant.id).await;
    let dish = common::seed_dish(&db.pool, restaurant.id, category.id, "Pancakes", 6.00).await;

    // Empty item list
    let err = orders::place_order(&db.pool, user.id, order_input(restaurant.id, vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");

    // Zero quantity
    let err = orders::place_order(
        &db.pool,
        user.id,
        order_input(restaurant.id, vec![line(dish.id, 0)]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");

    // Blank address
    let mut input = order_input(restaurant.id, vec![line(dish.id, 1)]);
    input.delivery_address = "   ".to_string();
    let err = orders::place_order(&db.pool, user.id, input)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");
}

#[tokio::test]
async fn order_items_keep_the_price_snapshot() {
    let db = common::test_db().await;
    let user = common::seed_user(&db.pool, "grace@example.com").await;
    let restaurant = common::seed_restaurant(&db.pool, "Noodle House", 0.0, 0.0, 0.0, 0.0).await;
    let category = common::seed_category(&db.pool, restaurant.id).await;
    let dish = common::seed_dish(&db.pool, restaurant.id, category.id, "Ramen", 11.00).await;

    let (order, _) = orders::place_order(
        &db.pool,
        user.id,
        order_input(restaurant.id, vec![line(dish.id, 1)]),
    )
    .await
    .unwrap();

    // Price hike after placement must not touch existing orders
    repository::dish::update(
        &db.pool,
        dish.id,
        DishUpdate {
            category_id: None,
            name: None,
            description: None,
            price: Some(15.00),
            image_uri: None,
            is_available: None,
        },
    )
    .await
    .unwrap();

    let items = repository::order::find_items(&db.pool, order.id).await.unwrap();
    assert_eq!(items[0].price_at_order, 11.00);
    assert_eq!(items[0].subtotal, 11.00);
}

#[tokio::test]
async fn walks_the_status_machine_to_delivery() {
    let db = common::test_db().await;
    let user = common::seed_user(&db.pool, "heidi@example.com").await;
    let restaurant = common::seed_restaurant(&db.pool, "Curry House", 0.0, 0.0, 0.0, 0.0).await;
    let category = common::seed_category(&db.pool, restaurant.id).await;
    let dish = common::seed_dish(&db.pool, restaurant.id, category.id, "Korma", 13.00).await;

    let (order, _) = orders::place_order(
        &db.pool,
        user.id,
        order_input(restaurant.id, vec![line(dish.id, 1)]),
    )
    .await
    .unwrap();

    let chain = [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ];
    let mut current = order.status;
    for next in chain {
        status::validate_transition(current, next).expect("Transition should be legal");
        let updated = repository::order::update_status(&db.pool, order.id, next, None, None)
            .await
            .unwrap();
        assert_eq!(updated.status, next);
        current = next;
    }

    // Terminal: no further moves
    assert!(status::validate_transition(current, OrderStatus::Cancelled).is_err());
}

#[tokio::test]
async fn loads_order_detail_with_restaurant_summary() {
    let db = common::test_db().await;
    let user = common::seed_user(&db.pool, "ivan@example.com").await;
    let restaurant = common::seed_restaurant(&db.pool, "Pho Corner", 0.0, 1.50, 0.0, 0.0).await;
    let category = common::seed_category(&db.pool, restaurant.id).await;
    let dish = common::seed_dish(&db.pool, restaurant.id, category.id, "Pho Bo", 10.50).await;

    let (order, _) = orders::place_order(
        &db.pool,
        user.id,
        order_input(restaurant.id, vec![line(dish.id, 2)]),
    )
    .await
    .unwrap();

    let detail = orders::load_detail(&db.pool, order).await.unwrap();
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.restaurant.name, "Pho Corner");
    assert_eq!(detail.restaurant.id, restaurant.id);
}
