//! 评分聚合集成测试

mod common;

use delivery_server::db::repository;
use delivery_server::ratings;

#[tokio::test]
async fn aggregates_count_weighted_restaurant_rating() {
    let db = common::test_db().await;
    let restaurant = common::seed_restaurant(&db.pool, "Trattoria", 0.0, 0.0, 0.0, 0.0).await;
    let category = common::seed_category(&db.pool, restaurant.id).await;
    let a = common::seed_dish(&db.pool, restaurant.id, category.id, "Pasta", 12.00).await;
    let b = common::seed_dish(&db.pool, restaurant.id, category.id, "Pizza", 10.00).await;
    // Unrated dish must not drag the average down
    let _c = common::seed_dish(&db.pool, restaurant.id, category.id, "Salad", 6.00).await;

    repository::dish::set_rating(&db.pool, a.id, 5.0, 10).await.unwrap();
    repository::dish::set_rating(&db.pool, b.id, 3.0, 5).await.unwrap();

    let summary = ratings::recompute_all(&db.pool).await.unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.errors, 0);

    let updated = repository::restaurant::find_by_id(&db.pool, restaurant.id)
        .await
        .unwrap()
        .unwrap();
    // (5*10 + 3*5) / 15 at 8 dp
    assert_eq!(updated.average_rating, 4.33333333);
    assert_eq!(updated.rating_count, 15);
}

#[tokio::test]
async fn zero_rated_restaurant_reads_as_unrated() {
    let db = common::test_db().await;
    let restaurant = common::seed_restaurant(&db.pool, "New Spot", 0.0, 0.0, 0.0, 0.0).await;
    let category = common::seed_category(&db.pool, restaurant.id).await;
    let dish = common::seed_dish(&db.pool, restaurant.id, category.id, "Soup", 5.00).await;

    // Pretend an earlier sweep rated it, then the ratings disappear
    repository::dish::set_rating(&db.pool, dish.id, 4.0, 8).await.unwrap();
    ratings::recompute_all(&db.pool).await.unwrap();
    repository::dish::set_rating(&db.pool, dish.id, 0.0, 0).await.unwrap();

    let summary = ratings::recompute_all(&db.pool).await.unwrap();
    assert_eq!(summary.processed, 1);

    let updated = repository::restaurant::find_by_id(&db.pool, restaurant.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.average_rating, 0.0);
    assert_eq!(updated.rating_count, 0);
}

#[tokio::test]
async fn sweep_covers_every_restaurant() {
    let db = common::test_db().await;
    for name in ["One", "Two", "Three"] {
        common::seed_restaurant(&db.pool, name, 0.0, 0.0, 0.0, 0.0).await;
    }

    let summary = ratings::recompute_all(&db.pool).await.unwrap();
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.errors, 0);
    assert!(summary.message.contains("3 restaurant(s)"));
}
