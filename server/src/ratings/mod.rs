//! 餐厅评分聚合
//!
//! 餐厅评分是菜品评分的派生值: 以评分数为权重的加权平均。
//! 聚合任务周期执行, 也可通过维护接口手动触发。

use rust_decimal::prelude::*;
use serde::Serialize;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::db::repository;
use crate::utils::AppResult;

/// Derived ratings round to 8 decimal places
const RATING_DP: u32 = 8;

/// One aggregation sweep over all restaurants
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RatingSummary {
    /// Restaurants successfully recomputed
    pub processed: u64,
    /// Restaurants skipped due to an error
    pub errors: u64,
    pub message: String,
}

/// Weighted mean of (average_rating, rating_count) pairs
///
/// Returns `(0.0, 0)` when no dish has ratings; a restaurant with unrated
/// dishes reads as unrated, not as rated zero.
pub fn weighted_mean(dish_ratings: &[(f64, i64)]) -> (f64, i64) {
    let mut weighted_sum = Decimal::ZERO;
    let mut total_count: i64 = 0;

    for (rating, count) in dish_ratings {
        if *count <= 0 {
            continue;
        }
        let rating = Decimal::from_f64(*rating).unwrap_or(Decimal::ZERO);
        weighted_sum += rating * Decimal::from(*count);
        total_count += count;
    }

    if total_count == 0 {
        return (0.0, 0);
    }

    let mean = (weighted_sum / Decimal::from(total_count))
        .round_dp_with_strategy(RATING_DP, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0);
    (mean, total_count)
}

/// Recompute one restaurant's derived rating fields
pub async fn recompute_restaurant(pool: &SqlitePool, restaurant_id: i64) -> AppResult<()> {
    let dish_ratings = repository::dish::rated_by_restaurant(pool, restaurant_id).await?;
    let (average_rating, rating_count) = weighted_mean(&dish_ratings);
    repository::restaurant::update_rating(pool, restaurant_id, average_rating, rating_count)
        .await?;
    debug!(
        restaurant_id,
        average_rating, rating_count, "Restaurant rating recomputed"
    );
    Ok(())
}

/// Recompute every restaurant, continuing past per-restaurant failures
pub async fn recompute_all(pool: &SqlitePool) -> AppResult<RatingSummary> {
    let ids = repository::restaurant::all_ids(pool).await?;
    let mut processed: u64 = 0;
    let mut errors: u64 = 0;

    for id in ids {
        match recompute_restaurant(pool, id).await {
            Ok(()) => processed += 1,
            Err(e) => {
                errors += 1;
                error!(restaurant_id = id, error = %e, "Rating aggregation failed for restaurant");
            }
        }
    }

    let message = format!("Aggregated ratings for {processed} restaurant(s), {errors} error(s)");
    info!(processed, errors, "Rating aggregation sweep finished");
    Ok(RatingSummary {
        processed,
        errors,
        message,
    })
}

/// 周期评分聚合调度器
///
/// 注册为 `TaskKind::Periodic`, 在 `start_background_tasks()` 中启动。
pub struct RatingScheduler {
    pool: SqlitePool,
    interval_hours: u64,
    shutdown: CancellationToken,
}

impl RatingScheduler {
    pub fn new(pool: SqlitePool, interval_hours: u64, shutdown: CancellationToken) -> Self {
        Self {
            pool,
            interval_hours,
            shutdown,
        }
    }

    /// 主循环: 固定间隔触发, 收到 shutdown 信号退出
    pub async fn run(self) {
        info!(
            interval_hours = self.interval_hours,
            "Rating scheduler started"
        );

        let period = std::time::Duration::from_secs(self.interval_hours.max(1) * 3600);
        let mut ticker = tokio::time::interval(period);
        // 第一个 tick 立即到期, 跳过它避免启动时立刻全量扫描
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = recompute_all(&self.pool).await {
                        error!(error = %e, "Scheduled rating aggregation failed");
                    }
                }
                _ = self.shutdown.cancelled() => {
                    break;
                }
            }
        }

        info!("Rating scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_mean_basic() {
        // (5*10 + 3*5) / 15 = 65/15 = 4.33333333...
        let (mean, count) = weighted_mean(&[(5.0, 10), (3.0, 5)]);
        assert_eq!(mean, 4.33333333);
        assert_eq!(count, 15);
    }

    #[test]
    fn test_weighted_mean_empty() {
        assert_eq!(weighted_mean(&[]), (0.0, 0));
    }

    #[test]
    fn test_weighted_mean_skips_zero_counts() {
        let (mean, count) = weighted_mean(&[(5.0, 0), (4.0, 2)]);
        assert_eq!(mean, 4.0);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_weighted_mean_single_dish() {
        let (mean, count) = weighted_mean(&[(4.5, 7)]);
        assert_eq!(mean, 4.5);
        assert_eq!(count, 7);
    }
}
