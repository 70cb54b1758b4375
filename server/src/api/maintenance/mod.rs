//! Maintenance API 模块
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/maintenance/recompute-ratings | POST | 手动触发评分聚合 | 需要 |

use axum::{Json, Router, extract::State, routing::post};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::ratings::{self, RatingSummary};
use crate::utils::{AppResponse, AppResult, ok_with_message};

pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/api/maintenance/recompute-ratings",
        post(recompute_ratings),
    )
}

/// POST /api/maintenance/recompute-ratings - 立即执行一轮评分聚合
pub async fn recompute_ratings(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<RatingSummary>>> {
    tracing::info!(user_id = user.id, "Manual rating aggregation triggered");
    let summary = ratings::recompute_all(&state.pool).await?;
    let message = summary.message.clone();
    Ok(ok_with_message(summary, message))
}
