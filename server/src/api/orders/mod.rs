//! Orders API 模块
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/orders | POST | 下单 (201) | 需要 |
//! | /api/orders | GET | 我的订单列表 (分页/筛选) | 需要 |
//! | /api/orders/{id} | GET | 订单详情 (仅本人) | 需要 |
//! | /api/orders/{id}/status | PATCH | 状态流转 | 需要 |
//! | /api/restaurants/{id}/orders | GET | 餐厅订单列表 | 需要 |

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/orders", post(handler::place).get(handler::list_mine))
        .route("/api/orders/{id}", get(handler::get_by_id))
        .route("/api/orders/{id}/status", patch(handler::update_status))
        .route(
            "/api/restaurants/{id}/orders",
            get(handler::list_for_restaurant),
        )
}
