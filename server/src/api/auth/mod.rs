//! Auth API 模块
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/auth/register | POST | 注册 | 无 |
//! | /api/auth/login | POST | 邮箱密码登录 | 无 |
//! | /api/auth/google | POST | Google 身份登录/注册 | 无 |
//! | /api/auth/refresh | POST | 刷新令牌轮换 | 无 |
//! | /api/auth/logout | POST | 注销当前会话 | 需要 |
//! | /api/auth/logout-all | POST | 注销所有会话 | 需要 |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/google", post(handler::google))
        .route("/refresh", post(handler::refresh))
        .route("/logout", post(handler::logout))
        .route("/logout-all", post(handler::logout_all))
}
