//! Delivery Server - 外卖订单平台后端
//!
//! # 架构概述
//!
//! - **认证** (`auth`): JWT 双令牌 + 刷新令牌账本
//! - **数据库** (`db`): SQLite (sqlx), 仓储层
//! - **订单** (`orders`): 下单事务、订单号、状态机、金额计算
//! - **评分** (`ratings`): 餐厅评分聚合 (周期 + 手动)
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── auth/          # JWT、令牌账本、中间件
//! ├── api/           # HTTP 路由和处理器
//! ├── routes/        # 路由装配
//! ├── orders/        # 订单域逻辑
//! ├── ratings/       # 评分聚合
//! ├── utils/         # 错误、日志、分页
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod ratings;
pub mod routes;
pub mod utils;

// Re-export 公共类型
pub use auth::{AuthConfig, CurrentUser, JwtService, TokenLedger};
pub use core::{Config, ServerState};
pub use core::server::Server;
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() {
    dotenv::dotenv().ok();
    init_logger();
}
