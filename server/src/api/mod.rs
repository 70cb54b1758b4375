//! HTTP API 模块
//!
//! 每个子模块提供自己的 `router()`, 由 `routes::build_router()` 汇总。

pub mod auth;
pub mod health;
pub mod maintenance;
pub mod orders;
