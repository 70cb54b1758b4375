use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{JwtService, TokenLedger};
use crate::core::Config;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | jwt | Arc<JwtService> | JWT 签发/验证 |
/// | tokens | Arc<TokenLedger> | 刷新令牌账本 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// JWT 认证服务
    pub jwt: Arc<JwtService>,
    /// 刷新令牌账本 (签发/轮换/撤销)
    pub tokens: Arc<TokenLedger>,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let jwt = Arc::new(JwtService::with_config(config.auth.clone()));
        let tokens = Arc::new(TokenLedger::new(jwt.clone(), config.auth.clone()));
        Self {
            config,
            pool,
            jwt,
            tokens,
        }
    }
}
