use crate::auth::AuthConfig;

/// 服务器配置 - 所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATABASE_PATH | delivery.db | SQLite 数据库文件 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | ACCESS_TOKEN_EXPIRY | 15m | 访问令牌有效期 |
/// | REFRESH_TOKEN_EXPIRY | 7d | 刷新令牌有效期 |
/// | BCRYPT_COST | 10 | bcrypt 成本因子 |
/// | RATING_INTERVAL_HOURS | 4 | 评分聚合任务间隔 |
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 数据库文件路径
    pub database_path: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 认证配置 (JWT 密钥、令牌有效期、bcrypt 成本)
    pub auth: AuthConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 评分聚合任务运行间隔 (小时)
    pub rating_interval_hours: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "delivery.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            auth: AuthConfig::from_env(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            rating_interval_hours: std::env::var("RATING_INTERVAL_HOURS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(4),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(database_path: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.database_path = database_path.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
