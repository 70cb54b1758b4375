//! 认证授权模块
//!
//! 提供 JWT 认证、刷新令牌账本和中间件：
//! - [`JwtService`] - JWT 令牌服务 (双密钥)
//! - [`TokenLedger`] - 刷新令牌签发/轮换/撤销
//! - [`CurrentUser`] - 当前用户上下文
//! - [`require_auth`] - 认证中间件

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod tokens;

pub use jwt::{AuthConfig, Claims, JwtError, JwtService, TokenKind};
pub use middleware::{CurrentUser, require_auth};
pub use tokens::{TokenError, TokenLedger, TokenPair};
