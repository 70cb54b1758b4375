//! 认证中间件
//!
//! 为 JWT 认证提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::jwt::{Claims, JwtError, JwtService, TokenKind};
use crate::core::ServerState;
use crate::db::repository;
use crate::utils::AppError;

/// 当前用户上下文 (从 JWT Claims 解析)
///
/// 由认证中间件创建, 注入到请求扩展
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 用户 ID
    pub id: i64,
    /// 用户邮箱
    pub email: String,
}

impl CurrentUser {
    fn from_claims(claims: &Claims) -> Result<Self, JwtError> {
        Ok(Self {
            id: claims.user_id()?,
            email: claims.email.clone(),
        })
    }
}

/// 跳过认证的 API 路径
const PUBLIC_API_ROUTES: &[&str] = &[
    "/api/auth/register",
    "/api/auth/login",
    "/api/auth/google",
    "/api/auth/refresh",
];

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证访问令牌。
/// 验证成功后确认账号仍然有效, 再将 [`CurrentUser`] 注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径 (如 `/health`)
/// - [`PUBLIC_API_ROUTES`] 中的公共接口
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 Unauthorized |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 / 刷新令牌冒充 | 401 InvalidToken |
/// | 账号已停用 | 401 Unauthorized |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // 允许 CORS 预检的 OPTIONS 请求 (跳过认证)
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // 非 API 路由跳过认证 (让它们正常返回 404)
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    if PUBLIC_API_ROUTES.contains(&path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => {
            JwtService::extract_from_header(header).ok_or(AppError::InvalidToken)?
        }
        None => {
            warn!(uri = %req.uri(), "Request without authorization header");
            return Err(AppError::Unauthorized);
        }
    };

    let claims = state
        .jwt
        .validate_token(TokenKind::Access, token)
        .map_err(|e| {
            warn!(uri = %req.uri(), error = %e, "Access token rejected");
            match e {
                JwtError::ExpiredToken => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            }
        })?;

    let user = CurrentUser::from_claims(&claims).map_err(|_| AppError::InvalidToken)?;

    // 停用的账号持有未过期令牌也不得访问
    let account = repository::user::find_by_id(&state.pool, user.id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if !account.is_active {
        warn!(user_id = user.id, "Deactivated account attempted access");
        return Err(AppError::Unauthorized);
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
