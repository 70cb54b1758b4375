//! 刷新令牌账本
//!
//! 刷新令牌的签发、轮换和撤销。每个刷新令牌在数据库中只存 bcrypt 哈希，
//! 明文只出现在签发响应里。
//!
//! # 轮换协议
//!
//! 1. 用刷新密钥验证 JWT 签名
//! 2. 加载该用户所有未到期的令牌行 (含已撤销的), 按创建时间倒序
//! 3. 逐行 bcrypt 比对, 命中即停
//! 4. 命中已撤销行 = 令牌被重放, 撤销该用户全部令牌并拒绝
//! 5. 命中有效行 = 正常轮换, 旧行盖章作废, 签发新令牌对

use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, warn};

use super::jwt::{AuthConfig, Claims, JwtError, JwtService, TokenKind};
use crate::db::repository::{self, RepoError};
use crate::utils::AppError;
use shared::models::RefreshTokenCreate;

/// 默认刷新令牌有效期 (7 天), 配置解析失败时回退
const DEFAULT_REFRESH_SECONDS: i64 = 7 * 24 * 3600;
/// 默认访问令牌有效期 (15 分钟)
const DEFAULT_ACCESS_SECONDS: i64 = 15 * 60;

/// 签发结果: 访问令牌 + 刷新令牌
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// 访问令牌剩余秒数
    pub expires_in: i64,
}

/// 令牌账本错误
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Invalid refresh token")]
    Invalid,

    #[error("Refresh token expired")]
    Expired,

    #[error("Refresh token reuse detected for user {0}")]
    Reuse(i64),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("Hashing failed: {0}")]
    Hash(String),
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            // 重放检测结果对客户端不可见, 与普通无效令牌同样返回 401
            TokenError::Invalid | TokenError::Reuse(_) => AppError::InvalidToken,
            TokenError::Expired => AppError::TokenExpired,
            TokenError::Repo(e) => e.into(),
            TokenError::Hash(msg) => AppError::Internal(msg),
        }
    }
}

/// 解析有效期字符串, 如 "15m", "12h", "7d"
///
/// 无法解析时回退到 7 天并记录警告。
pub fn parse_expiry(value: &str, fallback_seconds: i64) -> i64 {
    let parsed = value
        .char_indices()
        .last()
        .and_then(|(split, unit)| {
            let amount: i64 = value[..split].parse().ok().filter(|n| *n > 0)?;
            match unit {
                'm' => Some(amount * 60),
                'h' => Some(amount * 3600),
                'd' => Some(amount * 86400),
                _ => None,
            }
        });
    match parsed {
        Some(seconds) => seconds,
        None => {
            warn!(value, "Unparseable token expiry, falling back to default");
            fallback_seconds
        }
    }
}

/// bcrypt 截断 72 字节, 同一用户的 JWT 前缀相同, 必须先做 SHA-256 指纹
fn fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// 刷新令牌账本
pub struct TokenLedger {
    jwt: Arc<JwtService>,
    config: AuthConfig,
}

impl TokenLedger {
    pub fn new(jwt: Arc<JwtService>, config: AuthConfig) -> Self {
        Self { jwt, config }
    }

    /// 访问令牌有效期 (秒)
    pub fn access_ttl(&self) -> i64 {
        parse_expiry(&self.config.access_expiry, DEFAULT_ACCESS_SECONDS)
    }

    /// 刷新令牌有效期 (秒)
    pub fn refresh_ttl(&self) -> i64 {
        parse_expiry(&self.config.refresh_expiry, DEFAULT_REFRESH_SECONDS)
    }

    /// 为用户签发新令牌对并登记刷新令牌
    pub async fn issue(
        &self,
        pool: &SqlitePool,
        user_id: i64,
        email: &str,
        device_info: Option<String>,
    ) -> Result<TokenPair, TokenError> {
        let access_ttl = self.access_ttl();
        let refresh_ttl = self.refresh_ttl();

        let access_token = self
            .jwt
            .generate_token(TokenKind::Access, user_id, email, access_ttl)
            .map_err(|e| TokenError::Hash(e.to_string()))?;
        let refresh_token = self
            .jwt
            .generate_token(TokenKind::Refresh, user_id, email, refresh_ttl)
            .map_err(|e| TokenError::Hash(e.to_string()))?;

        let token_hash = bcrypt::hash(fingerprint(&refresh_token), self.config.bcrypt_cost)
            .map_err(|e| TokenError::Hash(e.to_string()))?;

        let now = shared::util::now_millis();
        repository::refresh_token::create(
            pool,
            RefreshTokenCreate {
                token_hash,
                user_id,
                expires_at: now + refresh_ttl * 1000,
                device_info,
            },
        )
        .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: access_ttl,
        })
    }

    /// 轮换刷新令牌: 旧令牌作废, 返回新令牌对
    pub async fn rotate(
        &self,
        pool: &SqlitePool,
        refresh_token: &str,
    ) -> Result<(TokenPair, i64), TokenError> {
        let claims = self.decode_refresh(pool, refresh_token).await?;
        let user_id = claims.user_id().map_err(|_| TokenError::Invalid)?;

        let now = shared::util::now_millis();
        let matched = self.find_matching(pool, user_id, refresh_token, now).await?;
        let Some(row) = matched else {
            return Err(TokenError::Invalid);
        };

        if row.is_revoked {
            // 已作废的令牌被再次使用, 视为被盗, 全部下线
            let revoked = repository::refresh_token::revoke_all_for_user(pool, user_id, now).await?;
            error!(
                user_id,
                token_id = row.id,
                revoked,
                "Refresh token reuse detected, all sessions revoked"
            );
            return Err(TokenError::Reuse(user_id));
        }

        if row.is_expired(now) {
            repository::refresh_token::revoke(pool, row.id, now).await?;
            return Err(TokenError::Expired);
        }

        repository::refresh_token::mark_rotated(pool, row.id, now).await?;

        // 新令牌继承旧令牌的设备信息
        let pair = self
            .issue(pool, user_id, &claims.email, row.device_info.clone())
            .await?;
        Ok((pair, user_id))
    }

    /// 注销单个会话: 作废与给定刷新令牌匹配的行
    ///
    /// 令牌必须属于调用者本人。未命中时静默成功, 注销是幂等的。
    pub async fn revoke(
        &self,
        pool: &SqlitePool,
        refresh_token: &str,
        caller_user_id: i64,
    ) -> Result<(), TokenError> {
        let claims = self.decode_refresh(pool, refresh_token).await?;
        let user_id = claims.user_id().map_err(|_| TokenError::Invalid)?;
        if user_id != caller_user_id {
            warn!(
                caller_user_id,
                token_user_id = user_id,
                "Logout attempted with another user's refresh token"
            );
            return Err(TokenError::Invalid);
        }

        let now = shared::util::now_millis();
        if let Some(row) = self.find_matching(pool, user_id, refresh_token, now).await?
            && !row.is_revoked
        {
            repository::refresh_token::revoke(pool, row.id, now).await?;
        }
        Ok(())
    }

    /// 注销所有会话, 返回作废的令牌数量
    pub async fn revoke_all(&self, pool: &SqlitePool, user_id: i64) -> Result<u64, TokenError> {
        let now = shared::util::now_millis();
        Ok(repository::refresh_token::revoke_all_for_user(pool, user_id, now).await?)
    }

    /// 验证刷新令牌 JWT
    ///
    /// 签名有效但已过期时, 先把对应的行作废再报过期。
    async fn decode_refresh(
        &self,
        pool: &SqlitePool,
        refresh_token: &str,
    ) -> Result<Claims, TokenError> {
        match self.jwt.validate_token(TokenKind::Refresh, refresh_token) {
            Ok(claims) => Ok(claims),
            Err(JwtError::ExpiredToken) => {
                self.revoke_expired(pool, refresh_token).await;
                Err(TokenError::Expired)
            }
            Err(_) => Err(TokenError::Invalid),
        }
    }

    /// 尽力作废一个 JWT 已过期的令牌行 (失败只记日志)
    async fn revoke_expired(&self, pool: &SqlitePool, refresh_token: &str) {
        // 关闭 exp 校验重新解码, 拿到 user_id 定位行
        let mut validation =
            jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = false;
        let key = jsonwebtoken::DecodingKey::from_secret(self.config.refresh_secret.as_bytes());
        let Ok(data) = jsonwebtoken::decode::<Claims>(refresh_token, &key, &validation) else {
            return;
        };
        let Ok(user_id) = data.claims.user_id() else {
            return;
        };

        let now = shared::util::now_millis();
        match self.find_matching(pool, user_id, refresh_token, now).await {
            Ok(Some(row)) if !row.is_revoked => {
                if let Err(e) = repository::refresh_token::revoke(pool, row.id, now).await {
                    warn!(user_id, token_id = row.id, error = %e, "Failed to revoke expired token");
                }
            }
            Ok(_) => {}
            Err(e) => warn!(user_id, error = %e, "Failed to look up expired token"),
        }
    }

    /// 在用户的未到期令牌中 bcrypt 比对, 命中即返回
    async fn find_matching(
        &self,
        pool: &SqlitePool,
        user_id: i64,
        refresh_token: &str,
        now: i64,
    ) -> Result<Option<shared::models::RefreshToken>, TokenError> {
        let print = fingerprint(refresh_token);
        let rows = repository::refresh_token::find_live_by_user(pool, user_id, now).await?;
        for row in rows {
            let ok = bcrypt::verify(&print, &row.token_hash)
                .map_err(|e| TokenError::Hash(e.to_string()))?;
            if ok {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }
}
