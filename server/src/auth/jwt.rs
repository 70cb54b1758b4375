//! JWT 令牌服务
//!
//! 处理访问令牌和刷新令牌的生成、验证和解析。
//! 两种令牌使用独立密钥签名，互相不可验证。

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// 认证配置
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | ACCESS_TOKEN_SECRET | (开发环境随机生成) | 访问令牌密钥 |
/// | REFRESH_TOKEN_SECRET | (开发环境随机生成) | 刷新令牌密钥 |
/// | ACCESS_TOKEN_EXPIRY | 15m | 访问令牌有效期 |
/// | REFRESH_TOKEN_EXPIRY | 7d | 刷新令牌有效期 |
/// | BCRYPT_COST | 10 | bcrypt 成本因子 |
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// 访问令牌密钥 (应至少 32 字节)
    pub access_secret: String,
    /// 刷新令牌密钥 (必须与访问令牌密钥不同)
    pub refresh_secret: String,
    /// 访问令牌有效期, 如 "15m", "12h", "7d"
    pub access_expiry: String,
    /// 刷新令牌有效期
    pub refresh_expiry: String,
    /// bcrypt 成本因子 (测试中可降低以加速)
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    /// 从环境变量加载认证配置
    pub fn from_env() -> Self {
        Self {
            access_secret: load_secret("ACCESS_TOKEN_SECRET"),
            refresh_secret: load_secret("REFRESH_TOKEN_SECRET"),
            access_expiry: std::env::var("ACCESS_TOKEN_EXPIRY").unwrap_or_else(|_| "15m".into()),
            refresh_expiry: std::env::var("REFRESH_TOKEN_EXPIRY").unwrap_or_else(|_| "7d".into()),
            bcrypt_cost: std::env::var("BCRYPT_COST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        }
    }

    /// 测试配置: 固定密钥, 低 bcrypt 成本
    pub fn for_tests() -> Self {
        Self {
            access_secret: "test-access-secret-0123456789abcdef".into(),
            refresh_secret: "test-refresh-secret-0123456789abcdef".into(),
            access_expiry: "15m".into(),
            refresh_expiry: "7d".into(),
            bcrypt_cost: 4,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// 从环境变量加载密钥, 开发环境缺失时生成临时密钥
fn load_secret(var: &str) -> String {
    match std::env::var(var) {
        Ok(secret) if secret.len() >= 32 => secret,
        Ok(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!("{var} is shorter than 32 bytes, generating temporary key");
                generate_printable_secret()
            }
            #[cfg(not(debug_assertions))]
            {
                panic!("{var} must be at least 32 characters long");
            }
        }
        Err(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!("{var} not set, generating temporary key for development");
                generate_printable_secret()
            }
            #[cfg(not(debug_assertions))]
            {
                panic!("{var} environment variable must be set in production");
            }
        }
    }
}

/// 生成可打印的临时密钥 (仅用于开发环境)
pub fn generate_printable_secret() -> String {
    const ALLOWED: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*-_=+";
    let mut rng = rand::thread_rng();
    (0..64)
        .map(|_| ALLOWED[rng.gen_range(0..ALLOWED.len())] as char)
        .collect()
}

/// 令牌类型, 决定使用哪个密钥验证
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID (Subject)
    pub sub: String,
    /// 用户邮箱
    pub email: String,
    /// 令牌类型: "access" | "refresh"
    pub token_type: String,
    /// 令牌唯一标识; iat 只有秒精度, 同一秒签发的令牌靠 jti 区分
    pub jti: String,
    /// 过期时间戳 (秒)
    pub exp: i64,
    /// 签发时间戳 (秒)
    pub iat: i64,
}

impl Claims {
    /// 解析 sub 为用户 ID
    pub fn user_id(&self) -> Result<i64, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::InvalidToken("Malformed subject claim".into()))
    }
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Wrong token type: expected {expected}, got {actual}")]
    WrongTokenType {
        expected: &'static str,
        actual: String,
    },

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

/// JWT 令牌服务
///
/// 访问令牌和刷新令牌各持一对编码/解码密钥。
#[derive(Clone)]
pub struct JwtService {
    config: AuthConfig,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl JwtService {
    /// 使用指定配置创建新的 JWT 服务
    pub fn with_config(config: AuthConfig) -> Self {
        let access_encoding = EncodingKey::from_secret(config.access_secret.as_bytes());
        let access_decoding = DecodingKey::from_secret(config.access_secret.as_bytes());
        let refresh_encoding = EncodingKey::from_secret(config.refresh_secret.as_bytes());
        let refresh_decoding = DecodingKey::from_secret(config.refresh_secret.as_bytes());

        Self {
            config,
            access_encoding,
            access_decoding,
            refresh_encoding,
            refresh_decoding,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// 为用户生成令牌
    ///
    /// `ttl_seconds` 由调用方根据配置的有效期字符串解析得出
    pub fn generate_token(
        &self,
        kind: TokenKind,
        user_id: i64,
        email: &str,
        ttl_seconds: i64,
    ) -> Result<String, JwtError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            token_type: kind.as_str().to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: now + ttl_seconds,
            iat: now,
        };

        let key = match kind {
            TokenKind::Access => &self.access_encoding,
            TokenKind::Refresh => &self.refresh_encoding,
        };
        encode(&Header::default(), &claims, key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 验证并解码令牌
    ///
    /// 签名、过期时间和 token_type 三者全部匹配才算有效。
    pub fn validate_token(&self, kind: TokenKind, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        let key = match kind {
            TokenKind::Access => &self.access_decoding,
            TokenKind::Refresh => &self.refresh_decoding,
        };
        let token_data =
            decode::<Claims>(token, key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            })?;

        let claims = token_data.claims;
        if claims.token_type != kind.as_str() {
            return Err(JwtError::WrongTokenType {
                expected: kind.as_str(),
                actual: claims.token_type,
            });
        }

        Ok(claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}
