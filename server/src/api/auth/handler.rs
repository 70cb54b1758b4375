//! Authentication Handlers
//!
//! Registration, login, Google identity, token rotation and logout.

use std::time::Duration;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use validator::Validate;

use crate::auth::{CurrentUser, TokenPair, password};
use crate::core::ServerState;
use crate::db::repository::{self, RepoError};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};
use shared::models::{UserCreate, UserPublic};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "must be 8 to 128 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub name: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GoogleAuthRequest {
    /// Google subject id, already verified upstream
    #[validate(length(min = 1, message = "is required"))]
    pub google_id: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub refresh_token: String,
}

#[derive(Debug, serde::Serialize)]
pub struct AuthResponse {
    pub user: UserPublic,
    pub tokens: TokenPair,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn device_info(headers: &HeaderMap) -> Option<String> {
    headers
        .get(http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.chars().take(255).collect())
}

/// POST /api/auth/register - 邮箱密码注册
pub async fn register(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AppResponse<AuthResponse>>)> {
    req.validate()?;
    let email = normalize_email(&req.email);

    if repository::user::find_by_email(&state.pool, &email)
        .await?
        .is_some()
    {
        return Err(AppError::conflict("Email is already registered"));
    }

    let password_hash = password::hash(&req.password, state.config.auth.bcrypt_cost)?;
    let user = match repository::user::create(
        &state.pool,
        UserCreate {
            email,
            name: req.name,
            password_hash: Some(password_hash),
            google_id: None,
            phone_number: req.phone_number,
            address: req.address,
        },
    )
    .await
    {
        Ok(user) => user,
        // Lost a race with a concurrent registration for the same email
        Err(RepoError::Duplicate(_)) => {
            return Err(AppError::conflict("Email is already registered"));
        }
        Err(e) => return Err(e.into()),
    };

    let tokens = state
        .tokens
        .issue(&state.pool, user.id, &user.email, device_info(&headers))
        .await?;

    tracing::info!(user_id = user.id, "User registered");
    Ok((
        StatusCode::CREATED,
        ok(AuthResponse {
            user: user.into(),
            tokens,
        }),
    ))
}

/// POST /api/auth/login - 邮箱密码登录
pub async fn login(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AppResponse<AuthResponse>>> {
    req.validate()?;
    let email = normalize_email(&req.email);

    let user = repository::user::find_by_email(&state.pool, &email).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent email enumeration
    let user = match user {
        Some(user) => user,
        None => {
            password::equalize_timing(&req.password);
            tracing::warn!(%email, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    if !user.is_active {
        return Err(AppError::forbidden("Account has been disabled"));
    }

    // Google-only accounts have no password to check
    let Some(hash) = user.password_hash.as_deref() else {
        password::equalize_timing(&req.password);
        tracing::warn!(user_id = user.id, "Login failed - password login on Google-only account");
        return Err(AppError::invalid_credentials());
    };

    if !password::verify(&req.password, hash)? {
        tracing::warn!(user_id = user.id, "Login failed - invalid credentials");
        return Err(AppError::invalid_credentials());
    }

    let tokens = state
        .tokens
        .issue(&state.pool, user.id, &user.email, device_info(&headers))
        .await?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(ok(AuthResponse {
        user: user.into(),
        tokens,
    }))
}

/// POST /api/auth/google - Google 身份登录
///
/// 三种路径: google_id 已绑定则直接登录; 邮箱已注册则绑定后登录;
/// 否则注册无密码新账号。
pub async fn google(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(req): Json<GoogleAuthRequest>,
) -> AppResult<Json<AppResponse<AuthResponse>>> {
    req.validate()?;
    let email = normalize_email(&req.email);

    let user = match repository::user::find_by_google_id(&state.pool, &req.google_id).await? {
        Some(user) => user,
        None => match repository::user::find_by_email(&state.pool, &email).await? {
            Some(existing) => {
                // Same email registered with a password: link the identity
                tracing::info!(user_id = existing.id, "Linking Google identity to account");
                repository::user::set_google_id(&state.pool, existing.id, &req.google_id).await?
            }
            None => {
                let user = repository::user::create(
                    &state.pool,
                    UserCreate {
                        email,
                        name: req.name.clone(),
                        password_hash: None,
                        google_id: Some(req.google_id.clone()),
                        phone_number: None,
                        address: None,
                    },
                )
                .await?;
                tracing::info!(user_id = user.id, "User registered via Google");
                user
            }
        },
    };

    if !user.is_active {
        return Err(AppError::forbidden("Account has been disabled"));
    }

    let tokens = state
        .tokens
        .issue(&state.pool, user.id, &user.email, device_info(&headers))
        .await?;

    tracing::info!(user_id = user.id, "User logged in via Google");
    Ok(ok(AuthResponse {
        user: user.into(),
        tokens,
    }))
}

/// POST /api/auth/refresh - 刷新令牌轮换
pub async fn refresh(
    State(state): State<ServerState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<AppResponse<TokenPair>>> {
    req.validate()?;
    let (tokens, user_id) = state.tokens.rotate(&state.pool, &req.refresh_token).await?;
    tracing::debug!(user_id, "Refresh token rotated");
    Ok(ok(tokens))
}

/// POST /api/auth/logout - 注销当前会话
pub async fn logout(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<AppResponse<()>>> {
    req.validate()?;
    state
        .tokens
        .revoke(&state.pool, &req.refresh_token, user.id)
        .await?;
    tracing::info!(user_id = user.id, "User logged out");
    Ok(ok_with_message((), "Logged out"))
}

#[derive(Debug, serde::Serialize)]
pub struct LogoutAllResponse {
    /// Sessions revoked
    pub revoked: u64,
}

/// POST /api/auth/logout-all - 注销所有会话
pub async fn logout_all(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<LogoutAllResponse>>> {
    let revoked = state.tokens.revoke_all(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, revoked, "All sessions revoked");
    Ok(ok_with_message(
        LogoutAllResponse { revoked },
        "Logged out from all sessions",
    ))
}
