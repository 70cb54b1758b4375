//! JWT Extractor
//!
//! Custom extractor so protected handlers can take `CurrentUser` directly

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::auth::{CurrentUser, JwtError, JwtService, TokenKind};
use crate::core::ServerState;
use crate::utils::AppError;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Usually already present, injected by the auth middleware
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => {
                JwtService::extract_from_header(header).ok_or(AppError::InvalidToken)?
            }
            None => {
                warn!(uri = %parts.uri, "Request without authorization header");
                return Err(AppError::Unauthorized);
            }
        };

        match state.jwt.validate_token(TokenKind::Access, token) {
            Ok(claims) => {
                let user = CurrentUser {
                    id: claims.user_id().map_err(|_| AppError::InvalidToken)?,
                    email: claims.email,
                };
                parts.extensions.insert(user.clone());
                Ok(user)
            }
            Err(e) => {
                warn!(uri = %parts.uri, error = %e, "Access token rejected");
                match e {
                    JwtError::ExpiredToken => Err(AppError::TokenExpired),
                    _ => Err(AppError::InvalidToken),
                }
            }
        }
    }
}
