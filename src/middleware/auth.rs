//! JWT authentication extractor for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRole;
use crate::services::{auth as auth_service, session};
use crate::AppState;

/// Authenticated user extracted from a Bearer access token.
///
/// ```ignore
/// async fn handler(current_user: CurrentUser) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    /// Raw token, kept so logout can revoke it.
    pub token: String,
    /// Token expiry as a unix timestamp.
    pub expires_at: i64,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized)?;
        let token = bearer.token();

        let claims = auth_service::validate_token(token, &state.config.jwt_secret)?;

        if claims.token_type != "access" {
            return Err(AppError::Unauthorized);
        }

        if session::is_revoked(&state.redis, token).await? {
            return Err(AppError::Unauthorized);
        }

        let user_id: Uuid = claims
            .user_id
            .parse()
            .map_err(|_| AppError::Unauthorized)?;

        let role = UserRole::parse(&claims.role).ok_or_else(|| {
            AppError::Internal(format!("Invalid role in token: {}", claims.role))
        })?;

        Ok(CurrentUser {
            id: user_id,
            email: claims.sub,
            role,
            token: token.to_string(),
            expires_at: claims.exp,
        })
    }
}
