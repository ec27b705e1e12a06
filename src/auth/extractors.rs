use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use crate::auth::{
    claims::{Identity, TokenKind},
    jwt::JwtKeys,
};
use crate::error::AppError;

const INVALID_TOKEN: &str = "Invalid or expired token";

/// Extracts and validates the bearer token, yielding the caller's identity.
/// Handlers that take this never run for unauthenticated requests.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        // Expect "Bearer <token>"
        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::Unauthorized(INVALID_TOKEN.into())
        })?;

        // A refresh token must not stand in for an access token.
        match keys.kind_of(&claims) {
            Some(TokenKind::Access | TokenKind::Cli) => Ok(AuthUser(claims.into())),
            kind => {
                warn!(user_id = claims.user_id, ?kind, "token lifetime not accepted for requests");
                Err(AppError::Unauthorized(INVALID_TOKEN.into()))
            }
        }
    }
}
