//! Bearer-token authentication middleware.
//!
//! Validates the JWT, then re-reads the actor row so role changes and
//! deactivation take effect immediately rather than at token expiry. The
//! loaded [`Actor`] is threaded through request extensions; handlers receive
//! it via the [`AuthActor`] extractor and pass it on explicitly.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::IntoResponse,
};
use service_core::error::AppError;

use crate::{AppState, models::Actor};

/// Middleware to require an authenticated, active actor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = token else {
        return Err(AppError::Unauthorized(anyhow::anyhow!(
            "Missing or invalid Authorization header"
        )));
    };

    let claims = state.jwt.validate_access_token(token).map_err(|_| {
        AppError::Unauthorized(anyhow::anyhow!("Invalid or expired token"))
    })?;

    let actor = state
        .db
        .get_user(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Unknown actor")))?;

    if !actor.is_active {
        return Err(AppError::Unauthorized(anyhow::anyhow!(
            "Account is deactivated"
        )));
    }

    req.extensions_mut().insert(actor);

    Ok(next.run(req).await)
}

/// Extractor handing handlers the authenticated actor.
pub struct AuthActor(pub Actor);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts.extensions.get::<Actor>().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Actor missing from request extensions"
            ))
        })?;

        Ok(AuthActor(actor.clone()))
    }
}
