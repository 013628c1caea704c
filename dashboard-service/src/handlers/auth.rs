//! Session handlers: signup, login, logout, current actor.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

use crate::{
    AppState,
    middleware::AuthActor,
    models::{ActorResponse, CreateActor, Role},
    services::metrics::AUTH_ATTEMPTS_TOTAL,
    utils::{Password, PasswordHashString, hash_password, verify_password},
};

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub password: String,
}

/// Access token issued after successful auth.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Auth response with actor profile and token.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: ActorResponse,
    pub tokens: TokenResponse,
}

#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    // Self-service signup only hands out the two operational roles; admin
    // and managing-director accounts are provisioned by an admin.
    if !matches!(req.role, Role::SalesOfficer | Role::Storekeeper) {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Role '{}' cannot be self-assigned",
            req.role.as_str()
        )));
    }

    let password_hash = hash_password(&Password::new(req.password))?;

    let actor = state
        .db
        .create_user(&CreateActor {
            email: req.email,
            display_name: req.name,
            role: req.role,
            is_active: true,
            password_hash: password_hash.into_string(),
        })
        .await?;

    let access_token = state.jwt.generate_access_token(&actor)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: actor.sanitized(),
            tokens: TokenResponse {
                access_token,
                token_type: "Bearer".to_string(),
                expires_in: state.jwt.expires_in_seconds(),
            },
        }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let actor = state.db.get_user_by_email(&req.email).await?;

    let Some(actor) = actor else {
        AUTH_ATTEMPTS_TOTAL.with_label_values(&["failure"]).inc();
        return Err(AppError::AuthError(anyhow::anyhow!(
            "Invalid email or password"
        )));
    };

    if !actor.is_active {
        AUTH_ATTEMPTS_TOTAL.with_label_values(&["failure"]).inc();
        return Err(AppError::AuthError(anyhow::anyhow!(
            "Account is deactivated"
        )));
    }

    if verify_password(
        &Password::new(req.password),
        &PasswordHashString::new(actor.password_hash.clone()),
    )
    .is_err()
    {
        AUTH_ATTEMPTS_TOTAL.with_label_values(&["failure"]).inc();
        return Err(AppError::AuthError(anyhow::anyhow!(
            "Invalid email or password"
        )));
    }

    let access_token = state.jwt.generate_access_token(&actor)?;

    AUTH_ATTEMPTS_TOTAL.with_label_values(&["success"]).inc();
    tracing::info!(user_id = %actor.user_id, role = %actor.role_code, "Login succeeded");

    Ok(Json(AuthResponse {
        user: actor.sanitized(),
        tokens: TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: state.jwt.expires_in_seconds(),
        },
    }))
}

/// Tokens are stateless, so logout is a client-side discard; the endpoint
/// exists so the presentation layer has an explicit session end to call.
#[axum::debug_handler]
pub async fn logout(actor: AuthActor) -> Result<impl IntoResponse, AppError> {
    tracing::info!(user_id = %actor.0.user_id, "Session ended");
    Ok(Json(serde_json::json!({ "message": "Logged out" })))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    actor: AuthActor,
) -> Result<impl IntoResponse, AppError> {
    // Re-read so the profile reflects the latest role/active flag.
    let actor = state
        .db
        .get_user(actor.0.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

    Ok(Json(actor.sanitized()))
}
