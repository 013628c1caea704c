//! Admin user-management handlers. Every endpoint here requires the `all`
//! permission.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    middleware::AuthActor,
    models::{ActorWithStatsResponse, CreateActor, Role, UpdateActor},
    services::access,
    utils::{Password, hash_password},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: Role,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    actor: AuthActor,
) -> Result<impl IntoResponse, AppError> {
    access::require_permission(&actor.0, "all")?;

    let users = state.db.list_users_with_stats().await?;
    let response: Vec<ActorWithStatsResponse> = users.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    actor: AuthActor,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    access::require_permission(&actor.0, "all")?;
    req.validate()?;

    let password_hash = hash_password(&Password::new(req.password))?;

    let user = state
        .db
        .create_user(&CreateActor {
            email: req.email,
            display_name: req.name,
            role: req.role,
            is_active: req.is_active.unwrap_or(true),
            password_hash: password_hash.into_string(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user.sanitized())))
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    actor: AuthActor,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    access::require_permission(&actor.0, "all")?;
    req.validate()?;

    let password_hash = match req.password {
        Some(password) => Some(hash_password(&Password::new(password))?.into_string()),
        None => None,
    };

    let user = state
        .db
        .update_user(
            user_id,
            &UpdateActor {
                display_name: req.name,
                role: req.role,
                is_active: req.is_active,
                password_hash,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

    Ok(Json(user.sanitized()))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    actor: AuthActor,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    access::require_permission(&actor.0, "all")?;

    if user_id == actor.0.user_id {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Cannot delete your own account"
        )));
    }

    let deleted = state.db.delete_user(user_id).await?;
    if !deleted {
        return Err(AppError::NotFound(anyhow::anyhow!("User not found")));
    }

    Ok(Json(serde_json::json!({ "message": "User deleted" })))
}
