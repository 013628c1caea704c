//! Customer CRUD handlers.

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
    models::{CreateCustomer, CustomerResponse, UpdateCustomer},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub preferred_payment_method: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, message = "Customer name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub preferred_payment_method: Option<String>,
}

#[axum::debug_handler]
pub async fn list_customers(
    State(state): State<AppState>,
    _actor: AuthActor,
) -> Result<impl IntoResponse, AppError> {
    let customers = state.db.list_customers().await?;
    let response: Vec<CustomerResponse> = customers.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn create_customer(
    State(state): State<AppState>,
    actor: AuthActor,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let customer = state
        .db
        .create_customer(&CreateCustomer {
            name: req.name,
            email: req.email,
            phone: req.phone,
            address: req.address,
            city: req.city,
            region: req.region,
            preferred_payment_method: req.preferred_payment_method,
            created_by: actor.0.user_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CustomerResponse::from(customer))))
}

#[axum::debug_handler]
pub async fn update_customer(
    State(state): State<AppState>,
    _actor: AuthActor,
    Path(customer_id): Path<Uuid>,
    Json(req): Json<UpdateCustomerRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let customer = state
        .db
        .update_customer(
            customer_id,
            &UpdateCustomer {
                name: req.name,
                email: req.email,
                phone: req.phone,
                address: req.address,
                city: req.city,
                region: req.region,
                preferred_payment_method: req.preferred_payment_method,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Customer not found")))?;

    Ok(Json(CustomerResponse::from(customer)))
}
