//! Reporting handlers. All of them require the `view_reports` permission
//! and fold over the actor's visible invoice set.

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use service_core::error::AppError;

use crate::{
    AppState,
    middleware::AuthActor,
    models::InvoiceWithDetails,
    services::{access, reporting},
};

const DEFAULT_MONTHS: usize = 6;
const DEFAULT_TOP_CUSTOMERS: usize = 5;

#[derive(Debug, Deserialize)]
pub struct MonthlyRevenueQuery {
    pub months: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TopCustomersQuery {
    pub limit: Option<usize>,
}

async fn visible_set(
    state: &AppState,
    actor: &crate::models::Actor,
) -> Result<Vec<InvoiceWithDetails>, AppError> {
    access::require_permission(actor, "view_reports")?;
    let all = state.db.list_invoices_with_details().await?;
    Ok(access::visible_invoices(actor, all))
}

#[axum::debug_handler]
pub async fn summary(
    State(state): State<AppState>,
    actor: AuthActor,
) -> Result<impl IntoResponse, AppError> {
    let invoices = visible_set(&state, &actor.0).await?;
    Ok(Json(reporting::financial_summary(&invoices, Utc::now())))
}

#[axum::debug_handler]
pub async fn monthly_revenue(
    State(state): State<AppState>,
    actor: AuthActor,
    Query(query): Query<MonthlyRevenueQuery>,
) -> Result<impl IntoResponse, AppError> {
    let invoices = visible_set(&state, &actor.0).await?;
    let months = query.months.unwrap_or(DEFAULT_MONTHS).max(1);
    Ok(Json(reporting::monthly_revenue(&invoices, months)))
}

#[axum::debug_handler]
pub async fn status_breakdown(
    State(state): State<AppState>,
    actor: AuthActor,
) -> Result<impl IntoResponse, AppError> {
    let invoices = visible_set(&state, &actor.0).await?;
    Ok(Json(reporting::status_breakdown(&invoices)))
}

#[axum::debug_handler]
pub async fn top_customers(
    State(state): State<AppState>,
    actor: AuthActor,
    Query(query): Query<TopCustomersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let invoices = visible_set(&state, &actor.0).await?;
    let limit = query.limit.unwrap_or(DEFAULT_TOP_CUSTOMERS).max(1);
    Ok(Json(reporting::top_customers(&invoices, limit)))
}
