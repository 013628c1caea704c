//! Invoice handlers: listing with filters, creation, status updates and
//! line item replacement.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    handlers::customers::CreateCustomerRequest,
    middleware::AuthActor,
    models::{
        CreateCustomer, CreateInvoice, Customer, DateRange, InvoiceFilter, InvoiceResponse,
        InvoiceStatus, InvoiceWithDetails, NewLineItem, Role,
    },
    services::{
        access, metrics::INVOICES_TOTAL, numbering::generate_invoice_number, reporting,
        totals::{compute_totals, retained_items},
    },
};

#[derive(Debug, Deserialize)]
pub struct InvoiceListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub date_range: Option<DateRange>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LineItemRequest {
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    /// Existing customer to bill, or...
    pub customer_id: Option<Uuid>,
    /// ...a new customer created together with the invoice.
    #[validate(nested)]
    pub customer: Option<CreateCustomerRequest>,
    #[validate(nested)]
    pub items: Vec<LineItemRequest>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub storekeeper_name: Option<String>,
    pub sales_officer_name: Option<String>,
    pub driver_name: Option<String>,
    pub vehicle_plate: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReplaceItemsRequest {
    #[validate(nested)]
    pub items: Vec<LineItemRequest>,
}

fn parse_status_filter(raw: Option<&str>) -> Result<Option<InvoiceStatus>, AppError> {
    match raw {
        None | Some("all") => Ok(None),
        Some(value) => InvoiceStatus::from_string(value).map(Some).ok_or_else(|| {
            AppError::BadRequest(anyhow::anyhow!("Unknown invoice status '{}'", value))
        }),
    }
}

fn to_new_items(items: Vec<LineItemRequest>) -> Result<Vec<NewLineItem>, AppError> {
    if items.iter().any(|item| item.unit_price < Decimal::ZERO) {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Unit price cannot be negative"
        )));
    }

    Ok(items
        .into_iter()
        .map(|item| NewLineItem {
            name: item.name,
            description: item.description,
            quantity: item.quantity,
            unit_price: item.unit_price,
        })
        .collect())
}

#[axum::debug_handler]
pub async fn list_invoices(
    State(state): State<AppState>,
    actor: AuthActor,
    Query(query): Query<InvoiceListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = InvoiceFilter {
        search: query.search.unwrap_or_default(),
        status: parse_status_filter(query.status.as_deref())?,
        date_range: query.date_range.unwrap_or_default(),
    };

    let all = state.db.list_invoices_with_details().await?;
    let visible = access::visible_invoices(&actor.0, all);
    let mut filtered = reporting::filter_invoices(visible, &filter, Utc::now());
    reporting::sort_newest_first(&mut filtered);

    let response: Vec<InvoiceResponse> = filtered.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn get_invoice(
    State(state): State<AppState>,
    actor: AuthActor,
    Path(invoice_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let details = state
        .db
        .get_invoice_with_details(invoice_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    // Outside a sales officer's visible set the invoice does not exist.
    if matches!(actor.0.role(), Some(Role::SalesOfficer))
        && details.invoice.created_by != actor.0.user_id
    {
        return Err(AppError::NotFound(anyhow::anyhow!("Invoice not found")));
    }

    Ok(Json(InvoiceResponse::from(details)))
}

#[axum::debug_handler]
pub async fn create_invoice(
    State(state): State<AppState>,
    actor: AuthActor,
    Json(req): Json<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    access::require_permission(&actor.0, "create_invoice")?;
    req.validate()?;

    let customer = resolve_customer(&state, &actor.0, req.customer_id, req.customer).await?;

    let items = retained_items(to_new_items(req.items)?);
    let totals = compute_totals(&items, state.config.billing.tax_rate);

    let now = Utc::now();
    let input = CreateInvoice {
        invoice_number: generate_invoice_number(&state.config.billing.invoice_number_prefix, now),
        customer_id: customer.customer_id,
        created_by: actor.0.user_id,
        status: InvoiceStatus::Draft,
        subtotal: totals.subtotal,
        tax_amount: totals.tax,
        total_amount: totals.total,
        due_date: req.due_date,
        notes: req.notes,
        storekeeper_name: req.storekeeper_name,
        sales_officer_name: req.sales_officer_name,
        driver_name: req.driver_name,
        vehicle_plate: req.vehicle_plate,
    };

    let (invoice, line_items) = state.db.create_invoice(&input, &items).await?;

    INVOICES_TOTAL
        .with_label_values(&[InvoiceStatus::Draft.as_str()])
        .inc();

    Ok((
        StatusCode::CREATED,
        Json(InvoiceResponse::from(InvoiceWithDetails {
            invoice,
            customer,
            items: line_items,
        })),
    ))
}

/// Resolve the billed customer: an existing id, or a customer created
/// inline with the invoice. Rejected before any invoice write when neither
/// is given.
async fn resolve_customer(
    state: &AppState,
    actor: &crate::models::Actor,
    customer_id: Option<Uuid>,
    new_customer: Option<CreateCustomerRequest>,
) -> Result<Customer, AppError> {
    if let Some(customer_id) = customer_id {
        return state
            .db
            .get_customer(customer_id)
            .await?
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Customer not found")));
    }

    if let Some(req) = new_customer {
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
                created_by: actor.user_id,
            })
            .await?;
        return Ok(customer);
    }

    Err(AppError::BadRequest(anyhow::anyhow!(
        "An invoice requires a customer"
    )))
}

#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    actor: AuthActor,
    Path(invoice_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = InvoiceStatus::from_string(&req.status).ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!("Unknown invoice status '{}'", req.status))
    })?;

    let details = state
        .db
        .get_invoice_with_details(invoice_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    access::require_edit(&actor.0, &details.invoice)?;

    let invoice = state
        .db
        .update_invoice_status(invoice_id, status)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    INVOICES_TOTAL.with_label_values(&[status.as_str()]).inc();

    Ok(Json(InvoiceResponse::from(InvoiceWithDetails {
        invoice,
        customer: details.customer,
        items: details.items,
    })))
}

#[axum::debug_handler]
pub async fn replace_items(
    State(state): State<AppState>,
    actor: AuthActor,
    Path(invoice_id): Path<Uuid>,
    Json(req): Json<ReplaceItemsRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let details = state
        .db
        .get_invoice_with_details(invoice_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    access::require_edit(&actor.0, &details.invoice)?;

    let items = retained_items(to_new_items(req.items)?);
    let totals = compute_totals(&items, state.config.billing.tax_rate);

    let (invoice, line_items) = state
        .db
        .replace_line_items(invoice_id, &items, &totals)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    Ok(Json(InvoiceResponse::from(InvoiceWithDetails {
        invoice,
        customer: details.customer,
        items: line_items,
    })))
}
