//! Invoice and line item models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::customer::{Customer, CustomerResponse};

/// Invoice lifecycle status.
///
/// Transitions are deliberately unconstrained: any actor allowed to edit an
/// invoice may set any status. Gating happens on the edit permission, not on
/// the transition itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(InvoiceStatus::Draft),
            "sent" => Some(InvoiceStatus::Sent),
            "paid" => Some(InvoiceStatus::Paid),
            "overdue" => Some(InvoiceStatus::Overdue),
            _ => None,
        }
    }
}

/// Invoice entity as stored in the `invoices` table.
///
/// The UUID is assigned by the database adapter; `invoice_number` is the
/// human-readable advisory string generated at creation time.
#[derive(Debug, Clone, FromRow)]
pub struct Invoice {
    pub invoice_id: Uuid,
    pub invoice_number: String,
    pub customer_id: Uuid,
    pub created_by: Uuid,
    pub status: String,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub storekeeper_name: Option<String>,
    pub sales_officer_name: Option<String>,
    pub driver_name: Option<String>,
    pub vehicle_plate: Option<String>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Line item entity as stored in the `invoice_line_items` table.
///
/// `name` and `description` are distinct columns; `name` alone decides
/// whether the row counts toward the invoice subtotal.
#[derive(Debug, Clone, FromRow)]
pub struct LineItem {
    pub line_item_id: Uuid,
    pub invoice_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
    pub sort_order: i32,
    pub created_utc: DateTime<Utc>,
}

/// A line item as entered by the operator, before persistence.
#[derive(Debug, Clone)]
pub struct NewLineItem {
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Input for creating an invoice. Totals are computed by the engine before
/// this reaches the database adapter.
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub invoice_number: String,
    pub customer_id: Uuid,
    pub created_by: Uuid,
    pub status: InvoiceStatus,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub storekeeper_name: Option<String>,
    pub sales_officer_name: Option<String>,
    pub driver_name: Option<String>,
    pub vehicle_plate: Option<String>,
}

/// An invoice together with its customer and line items, the unit the
/// listing and reporting code operates on.
#[derive(Debug, Clone)]
pub struct InvoiceWithDetails {
    pub invoice: Invoice,
    pub customer: Customer,
    pub items: Vec<LineItem>,
}

/// Relative creation-date window for invoice listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRange {
    #[default]
    All,
    Today,
    Week,
    Month,
    Year,
}

/// Listing filter applied after role visibility.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub search: String,
    pub status: Option<InvoiceStatus>,
    pub date_range: DateRange,
}

/// Line item response for the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
}

impl From<LineItem> for LineItemResponse {
    fn from(li: LineItem) -> Self {
        Self {
            id: li.line_item_id,
            name: li.name,
            description: li.description,
            quantity: li.quantity,
            unit_price: li.unit_price,
            total: li.total,
        }
    }
}

/// Invoice response for the API, with customer and items embedded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub customer_id: Uuid,
    pub customer: CustomerResponse,
    pub items: Vec<LineItemResponse>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub status: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub storekeeper_name: Option<String>,
    pub sales_officer_name: Option<String>,
    pub driver_name: Option<String>,
    pub vehicle_plate: Option<String>,
}

impl From<InvoiceWithDetails> for InvoiceResponse {
    fn from(d: InvoiceWithDetails) -> Self {
        let inv = d.invoice;
        Self {
            id: inv.invoice_id,
            invoice_number: inv.invoice_number,
            customer_id: inv.customer_id,
            customer: CustomerResponse::from(d.customer),
            items: d.items.into_iter().map(LineItemResponse::from).collect(),
            subtotal: inv.subtotal,
            tax: inv.tax_amount,
            total: inv.total_amount,
            status: inv.status,
            created_by: inv.created_by,
            created_at: inv.created_utc,
            due_date: inv.due_date,
            notes: inv.notes,
            storekeeper_name: inv.storekeeper_name,
            sales_officer_name: inv.sales_officer_name,
            driver_name: inv.driver_name,
            vehicle_plate: inv.vehicle_plate,
        }
    }
}
