//! Shared builders for engine tests.

use chrono::{DateTime, TimeZone, Utc};
use dashboard_service::models::{
    Actor, Customer, Invoice, InvoiceStatus, InvoiceWithDetails, LineItem, Role,
};
use rust_decimal::Decimal;
use uuid::Uuid;

pub fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

pub fn actor(n: u128, role: Role) -> Actor {
    Actor {
        user_id: id(n),
        email: format!("user{}@hardware.example", n),
        display_name: format!("User {}", n),
        role_code: role.as_str().to_string(),
        is_active: true,
        password_hash: String::new(),
        created_utc: at(2024, 1, 1),
        updated_utc: at(2024, 1, 1),
    }
}

pub fn customer(n: u128, name: &str, email: Option<&str>) -> Customer {
    Customer {
        customer_id: id(n),
        name: name.to_string(),
        email: email.map(String::from),
        phone: None,
        address: None,
        city: None,
        region: None,
        preferred_payment_method: None,
        created_by: id(1),
        created_utc: at(2024, 1, 1),
        updated_utc: at(2024, 1, 1),
    }
}

pub fn line_item(invoice_id: Uuid, name: &str, quantity: i32, unit_price: &str) -> LineItem {
    let unit_price: Decimal = unit_price.parse().unwrap();
    LineItem {
        line_item_id: Uuid::new_v4(),
        invoice_id,
        name: name.to_string(),
        description: None,
        quantity,
        unit_price,
        total: Decimal::from(quantity) * unit_price,
        sort_order: 0,
        created_utc: at(2024, 1, 1),
    }
}

pub struct InvoiceFixture<'a> {
    pub id: u128,
    pub number: &'a str,
    pub customer: &'a Customer,
    pub created_by: Uuid,
    pub status: InvoiceStatus,
    pub total: &'a str,
    pub created: DateTime<Utc>,
}

pub fn invoice(fixture: InvoiceFixture<'_>) -> InvoiceWithDetails {
    let total: Decimal = fixture.total.parse().unwrap();
    InvoiceWithDetails {
        invoice: Invoice {
            invoice_id: id(fixture.id),
            invoice_number: fixture.number.to_string(),
            customer_id: fixture.customer.customer_id,
            created_by: fixture.created_by,
            status: fixture.status.as_str().to_string(),
            subtotal: total,
            tax_amount: Decimal::ZERO,
            total_amount: total,
            due_date: None,
            notes: None,
            storekeeper_name: None,
            sales_officer_name: None,
            driver_name: None,
            vehicle_plate: None,
            created_utc: fixture.created,
            updated_utc: fixture.created,
        },
        customer: fixture.customer.clone(),
        items: Vec::new(),
    }
}
