//! Listing filter and report aggregation tests.

mod common;

use chrono::{TimeZone, Utc};
use common::{at, customer, invoice, InvoiceFixture};
use dashboard_service::models::{Customer, DateRange, InvoiceFilter, InvoiceStatus};
use dashboard_service::services::reporting::{
    filter_invoices, financial_summary, monthly_revenue, sort_newest_first, status_breakdown,
    top_customers,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn sample_set(cust: &Customer) -> Vec<dashboard_service::models::InvoiceWithDetails> {
    vec![
        invoice(InvoiceFixture {
            id: 1,
            number: "INV-2026-000101",
            customer: cust,
            created_by: Uuid::from_u128(10),
            status: InvoiceStatus::Paid,
            total: "100",
            created: at(2026, 8, 1),
        }),
        invoice(InvoiceFixture {
            id: 2,
            number: "INV-2026-000102",
            customer: cust,
            created_by: Uuid::from_u128(10),
            status: InvoiceStatus::Sent,
            total: "60",
            created: at(2026, 8, 3),
        }),
        invoice(InvoiceFixture {
            id: 3,
            number: "INV-2026-000103",
            customer: cust,
            created_by: Uuid::from_u128(10),
            status: InvoiceStatus::Overdue,
            total: "30",
            created: at(2026, 7, 15),
        }),
        invoice(InvoiceFixture {
            id: 4,
            number: "INV-2026-000104",
            customer: cust,
            created_by: Uuid::from_u128(10),
            status: InvoiceStatus::Draft,
            total: "10",
            created: at(2026, 7, 10),
        }),
    ]
}

#[test]
fn passthrough_filter_is_the_identity() {
    let cust = customer(100, "ABC Construction Ltd", Some("contact@abcconstruction.com"));
    let invoices = sample_set(&cust);
    let ids: Vec<_> = invoices.iter().map(|i| i.invoice.invoice_id).collect();

    let filtered = filter_invoices(invoices, &InvoiceFilter::default(), at(2026, 8, 6));
    let filtered_ids: Vec<_> = filtered.iter().map(|i| i.invoice.invoice_id).collect();

    assert_eq!(filtered_ids, ids);
}

#[test]
fn search_matches_number_name_and_email_case_insensitively() {
    let cust = customer(100, "ABC Construction Ltd", Some("contact@abcconstruction.com"));
    let other = customer(101, "XYZ Hardware Store", Some("orders@xyzhardware.com"));
    let invoices = vec![
        invoice(InvoiceFixture {
            id: 1,
            number: "INV-2026-000101",
            customer: &cust,
            created_by: Uuid::from_u128(10),
            status: InvoiceStatus::Sent,
            total: "100",
            created: at(2026, 8, 1),
        }),
        invoice(InvoiceFixture {
            id: 2,
            number: "INV-2026-000202",
            customer: &other,
            created_by: Uuid::from_u128(10),
            status: InvoiceStatus::Sent,
            total: "50",
            created: at(2026, 8, 2),
        }),
    ];
    let now = at(2026, 8, 6);

    let by_number = filter_invoices(
        invoices.clone(),
        &InvoiceFilter {
            search: "000101".to_string(),
            ..Default::default()
        },
        now,
    );
    assert_eq!(by_number.len(), 1);
    assert_eq!(by_number[0].invoice.invoice_number, "INV-2026-000101");

    let by_name = filter_invoices(
        invoices.clone(),
        &InvoiceFilter {
            search: "abc construction".to_string(),
            ..Default::default()
        },
        now,
    );
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].customer.name, "ABC Construction Ltd");

    let by_email = filter_invoices(
        invoices,
        &InvoiceFilter {
            search: "ORDERS@XYZ".to_string(),
            ..Default::default()
        },
        now,
    );
    assert_eq!(by_email.len(), 1);
    assert_eq!(by_email[0].customer.name, "XYZ Hardware Store");
}

#[test]
fn status_filter_is_an_exact_match() {
    let cust = customer(100, "ABC Construction Ltd", None);
    let invoices = sample_set(&cust);

    let paid = filter_invoices(
        invoices,
        &InvoiceFilter {
            status: Some(InvoiceStatus::Paid),
            ..Default::default()
        },
        at(2026, 8, 6),
    );
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].invoice.status, "paid");
}

#[test]
fn date_ranges_window_on_creation_instant() {
    let cust = customer(100, "ABC Construction Ltd", None);
    let now = Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap();
    let invoices = vec![
        invoice(InvoiceFixture {
            id: 1,
            number: "INV-A",
            customer: &cust,
            created_by: Uuid::from_u128(10),
            status: InvoiceStatus::Sent,
            total: "10",
            created: Utc.with_ymd_and_hms(2026, 8, 6, 8, 0, 0).unwrap(),
        }),
        invoice(InvoiceFixture {
            id: 2,
            number: "INV-B",
            customer: &cust,
            created_by: Uuid::from_u128(10),
            status: InvoiceStatus::Sent,
            total: "10",
            created: Utc.with_ymd_and_hms(2026, 8, 3, 12, 0, 0).unwrap(),
        }),
        invoice(InvoiceFixture {
            id: 3,
            number: "INV-C",
            customer: &cust,
            created_by: Uuid::from_u128(10),
            status: InvoiceStatus::Sent,
            total: "10",
            created: Utc.with_ymd_and_hms(2026, 7, 20, 12, 0, 0).unwrap(),
        }),
        invoice(InvoiceFixture {
            id: 4,
            number: "INV-D",
            customer: &cust,
            created_by: Uuid::from_u128(10),
            status: InvoiceStatus::Sent,
            total: "10",
            created: Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap(),
        }),
    ];

    let count_for = |range: DateRange| {
        filter_invoices(
            invoices.clone(),
            &InvoiceFilter {
                date_range: range,
                ..Default::default()
            },
            now,
        )
        .len()
    };

    assert_eq!(count_for(DateRange::Today), 1);
    assert_eq!(count_for(DateRange::Week), 2);
    assert_eq!(count_for(DateRange::Month), 3);
    assert_eq!(count_for(DateRange::Year), 4);
    assert_eq!(count_for(DateRange::All), 4);
}

#[test]
fn listings_sort_newest_first() {
    let cust = customer(100, "ABC Construction Ltd", None);
    let mut invoices = sample_set(&cust);
    sort_newest_first(&mut invoices);

    let numbers: Vec<_> = invoices
        .iter()
        .map(|i| i.invoice.invoice_number.as_str())
        .collect();
    assert_eq!(
        numbers,
        vec![
            "INV-2026-000102",
            "INV-2026-000101",
            "INV-2026-000103",
            "INV-2026-000104"
        ]
    );
}

#[test]
fn financial_summary_aggregates_by_status_and_month() {
    let cust = customer(100, "ABC Construction Ltd", None);
    let invoices = sample_set(&cust);
    let summary = financial_summary(&invoices, at(2026, 8, 6));

    assert_eq!(summary.total_revenue, dec("200"));
    assert_eq!(summary.paid_revenue, dec("100"));
    assert_eq!(summary.pending_revenue, dec("60"));
    assert_eq!(summary.overdue_revenue, dec("30"));
    assert_eq!(summary.current_month_revenue, dec("160"));
    assert_eq!(summary.last_month_revenue, dec("40"));
    assert_eq!(summary.monthly_growth, dec("3"));
    assert_eq!(summary.average_invoice_value, dec("50"));
    assert_eq!(summary.collection_rate, dec("0.5"));
    assert_eq!(summary.total_invoices, 4);
    assert_eq!(summary.paid_invoices, 1);
}

#[test]
fn empty_collection_yields_zero_rates_not_panics() {
    let summary = financial_summary(&[], at(2026, 8, 6));

    assert_eq!(summary.total_revenue, Decimal::ZERO);
    assert_eq!(summary.collection_rate, Decimal::ZERO);
    assert_eq!(summary.monthly_growth, Decimal::ZERO);
    assert_eq!(summary.average_invoice_value, Decimal::ZERO);
    assert_eq!(summary.total_invoices, 0);
}

#[test]
fn january_growth_compares_against_december() {
    let cust = customer(100, "ABC Construction Ltd", None);
    let invoices = vec![
        invoice(InvoiceFixture {
            id: 1,
            number: "INV-A",
            customer: &cust,
            created_by: Uuid::from_u128(10),
            status: InvoiceStatus::Paid,
            total: "90",
            created: at(2026, 1, 10),
        }),
        invoice(InvoiceFixture {
            id: 2,
            number: "INV-B",
            customer: &cust,
            created_by: Uuid::from_u128(10),
            status: InvoiceStatus::Paid,
            total: "30",
            created: at(2025, 12, 20),
        }),
    ];

    let summary = financial_summary(&invoices, at(2026, 1, 15));
    assert_eq!(summary.current_month_revenue, dec("90"));
    assert_eq!(summary.last_month_revenue, dec("30"));
    assert_eq!(summary.monthly_growth, dec("2"));
}

#[test]
fn monthly_revenue_is_ascending_and_trimmed() {
    let cust = customer(100, "ABC Construction Ltd", None);
    let invoices = sample_set(&cust);

    let series = monthly_revenue(&invoices, 6);
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].month, "2026-07");
    assert_eq!(series[0].revenue, dec("40"));
    assert_eq!(series[0].invoice_count, 2);
    assert_eq!(series[1].month, "2026-08");
    assert_eq!(series[1].revenue, dec("160"));
    assert_eq!(series[1].invoice_count, 2);

    let trimmed = monthly_revenue(&invoices, 1);
    assert_eq!(trimmed.len(), 1);
    assert_eq!(trimmed[0].month, "2026-08");
}

#[test]
fn status_breakdown_covers_all_four_statuses() {
    let cust = customer(100, "ABC Construction Ltd", None);
    let invoices = sample_set(&cust);

    let breakdown = status_breakdown(&invoices);
    let statuses: Vec<_> = breakdown.iter().map(|b| b.status.as_str()).collect();
    assert_eq!(statuses, vec!["draft", "sent", "paid", "overdue"]);

    let paid = &breakdown[2];
    assert_eq!(paid.count, 1);
    assert_eq!(paid.revenue, dec("100"));
}

#[test]
fn top_customers_ranks_by_revenue_with_first_seen_ties() {
    let first = customer(100, "ABC Construction Ltd", None);
    let second = customer(101, "XYZ Hardware Store", None);
    // Three invoices over two customers; both end up at 100 total, so the
    // first-seen customer must come out on top.
    let invoices = vec![
        invoice(InvoiceFixture {
            id: 1,
            number: "INV-A",
            customer: &first,
            created_by: Uuid::from_u128(10),
            status: InvoiceStatus::Paid,
            total: "50",
            created: at(2026, 8, 1),
        }),
        invoice(InvoiceFixture {
            id: 2,
            number: "INV-B",
            customer: &second,
            created_by: Uuid::from_u128(10),
            status: InvoiceStatus::Paid,
            total: "100",
            created: at(2026, 8, 2),
        }),
        invoice(InvoiceFixture {
            id: 3,
            number: "INV-C",
            customer: &first,
            created_by: Uuid::from_u128(10),
            status: InvoiceStatus::Sent,
            total: "50",
            created: at(2026, 8, 3),
        }),
    ];

    let ranking = top_customers(&invoices, 5);
    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0].name, "ABC Construction Ltd");
    assert_eq!(ranking[0].revenue, dec("100"));
    assert_eq!(ranking[0].invoice_count, 2);
    assert_eq!(ranking[1].name, "XYZ Hardware Store");
    assert_eq!(ranking[1].revenue, dec("100"));
    assert_eq!(ranking[1].invoice_count, 1);

    let limited = top_customers(&invoices, 1);
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].name, "ABC Construction Ltd");
}
