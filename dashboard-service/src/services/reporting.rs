//! Listing filters and report aggregations.
//!
//! Every function here is a pure fold over a visibility-filtered invoice
//! collection. The evaluation instant is passed in explicitly so the
//! date-window logic stays testable.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{DateRange, InvoiceFilter, InvoiceStatus, InvoiceWithDetails};

/// Apply search, status and date-range filters. Order is preserved; with an
/// empty search, no status and `DateRange::All` the input passes through
/// unchanged.
pub fn filter_invoices(
    invoices: Vec<InvoiceWithDetails>,
    filter: &InvoiceFilter,
    now: DateTime<Utc>,
) -> Vec<InvoiceWithDetails> {
    let needle = filter.search.trim().to_lowercase();
    let cutoff = filter.date_range.cutoff(now);

    invoices
        .into_iter()
        .filter(|entry| {
            if !needle.is_empty() && !matches_search(entry, &needle) {
                return false;
            }
            if let Some(status) = filter.status {
                if entry.invoice.status != status.as_str() {
                    return false;
                }
            }
            if let Some(cutoff) = cutoff {
                if entry.invoice.created_utc < cutoff {
                    return false;
                }
            }
            true
        })
        .collect()
}

fn matches_search(entry: &InvoiceWithDetails, needle: &str) -> bool {
    entry.invoice.invoice_number.to_lowercase().contains(needle)
        || entry.customer.name.to_lowercase().contains(needle)
        || entry
            .customer
            .email
            .as_deref()
            .map(|email| email.to_lowercase().contains(needle))
            .unwrap_or(false)
}

impl DateRange {
    /// Earliest creation instant included by this window, `None` for `All`.
    fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            DateRange::All => None,
            DateRange::Today => Some(now.date_naive().and_time(NaiveTime::MIN).and_utc()),
            DateRange::Week => Some(now - Duration::days(7)),
            DateRange::Month => Some(now - Duration::days(30)),
            DateRange::Year => Some(now - Duration::days(365)),
        }
    }
}

/// Sort a listing newest-first by creation instant.
pub fn sort_newest_first(invoices: &mut [InvoiceWithDetails]) {
    invoices.sort_by(|a, b| b.invoice.created_utc.cmp(&a.invoice.created_utc));
}

/// Financial overview figures for the reports dashboard.
///
/// `collection_rate` and `monthly_growth` are ratios, zero when their
/// denominator is zero.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_revenue: Decimal,
    pub paid_revenue: Decimal,
    pub pending_revenue: Decimal,
    pub overdue_revenue: Decimal,
    pub current_month_revenue: Decimal,
    pub last_month_revenue: Decimal,
    pub monthly_growth: Decimal,
    pub average_invoice_value: Decimal,
    pub collection_rate: Decimal,
    pub total_invoices: u64,
    pub paid_invoices: u64,
}

/// Monthly revenue series entry. The `month` label is the `YYYY-MM` key the
/// series is sorted by.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    pub month: String,
    pub revenue: Decimal,
    pub invoice_count: u64,
}

/// Count and revenue for one invoice status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub status: String,
    pub count: u64,
    pub revenue: Decimal,
}

/// One entry in the top-customers ranking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRevenue {
    pub customer_id: Uuid,
    pub name: String,
    pub revenue: Decimal,
    pub invoice_count: u64,
}

fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

fn revenue_where<F>(invoices: &[InvoiceWithDetails], pred: F) -> Decimal
where
    F: Fn(&InvoiceWithDetails) -> bool,
{
    invoices
        .iter()
        .filter(|entry| pred(entry))
        .map(|entry| entry.invoice.total_amount)
        .sum()
}

/// Compute the financial overview for a visible invoice collection.
pub fn financial_summary(invoices: &[InvoiceWithDetails], now: DateTime<Utc>) -> FinancialSummary {
    let (current_year, current_month) = (now.year(), now.month());
    let (last_year, last_month) = if current_month == 1 {
        (current_year - 1, 12)
    } else {
        (current_year, current_month - 1)
    };

    let total_revenue = revenue_where(invoices, |_| true);
    let paid_revenue = revenue_where(invoices, |e| e.invoice.status == "paid");
    let pending_revenue = revenue_where(invoices, |e| e.invoice.status == "sent");
    let overdue_revenue = revenue_where(invoices, |e| e.invoice.status == "overdue");

    let current_month_revenue = revenue_where(invoices, |e| {
        e.invoice.created_utc.year() == current_year
            && e.invoice.created_utc.month() == current_month
    });
    let last_month_revenue = revenue_where(invoices, |e| {
        e.invoice.created_utc.year() == last_year && e.invoice.created_utc.month() == last_month
    });

    let total_invoices = invoices.len() as u64;
    let paid_invoices = invoices
        .iter()
        .filter(|e| e.invoice.status == "paid")
        .count() as u64;

    FinancialSummary {
        total_revenue,
        paid_revenue,
        pending_revenue,
        overdue_revenue,
        current_month_revenue,
        last_month_revenue,
        monthly_growth: ratio(current_month_revenue - last_month_revenue, last_month_revenue),
        average_invoice_value: ratio(total_revenue, Decimal::from(total_invoices)),
        collection_rate: ratio(paid_revenue, total_revenue),
        total_invoices,
        paid_invoices,
    }
}

/// Revenue per creation month, ascending by `YYYY-MM` label, trimmed to the
/// most recent `months` entries.
pub fn monthly_revenue(invoices: &[InvoiceWithDetails], months: usize) -> Vec<MonthlyRevenue> {
    let mut series: Vec<MonthlyRevenue> = Vec::new();

    for entry in invoices {
        let created = entry.invoice.created_utc;
        let label = format!("{:04}-{:02}", created.year(), created.month());
        match series.iter_mut().find(|m| m.month == label) {
            Some(bucket) => {
                bucket.revenue += entry.invoice.total_amount;
                bucket.invoice_count += 1;
            }
            None => series.push(MonthlyRevenue {
                month: label,
                revenue: entry.invoice.total_amount,
                invoice_count: 1,
            }),
        }
    }

    series.sort_by(|a, b| a.month.cmp(&b.month));
    if series.len() > months {
        series.drain(..series.len() - months);
    }
    series
}

/// Count and revenue per status, in the fixed status order.
pub fn status_breakdown(invoices: &[InvoiceWithDetails]) -> Vec<StatusBreakdown> {
    [
        InvoiceStatus::Draft,
        InvoiceStatus::Sent,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
    ]
    .iter()
    .map(|status| {
        let matching = invoices
            .iter()
            .filter(|e| e.invoice.status == status.as_str());
        StatusBreakdown {
            status: status.as_str().to_string(),
            count: matching.clone().count() as u64,
            revenue: matching.map(|e| e.invoice.total_amount).sum(),
        }
    })
    .collect()
}

/// Rank customers by summed invoice revenue, descending. Ties keep the
/// first-seen order of the input collection.
pub fn top_customers(invoices: &[InvoiceWithDetails], limit: usize) -> Vec<CustomerRevenue> {
    let mut ranking: Vec<CustomerRevenue> = Vec::new();

    for entry in invoices {
        let id = entry.invoice.customer_id;
        match ranking.iter_mut().find(|c| c.customer_id == id) {
            Some(bucket) => {
                bucket.revenue += entry.invoice.total_amount;
                bucket.invoice_count += 1;
            }
            None => ranking.push(CustomerRevenue {
                customer_id: id,
                name: entry.customer.name.clone(),
                revenue: entry.invoice.total_amount,
                invoice_count: 1,
            }),
        }
    }

    // Stable sort keeps insertion order for equal revenue.
    ranking.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    ranking.truncate(limit);
    ranking
}
