//! Invoice totals computation.
//!
//! Pure arithmetic over line items: a line total is quantity times unit
//! price, the subtotal sums the lines the operator actually filled in, and
//! tax is a single configured rate applied to the subtotal.

use rust_decimal::Decimal;

use crate::models::NewLineItem;

/// Derived monetary fields of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Line total for a single item.
pub fn line_total(quantity: i32, unit_price: Decimal) -> Decimal {
    Decimal::from(quantity) * unit_price
}

/// Compute subtotal, tax and total for a sequence of line items.
///
/// Items whose name is blank after trimming are excluded; an empty sequence
/// yields all zeros.
pub fn compute_totals(items: &[NewLineItem], tax_rate: Decimal) -> Totals {
    let subtotal: Decimal = items
        .iter()
        .filter(|item| !item.name.trim().is_empty())
        .map(|item| line_total(item.quantity, item.unit_price))
        .sum();
    let tax = subtotal * tax_rate;

    Totals {
        subtotal,
        tax,
        total: subtotal + tax,
    }
}

/// Drop rows the operator left blank. Only items that survive this filter
/// are persisted, so stored items and the stored subtotal always agree.
pub fn retained_items(items: Vec<NewLineItem>) -> Vec<NewLineItem> {
    items
        .into_iter()
        .filter(|item| !item.name.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, quantity: i32, unit_price: &str) -> NewLineItem {
        NewLineItem {
            name: name.to_string(),
            description: None,
            quantity,
            unit_price: unit_price.parse().unwrap(),
        }
    }

    #[test]
    fn line_total_is_quantity_times_unit_price() {
        assert_eq!(line_total(100, "2.50".parse().unwrap()), "250".parse().unwrap());
        assert_eq!(line_total(0, "9.99".parse().unwrap()), Decimal::ZERO);
    }

    #[test]
    fn subtotal_sums_named_items_only() {
        let items = vec![
            item("Steel Bolts", 2, "10"),
            item("   ", 5, "100"),
            item("", 1, "100"),
            item("Washers", 1, "5"),
        ];
        let totals = compute_totals(&items, Decimal::ZERO);
        assert_eq!(totals.subtotal, "25".parse().unwrap());
    }

    #[test]
    fn tax_and_total_follow_the_rate() {
        let items = vec![item("Steel Bolts", 2, "10"), item("Washers", 1, "5")];
        let totals = compute_totals(&items, "0.18".parse().unwrap());
        assert_eq!(totals.subtotal, "25".parse().unwrap());
        assert_eq!(totals.tax, "4.50".parse().unwrap());
        assert_eq!(totals.total, "29.50".parse().unwrap());
    }

    #[test]
    fn zero_rate_means_total_equals_subtotal() {
        let items = vec![item("Cement", 3, "12.40")];
        let totals = compute_totals(&items, Decimal::ZERO);
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, totals.subtotal);
    }

    #[test]
    fn empty_sequence_yields_zeros() {
        let totals = compute_totals(&[], "0.18".parse().unwrap());
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn retained_items_drops_blank_names() {
        let kept = retained_items(vec![
            item("Nails", 10, "0.25"),
            item("  ", 1, "1"),
            item("Hammer", 1, "15"),
        ]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].name, "Nails");
        assert_eq!(kept[1].name, "Hammer");
    }
}
