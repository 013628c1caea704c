//! Human-readable invoice number generation.

use chrono::{DateTime, Datelike, Utc};

/// Build an invoice number like `INV-2026-483921`: configured prefix,
/// 4-digit year, 6-digit suffix taken from the millisecond timestamp.
///
/// The value is advisory and display-oriented. It carries no uniqueness
/// guarantee under concurrent creation; the durable identifier is always
/// the database-assigned UUID.
pub fn generate_invoice_number(prefix: &str, now: DateTime<Utc>) -> String {
    let suffix = now.timestamp_millis().rem_euclid(1_000_000);
    format!("{}-{}-{:06}", prefix, now.year(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn number_has_prefix_year_and_six_digit_suffix() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 12, 30, 45).unwrap();
        let number = generate_invoice_number("INV", now);

        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "INV");
        assert_eq!(parts[1], "2026");
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn suffix_is_derived_from_the_millisecond_timestamp() {
        let now = Utc.timestamp_millis_opt(1_754_000_123_456).unwrap();
        let number = generate_invoice_number("HW", now);
        assert_eq!(number, format!("HW-{}-123456", now.year()));
    }
}
