//! Financial-year scoped invoice numbers and calendar-year quotation numbers.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use service_core::error::AppError;

use crate::store::SequenceAllocator;

/// IST offset in seconds; financial years roll over on Indian dates.
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Calendar date in India at `now`.
pub fn local_date(now: DateTime<Utc>) -> NaiveDate {
    match FixedOffset::east_opt(IST_OFFSET_SECS) {
        Some(ist) => now.with_timezone(&ist).date_naive(),
        None => now.date_naive(),
    }
}

/// Start year of the April–March financial year containing `date`.
pub fn financial_year_start(date: NaiveDate) -> i32 {
    if date.month() >= 4 {
        date.year()
    } else {
        date.year() - 1
    }
}

/// `"24-25"` for any date between 2024-04-01 and 2025-03-31.
pub fn financial_year_label(date: NaiveDate) -> String {
    let start = financial_year_start(date);
    format!(
        "{:02}-{:02}",
        start.rem_euclid(100),
        (start + 1).rem_euclid(100)
    )
}

pub fn invoice_sequence_key(company_id: &str, fy_label: &str) -> String {
    format!("invoice-{}-{}", company_id, fy_label)
}

pub fn format_invoice_number(seq: i64, fy_label: &str) -> String {
    format!("{:04}-{}", seq, fy_label)
}

pub fn quotation_sequence_key(company_id: &str, year: i32) -> String {
    format!("quotation-{}-{}", company_id, year)
}

pub fn format_quotation_number(year: i32, seq: i64) -> String {
    format!("QUO-{}-{}", year, seq)
}

/// Allocate the next invoice number for the tenant's current financial year.
///
/// The allocated sequence is consumed even if the caller later fails.
pub async fn next_invoice_number<A: SequenceAllocator + ?Sized>(
    allocator: &A,
    company_id: &str,
    now: DateTime<Utc>,
) -> Result<String, AppError> {
    let fy_label = financial_year_label(local_date(now));
    let seq = allocator
        .allocate(&invoice_sequence_key(company_id, &fy_label))
        .await?;
    Ok(format_invoice_number(seq, &fy_label))
}

pub async fn next_quotation_number<A: SequenceAllocator + ?Sized>(
    allocator: &A,
    company_id: &str,
    now: DateTime<Utc>,
) -> Result<String, AppError> {
    let year = local_date(now).year();
    let seq = allocator
        .allocate(&quotation_sequence_key(company_id, year))
        .await?;
    Ok(format_quotation_number(year, seq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn march_belongs_to_previous_financial_year() {
        assert_eq!(financial_year_label(date(2025, 3, 15)), "24-25");
        assert_eq!(financial_year_label(date(2025, 1, 1)), "24-25");
    }

    #[test]
    fn april_starts_a_new_financial_year() {
        assert_eq!(financial_year_label(date(2025, 4, 1)), "25-26");
        assert_eq!(financial_year_label(date(2025, 12, 31)), "25-26");
    }

    #[test]
    fn century_rollover_is_two_digit() {
        assert_eq!(financial_year_label(date(2099, 6, 1)), "99-00");
    }

    #[test]
    fn invoice_number_is_zero_padded() {
        assert_eq!(format_invoice_number(7, "24-25"), "0007-24-25");
        assert_eq!(format_invoice_number(12345, "24-25"), "12345-24-25");
    }

    #[test]
    fn quotation_number_is_not_padded() {
        assert_eq!(format_quotation_number(2025, 3), "QUO-2025-3");
        assert_eq!(quotation_sequence_key("co1", 2025), "quotation-co1-2025");
    }

    #[test]
    fn rollover_uses_indian_date() {
        // 2025-03-31 20:00 UTC is already 1 April in India.
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 20, 0, 0).unwrap();
        assert_eq!(financial_year_label(local_date(now)), "25-26");
    }
}
