//! Invoice totals and the HSN-wise tax summary.

use rust_decimal::{Decimal, RoundingStrategy};
use service_core::error::AppError;

use crate::models::{HsnSummaryRow, InvoiceTotals, TaxableLine};

/// Round to paise, half away from zero.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `a + b`, or a 400 when the sum leaves the decimal range.
pub fn checked_total(a: Decimal, b: Decimal) -> Result<Decimal, AppError> {
    a.checked_add(b)
        .ok_or_else(|| AppError::bad_request("Total amount out of range"))
}

pub fn invoice_totals<L: TaxableLine>(lines: &[L]) -> Result<InvoiceTotals, AppError> {
    let mut totals = InvoiceTotals::default();
    for line in lines {
        totals.taxable_value = checked_total(totals.taxable_value, line.taxable_value())?;
        totals.total_cgst = checked_total(totals.total_cgst, line.cgst_amount())?;
        totals.total_sgst = checked_total(totals.total_sgst, line.sgst_amount())?;
        totals.total_igst = checked_total(totals.total_igst, line.igst_amount())?;
    }
    totals.total_tax = checked_total(
        checked_total(totals.total_cgst, totals.total_sgst)?,
        totals.total_igst,
    )?;
    totals.grand_total = checked_total(totals.taxable_value, totals.total_tax)?;
    Ok(totals)
}

/// Group lines by `(hsn, cgstRate, sgstRate, igstRate)`, keeping first-seen order.
///
/// Feeding the output back in reproduces it unchanged.
pub fn hsn_summary<L: TaxableLine>(lines: &[L]) -> Result<Vec<HsnSummaryRow>, AppError> {
    let mut rows: Vec<HsnSummaryRow> = Vec::new();
    for line in lines {
        let existing = rows.iter_mut().find(|row| {
            row.hsn == line.hsn()
                && row.cgst_rate == line.cgst_rate()
                && row.sgst_rate == line.sgst_rate()
                && row.igst_rate == line.igst_rate()
        });
        match existing {
            Some(row) => {
                row.taxable_value = checked_total(row.taxable_value, line.taxable_value())?;
                row.cgst_amount = checked_total(row.cgst_amount, line.cgst_amount())?;
                row.sgst_amount = checked_total(row.sgst_amount, line.sgst_amount())?;
                row.igst_amount = checked_total(row.igst_amount, line.igst_amount())?;
                row.total = checked_total(row.total, line.total())?;
            }
            None => rows.push(HsnSummaryRow {
                hsn: line.hsn().to_string(),
                cgst_rate: line.cgst_rate(),
                sgst_rate: line.sgst_rate(),
                igst_rate: line.igst_rate(),
                taxable_value: line.taxable_value(),
                cgst_amount: line.cgst_amount(),
                sgst_amount: line.sgst_amount(),
                igst_amount: line.igst_amount(),
                total: line.total(),
            }),
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::lines::enrich_line;
    use crate::models::{LineItem, LineItemInput};
    use rust_decimal_macros::dec;

    fn enriched(hsn: &str, qty: Decimal, rate: Decimal, gst: Decimal, dest: &str) -> LineItem {
        let input = LineItemInput {
            name: format!("item-{}", hsn),
            hsn: hsn.to_string(),
            quantity: qty,
            rate,
            gst_rate: gst,
            ..Default::default()
        };
        enrich_line(&input, None, Some("27"), Some(dest)).unwrap()
    }

    fn sample_lines() -> Vec<LineItem> {
        vec![
            enriched("8471", dec!(2), dec!(500), dec!(18), "27"),
            enriched("8471", dec!(1), dec!(250.50), dec!(18), "27"),
            enriched("8471", dec!(1), dec!(100), dec!(12), "27"),
            enriched("9983", dec!(3), dec!(333.33), dec!(5), "27"),
            enriched("", dec!(1), dec!(99.99), Decimal::ZERO, "27"),
        ]
    }

    #[test]
    fn grand_total_equals_taxable_plus_taxes() {
        let totals = invoice_totals(&sample_lines()).unwrap();
        assert_eq!(
            totals.grand_total,
            totals.taxable_value + totals.total_cgst + totals.total_sgst + totals.total_igst
        );
        assert_eq!(totals.total_tax, totals.total_cgst + totals.total_sgst);
        assert_eq!(totals.total_igst, Decimal::ZERO);
    }

    #[test]
    fn summary_groups_by_hsn_and_rates() {
        let summary = hsn_summary(&sample_lines()).unwrap();
        assert_eq!(summary.len(), 4);
        assert_eq!(summary[0].hsn, "8471");
        assert_eq!(summary[0].cgst_rate, dec!(9));
        assert_eq!(summary[0].taxable_value, dec!(1250.50));
        assert_eq!(summary[1].cgst_rate, dec!(6));
    }

    #[test]
    fn summary_matches_line_totals() {
        let lines = sample_lines();
        let from_lines = invoice_totals(&lines).unwrap();
        let from_summary = invoice_totals(&hsn_summary(&lines).unwrap()).unwrap();
        assert_eq!(from_lines, from_summary);
    }

    #[test]
    fn grouping_is_idempotent() {
        let mut lines = sample_lines();
        lines.push(enriched("8471", dec!(1), dec!(10), dec!(18), "29"));
        let once = hsn_summary(&lines).unwrap();
        let twice = hsn_summary(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn overflowing_sum_is_rejected() {
        let mut big = enriched("8471", dec!(1), dec!(1), Decimal::ZERO, "27");
        big.taxable_value = Decimal::MAX;
        big.total = Decimal::MAX;
        let lines = vec![big.clone(), big];

        assert!(matches!(invoice_totals(&lines), Err(AppError::BadRequest(_))));
        assert!(matches!(hsn_summary(&lines), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_currency(dec!(8.335)), dec!(8.34));
        assert_eq!(round_currency(dec!(8.345)), dec!(8.35));
        assert_eq!(round_currency(dec!(1120)), dec!(1120));
    }
}
