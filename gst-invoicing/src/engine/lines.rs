//! Line item enrichment and its inverse projection.

use anyhow::anyhow;
use rust_decimal::Decimal;
use service_core::error::AppError;
use uuid::Uuid;

use super::out_of_range;
use super::tax::split_tax;
use crate::models::{LineItem, LineItemInput};

/// Discount in currency. A positive percentage wins over the absolute amount.
pub fn discount_amount(
    gross: Decimal,
    discount: Decimal,
    discount_pct: Decimal,
) -> Result<Decimal, AppError> {
    if discount_pct > Decimal::ZERO {
        let scaled = gross.checked_mul(discount_pct).ok_or_else(out_of_range)?;
        Ok(scaled / Decimal::ONE_HUNDRED)
    } else {
        Ok(discount.max(Decimal::ZERO))
    }
}

/// `max(0, quantity × rate − discount)`.
pub fn taxable_value(input: &LineItemInput) -> Result<Decimal, AppError> {
    let gross = input
        .quantity
        .checked_mul(input.rate)
        .ok_or_else(out_of_range)?;
    let discount = discount_amount(gross, input.discount, input.discount_pct)?;
    // Both operands are non-negative, so the difference cannot overflow.
    Ok((gross - discount).max(Decimal::ZERO))
}

/// Build the persisted line from a raw line and the resolved catalog product.
///
/// Fails with a 400 when the line's amounts exceed the decimal range.
pub fn enrich_line(
    input: &LineItemInput,
    product_id: Option<Uuid>,
    seller_state_code: Option<&str>,
    dest_state_code: Option<&str>,
) -> Result<LineItem, AppError> {
    let gross = input
        .quantity
        .checked_mul(input.rate)
        .ok_or_else(out_of_range)?;
    let discount = discount_amount(gross, input.discount, input.discount_pct)?;
    let taxable = (gross - discount).max(Decimal::ZERO);
    let split = split_tax(seller_state_code, dest_state_code, taxable, input.gst_rate)?;
    let total = split
        .cgst_amount
        .checked_add(split.sgst_amount)
        .and_then(|tax| tax.checked_add(split.igst_amount))
        .and_then(|tax| tax.checked_add(taxable))
        .ok_or_else(out_of_range)?;

    Ok(LineItem {
        product_id,
        name: input.name.trim().to_string(),
        description: input.description.clone(),
        hsn: input.hsn.trim().to_string(),
        unit: input.unit.clone(),
        quantity: input.quantity,
        rate: input.rate,
        discount: input.discount,
        discount_pct: input.discount_pct,
        discount_amount: discount,
        taxable_value: taxable,
        cgst_rate: split.cgst_rate,
        cgst_amount: split.cgst_amount,
        sgst_rate: split.sgst_rate,
        sgst_amount: split.sgst_amount,
        igst_rate: split.igst_rate,
        igst_amount: split.igst_amount,
        total,
    })
}

/// Project a persisted line back to the raw shape so its tax split can be recomputed.
///
/// The GST rate is recovered as `cgstRate + sgstRate + igstRate`. A line carrying both
/// CGST/SGST and IGST rates is corrupt and is refused rather than summed.
pub fn to_raw_line(line: &LineItem) -> Result<LineItemInput, AppError> {
    let has_split = line.cgst_rate > Decimal::ZERO || line.sgst_rate > Decimal::ZERO;
    if has_split && line.igst_rate > Decimal::ZERO {
        return Err(AppError::InternalError(anyhow!(
            "Line item '{}' carries both CGST/SGST and IGST rates",
            line.name
        )));
    }

    Ok(LineItemInput {
        product_id: line.product_id,
        name: line.name.clone(),
        description: line.description.clone(),
        hsn: line.hsn.clone(),
        unit: line.unit.clone(),
        quantity: line.quantity,
        rate: line.rate,
        discount: line.discount,
        discount_pct: line.discount_pct,
        gst_rate: line.cgst_rate + line.sgst_rate + line.igst_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(quantity: Decimal, rate: Decimal, gst_rate: Decimal) -> LineItemInput {
        LineItemInput {
            name: "Widget".to_string(),
            hsn: "8471".to_string(),
            quantity,
            rate,
            gst_rate,
            ..Default::default()
        }
    }

    #[test]
    fn percentage_discount_wins_over_absolute() {
        let input = LineItemInput {
            discount: dec!(5),
            discount_pct: dec!(10),
            ..line(dec!(10), dec!(100), dec!(18))
        };
        assert_eq!(taxable_value(&input).unwrap(), dec!(900));
    }

    #[test]
    fn absolute_discount_applies_without_percentage() {
        let input = LineItemInput {
            discount: dec!(5),
            ..line(dec!(10), dec!(100), dec!(18))
        };
        assert_eq!(taxable_value(&input).unwrap(), dec!(995));
    }

    #[test]
    fn taxable_value_never_goes_negative() {
        let input = LineItemInput {
            discount: dec!(5000),
            ..line(dec!(1), dec!(100), dec!(18))
        };
        assert_eq!(taxable_value(&input).unwrap(), Decimal::ZERO);

        let enriched = enrich_line(&input, None, Some("27"), Some("27")).unwrap();
        assert_eq!(enriched.cgst_amount, Decimal::ZERO);
        assert_eq!(enriched.total, Decimal::ZERO);
    }

    #[test]
    fn enriched_total_includes_tax() {
        let enriched = enrich_line(&line(dec!(2), dec!(500), dec!(12)), None, Some("27"), Some("27")).unwrap();
        assert_eq!(enriched.taxable_value, dec!(1000));
        assert_eq!(enriched.cgst_amount, dec!(60));
        assert_eq!(enriched.sgst_amount, dec!(60));
        assert_eq!(enriched.igst_amount, Decimal::ZERO);
        assert_eq!(enriched.total, dec!(1120));
    }

    #[test]
    fn raw_projection_recovers_gst_rate() {
        let input = LineItemInput {
            product_id: Some(Uuid::new_v4()),
            discount_pct: dec!(5),
            ..line(dec!(3), dec!(250), dec!(18))
        };

        for dest in ["27", "29"] {
            let enriched = enrich_line(&input, input.product_id, Some("27"), Some(dest)).unwrap();
            let raw = to_raw_line(&enriched).unwrap();
            assert_eq!(raw, input);
        }
    }

    #[test]
    fn projection_refuses_mixed_tax_heads() {
        let mut enriched = enrich_line(&line(dec!(1), dec!(100), dec!(18)), None, Some("27"), Some("27")).unwrap();
        enriched.igst_rate = dec!(18);
        assert!(to_raw_line(&enriched).is_err());
    }

    #[test]
    fn oversized_line_is_out_of_range() {
        let huge = line(Decimal::MAX, dec!(2), dec!(18));
        let err = enrich_line(&huge, None, Some("27"), Some("27")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(taxable_value(&huge).is_err());
    }
}
