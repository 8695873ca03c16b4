//! CGST/SGST vs IGST split.

use rust_decimal::Decimal;
use serde::Serialize;
use service_core::error::AppError;

use super::out_of_range;

const TWO_HUNDRED: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

/// Canonical two-digit GST state code, or `None` for blank input.
///
/// Numeric codes are zero-padded (`"9"` becomes `"09"`); anything else is
/// trimmed and upper-cased so comparisons stay string-based.
pub fn normalize_state_code(raw: &str) -> Option<String> {
    let code = raw.trim();
    if code.is_empty() {
        return None;
    }
    if code.len() < 2 && code.chars().all(|c| c.is_ascii_digit()) {
        return Some(format!("{:0>2}", code));
    }
    Some(code.to_ascii_uppercase())
}

/// State code encoded in the first two digits of a GSTIN.
pub fn state_code_from_gstin(gstin: &str) -> Option<String> {
    let prefix: String = gstin.trim().chars().take(2).collect();
    if prefix.len() == 2 && prefix.chars().all(|c| c.is_ascii_digit()) {
        Some(prefix)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SupplyKind {
    IntraState,
    InterState,
}

impl SupplyKind {
    /// Intra-state only when both codes are present and equal after normalisation.
    pub fn classify(seller_state_code: Option<&str>, dest_state_code: Option<&str>) -> Self {
        let seller = seller_state_code.and_then(normalize_state_code);
        let dest = dest_state_code.and_then(normalize_state_code);
        match (seller, dest) {
            (Some(s), Some(d)) if s == d => SupplyKind::IntraState,
            _ => SupplyKind::InterState,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSplit {
    pub cgst_rate: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_rate: Decimal,
    pub sgst_amount: Decimal,
    pub igst_rate: Decimal,
    pub igst_amount: Decimal,
}

/// Split `gst_rate_percent` on `taxable_value` into CGST+SGST or IGST.
///
/// Amounts are not rounded here; rounding happens only when totals are shown or spelled out.
/// A taxable value too large to multiply by the rate is a 400.
pub fn split_tax(
    seller_state_code: Option<&str>,
    dest_state_code: Option<&str>,
    taxable_value: Decimal,
    gst_rate_percent: Decimal,
) -> Result<TaxSplit, AppError> {
    if gst_rate_percent.is_zero() || taxable_value.is_zero() {
        return Ok(TaxSplit::default());
    }
    let scaled = taxable_value
        .checked_mul(gst_rate_percent)
        .ok_or_else(out_of_range)?;

    Ok(match SupplyKind::classify(seller_state_code, dest_state_code) {
        SupplyKind::IntraState => {
            let half_rate = gst_rate_percent / Decimal::TWO;
            let half_amount = scaled / TWO_HUNDRED;
            TaxSplit {
                cgst_rate: half_rate,
                cgst_amount: half_amount,
                sgst_rate: half_rate,
                sgst_amount: half_amount,
                ..TaxSplit::default()
            }
        }
        SupplyKind::InterState => TaxSplit {
            igst_rate: gst_rate_percent,
            igst_amount: scaled / Decimal::ONE_HUNDRED,
            ..TaxSplit::default()
        },
    })
}
