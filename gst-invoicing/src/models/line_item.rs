//! Line item models: the raw shape clients send and the enriched shape persisted on invoices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("must_be_non_negative"));
    }
    Ok(())
}

fn percentage(value: &Decimal) -> Result<(), ValidationError> {
    non_negative(value)?;
    if *value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::new("must_be_at_most_100"));
    }
    Ok(())
}

/// A line item as supplied by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub hsn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[validate(custom(function = "non_negative"))]
    pub quantity: Decimal,
    #[validate(custom(function = "non_negative"))]
    pub rate: Decimal,
    /// Absolute discount, ignored when `discount_pct` is positive.
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub discount: Decimal,
    #[serde(default)]
    #[validate(custom(function = "percentage"))]
    pub discount_pct: Decimal,
    /// Combined GST percentage, split into CGST+SGST or IGST per line.
    #[serde(default)]
    #[validate(custom(function = "percentage"))]
    pub gst_rate: Decimal,
}

/// A line item after discount resolution and tax split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<Uuid>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub hsn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub discount: Decimal,
    pub discount_pct: Decimal,
    pub discount_amount: Decimal,
    pub taxable_value: Decimal,
    pub cgst_rate: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_rate: Decimal,
    pub sgst_amount: Decimal,
    pub igst_rate: Decimal,
    pub igst_amount: Decimal,
    pub total: Decimal,
}

/// One row of the HSN-wise tax summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HsnSummaryRow {
    pub hsn: String,
    pub cgst_rate: Decimal,
    pub sgst_rate: Decimal,
    pub igst_rate: Decimal,
    pub taxable_value: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub igst_amount: Decimal,
    pub total: Decimal,
}

/// Anything that can be folded into an HSN summary.
pub trait TaxableLine {
    fn hsn(&self) -> &str;
    fn cgst_rate(&self) -> Decimal;
    fn sgst_rate(&self) -> Decimal;
    fn igst_rate(&self) -> Decimal;
    fn taxable_value(&self) -> Decimal;
    fn cgst_amount(&self) -> Decimal;
    fn sgst_amount(&self) -> Decimal;
    fn igst_amount(&self) -> Decimal;
    fn total(&self) -> Decimal;
}

macro_rules! impl_taxable_line {
    ($ty:ty) => {
        impl TaxableLine for $ty {
            fn hsn(&self) -> &str {
                &self.hsn
            }
            fn cgst_rate(&self) -> Decimal {
                self.cgst_rate
            }
            fn sgst_rate(&self) -> Decimal {
                self.sgst_rate
            }
            fn igst_rate(&self) -> Decimal {
                self.igst_rate
            }
            fn taxable_value(&self) -> Decimal {
                self.taxable_value
            }
            fn cgst_amount(&self) -> Decimal {
                self.cgst_amount
            }
            fn sgst_amount(&self) -> Decimal {
                self.sgst_amount
            }
            fn igst_amount(&self) -> Decimal {
                self.igst_amount
            }
            fn total(&self) -> Decimal {
                self.total
            }
        }
    };
}

impl_taxable_line!(LineItem);
impl_taxable_line!(HsnSummaryRow);

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input() -> LineItemInput {
        LineItemInput {
            name: "Cement bag".to_string(),
            quantity: dec!(10),
            rate: dec!(350),
            gst_rate: dec!(28),
            ..Default::default()
        }
    }

    #[test]
    fn valid_line_passes() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let line = LineItemInput {
            quantity: dec!(-1),
            ..input()
        };
        assert!(line.validate().is_err());
    }

    #[test]
    fn gst_rate_above_hundred_is_rejected() {
        let line = LineItemInput {
            gst_rate: dec!(101),
            ..input()
        };
        assert!(line.validate().is_err());
    }

    #[test]
    fn empty_name_is_rejected() {
        let line = LineItemInput {
            name: String::new(),
            ..input()
        };
        assert!(line.validate().is_err());
    }
}
