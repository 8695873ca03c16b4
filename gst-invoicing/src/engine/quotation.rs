//! Row and overall totals for quotations with tenant-defined columns.

use rust_decimal::Decimal;
use serde_json::Value;
use service_core::error::AppError;
use std::collections::BTreeMap;
use std::str::FromStr;

use super::out_of_range;
use super::summary::checked_total;
use crate::models::{ColumnType, QuotationColumn, QuotationRow};

/// Numeric reading of a cell: JSON numbers and numeric strings count, everything else does not.
pub fn cell_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn first_amount(values: &BTreeMap<String, Value>, keys: &[&str]) -> Option<Decimal> {
    keys.iter()
        .find_map(|k| values.get(*k).and_then(cell_amount))
}

/// Row total: explicit `total` cell, else `quantity × rate`, else the sum of currency columns.
pub fn row_total(
    columns: &[QuotationColumn],
    values: &BTreeMap<String, Value>,
) -> Result<Decimal, AppError> {
    if let Some(total) = first_amount(values, &["total", "amount"]) {
        return Ok(total);
    }

    let quantity = first_amount(values, &["quantity", "qty"]);
    let rate = first_amount(values, &["rate", "price", "unitPrice"]);
    if let (Some(quantity), Some(rate)) = (quantity, rate) {
        return quantity.checked_mul(rate).ok_or_else(out_of_range);
    }

    columns
        .iter()
        .filter(|c| c.column_type == ColumnType::Currency)
        .filter_map(|c| values.get(&c.key).and_then(cell_amount))
        .try_fold(Decimal::ZERO, checked_total)
}

pub fn build_rows(
    columns: &[QuotationColumn],
    rows: Vec<BTreeMap<String, Value>>,
) -> Result<Vec<QuotationRow>, AppError> {
    rows.into_iter()
        .map(|values| -> Result<QuotationRow, AppError> {
            Ok(QuotationRow {
                total: row_total(columns, &values)?,
                values,
            })
        })
        .collect()
}

/// The override when supplied, otherwise the sum of row totals.
pub fn quotation_total(
    rows: &[QuotationRow],
    total_override: Option<Decimal>,
) -> Result<Decimal, AppError> {
    match total_override {
        Some(total) => Ok(total),
        None => rows
            .iter()
            .map(|r| r.total)
            .try_fold(Decimal::ZERO, checked_total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn columns() -> Vec<QuotationColumn> {
        vec![
            QuotationColumn {
                key: "item".to_string(),
                label: "Item".to_string(),
                column_type: ColumnType::Text,
            },
            QuotationColumn {
                key: "install".to_string(),
                label: "Installation".to_string(),
                column_type: ColumnType::Currency,
            },
            QuotationColumn {
                key: "material".to_string(),
                label: "Material".to_string(),
                column_type: ColumnType::Currency,
            },
        ]
    }

    fn row(value: Value) -> BTreeMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn explicit_total_wins() {
        let values = row(json!({ "total": 750, "qty": 2, "rate": 100 }));
        assert_eq!(row_total(&columns(), &values).unwrap(), dec!(750));
    }

    #[test]
    fn quantity_times_rate() {
        let values = row(json!({ "item": "Panel", "qty": "3", "rate": 1250.5 }));
        assert_eq!(row_total(&columns(), &values).unwrap(), dec!(3751.5));
    }

    #[test]
    fn currency_columns_are_summed() {
        let values = row(json!({ "item": "Panel", "install": 500, "material": "1200.25" }));
        assert_eq!(row_total(&columns(), &values).unwrap(), dec!(1700.25));
    }

    #[test]
    fn non_numeric_cells_are_ignored() {
        let values = row(json!({ "install": "n/a", "material": null }));
        assert_eq!(row_total(&columns(), &values).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn override_replaces_sum() {
        let rows = build_rows(
            &columns(),
            vec![row(json!({ "install": 100 })), row(json!({ "material": 50 }))],
        )
        .unwrap();
        assert_eq!(quotation_total(&rows, None).unwrap(), dec!(150));
        assert_eq!(quotation_total(&rows, Some(dec!(140))).unwrap(), dec!(140));
    }

    #[test]
    fn oversized_row_is_rejected() {
        let huge = Decimal::MAX.to_string();
        let values = row(json!({ "qty": huge, "rate": "10" }));
        assert!(matches!(
            row_total(&columns(), &values),
            Err(AppError::BadRequest(_))
        ));

        let values = row(json!({ "install": huge, "material": huge }));
        assert!(row_total(&columns(), &values).is_err());
    }
}
