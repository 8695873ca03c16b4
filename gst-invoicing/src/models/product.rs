//! Product catalog model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub company_id: String,
    pub name: String,
    #[serde(default)]
    pub hsn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gst_rate: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Missing price/tax fields to copy onto an existing product from an invoice line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductBackfill {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_rate: Option<Decimal>,
}

impl ProductBackfill {
    pub fn is_empty(&self) -> bool {
        *self == ProductBackfill::default()
    }
}

impl Product {
    pub fn new(company_id: &str, name: &str, hsn: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_id: company_id.to_string(),
            name: name.trim().to_string(),
            hsn: hsn.trim().to_string(),
            unit: None,
            purchase_price: None,
            sell_price: None,
            gst_rate: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fields this product lacks that a line can supply. Existing values are never overwritten.
    pub fn backfill_from(
        &self,
        hsn: &str,
        unit: Option<&str>,
        rate: Decimal,
        gst_rate: Decimal,
    ) -> ProductBackfill {
        ProductBackfill {
            hsn: (self.hsn.is_empty() && !hsn.trim().is_empty()).then(|| hsn.trim().to_string()),
            unit: match (&self.unit, unit) {
                (None, Some(u)) if !u.trim().is_empty() => Some(u.trim().to_string()),
                _ => None,
            },
            purchase_price: self.purchase_price.is_none().then_some(rate),
            sell_price: self.sell_price.is_none().then_some(rate),
            gst_rate: self.gst_rate.is_none().then_some(gst_rate),
        }
    }

    pub fn apply_backfill(&mut self, backfill: &ProductBackfill) {
        if let Some(hsn) = &backfill.hsn {
            self.hsn = hsn.clone();
        }
        if let Some(unit) = &backfill.unit {
            self.unit = Some(unit.clone());
        }
        if backfill.purchase_price.is_some() {
            self.purchase_price = backfill.purchase_price;
        }
        if backfill.sell_price.is_some() {
            self.sell_price = backfill.sell_price;
        }
        if backfill.gst_rate.is_some() {
            self.gst_rate = backfill.gst_rate;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn backfill_keeps_existing_prices() {
        let mut product = Product::new("co1", "Steel Rod", "7214");
        product.sell_price = Some(dec!(120));

        let backfill = product.backfill_from("9999", Some("kg"), dec!(100), dec!(18));
        assert_eq!(backfill.hsn, None);
        assert_eq!(backfill.unit.as_deref(), Some("kg"));
        assert_eq!(backfill.sell_price, None);
        assert_eq!(backfill.purchase_price, Some(dec!(100)));
        assert_eq!(backfill.gst_rate, Some(dec!(18)));

        product.apply_backfill(&backfill);
        assert_eq!(product.sell_price, Some(dec!(120)));
        assert_eq!(product.purchase_price, Some(dec!(100)));
    }

    #[test]
    fn complete_product_needs_no_backfill() {
        let mut product = Product::new("co1", "Steel Rod", "7214");
        product.unit = Some("kg".to_string());
        product.purchase_price = Some(dec!(90));
        product.sell_price = Some(dec!(120));
        product.gst_rate = Some(dec!(18));

        assert!(product
            .backfill_from("7214", Some("kg"), dec!(100), dec!(12))
            .is_empty());
    }
}
