use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use service_core::error::AppError;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{parse_enum, CustomerRef, Pagination};
use crate::models::{QuotationColumn, QuotationFilter, QuotationStatus};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuotationRequest {
    #[serde(default)]
    pub customer: CustomerRef,
    #[serde(default)]
    pub quotation_date: Option<NaiveDate>,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    #[serde(default)]
    pub columns: Vec<QuotationColumn>,
    #[serde(default)]
    pub rows: Vec<BTreeMap<String, Value>>,
    #[serde(default)]
    pub total_override: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub terms: Option<String>,
}

/// Partial quotation edit. Sending `rows` or `columns` recomputes row totals.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuotationRequest {
    #[serde(default)]
    pub customer: CustomerRef,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    #[serde(default)]
    pub columns: Option<Vec<QuotationColumn>>,
    #[serde(default)]
    pub rows: Option<Vec<BTreeMap<String, Value>>>,
    /// `null` clears the override; absence keeps it.
    #[serde(default, deserialize_with = "double_option")]
    pub total_override: Option<Option<Decimal>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub terms: Option<String>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Decimal>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Decimal>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationListParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub sort: Option<String>,
    pub status: Option<String>,
    pub customer_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl QuotationListParams {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            sort: self.sort.clone(),
        }
    }

    pub fn filter(&self) -> Result<QuotationFilter, AppError> {
        Ok(QuotationFilter {
            status: parse_enum::<QuotationStatus>(self.status.as_deref())?,
            customer_id: self.customer_id,
            from: self.from,
            to: self.to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn total_override_distinguishes_null_from_absent() {
        let absent: UpdateQuotationRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.total_override, None);

        let cleared: UpdateQuotationRequest =
            serde_json::from_value(json!({ "totalOverride": null })).unwrap();
        assert_eq!(cleared.total_override, Some(None));

        let set: UpdateQuotationRequest =
            serde_json::from_value(json!({ "totalOverride": 1500.5 })).unwrap();
        assert_eq!(set.total_override, Some(Some(dec!(1500.5))));
    }
}
