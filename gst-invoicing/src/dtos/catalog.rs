use rust_decimal::Decimal;
use serde::Deserialize;
use service_core::error::AppError;
use validator::Validate;

use crate::models::{BankDetails, PartySnapshot};

fn require_name(party: &PartySnapshot, what: &str) -> Result<(), AppError> {
    match party.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Ok(()),
        _ => Err(AppError::bad_request(format!("{} name is required", what))),
    }
}

/// `PUT /company` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRequest {
    #[serde(flatten)]
    pub profile: PartySnapshot,
    #[serde(default)]
    pub pan: Option<String>,
    #[serde(default)]
    pub bank_details: Option<BankDetails>,
}

impl CompanyRequest {
    pub fn check(&self) -> Result<(), AppError> {
        require_name(&self.profile, "Company")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    #[serde(flatten)]
    pub details: PartySnapshot,
}

impl CreateCustomerRequest {
    pub fn check(&self) -> Result<(), AppError> {
        require_name(&self.details, "Customer")
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub hsn: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub purchase_price: Option<Decimal>,
    #[serde(default)]
    pub sell_price: Option<Decimal>,
    #[serde(default)]
    pub gst_rate: Option<Decimal>,
}

impl CreateProductRequest {
    /// Prices must be non-negative and the GST rate a percentage.
    pub fn check(&self) -> Result<(), AppError> {
        let negative = [self.purchase_price, self.sell_price, self.gst_rate]
            .into_iter()
            .flatten()
            .any(|v| v < Decimal::ZERO);
        if negative {
            return Err(AppError::bad_request("Prices and GST rate cannot be negative"));
        }
        if self.gst_rate.is_some_and(|r| r > Decimal::ONE_HUNDRED) {
            return Err(AppError::bad_request("GST rate cannot exceed 100"));
        }
        Ok(())
    }
}
