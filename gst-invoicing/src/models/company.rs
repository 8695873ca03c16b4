//! Company (seller) profile model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PartySnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub account_name: String,
    pub account_number: String,
    pub ifsc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// The tenant's own profile. One document per tenant, keyed by `companyId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(rename = "_id")]
    pub company_id: String,
    #[serde(flatten)]
    pub profile: PartySnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankDetails>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Seller snapshot with the state code resolved from the GSTIN when absent.
    pub fn seller_snapshot(&self) -> PartySnapshot {
        let mut snapshot = self.profile.clone();
        snapshot.state_code = self.profile.effective_state_code();
        snapshot
    }
}
