//! Customer catalog model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PartySnapshot;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub company_id: String,
    #[serde(flatten)]
    pub details: PartySnapshot,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(company_id: &str, details: PartySnapshot) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_id: company_id.to_string(),
            details,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn snapshot(&self) -> PartySnapshot {
        let mut snapshot = self.details.clone();
        snapshot.state_code = self.details.effective_state_code();
        snapshot
    }
}

/// Contact fields used to match an inline customer against the catalog.
#[derive(Debug, Clone, Default)]
pub struct CustomerMatch {
    pub gstin: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CustomerMatch {
    pub fn from_snapshot(snapshot: &PartySnapshot) -> Self {
        fn non_empty(v: &Option<String>) -> Option<String> {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }

        Self {
            gstin: non_empty(&snapshot.gstin).map(|g| g.to_uppercase()),
            email: non_empty(&snapshot.email).map(|e| e.to_lowercase()),
            phone: non_empty(&snapshot.phone),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gstin.is_none() && self.email.is_none() && self.phone.is_none()
    }
}
