//! Denormalised party snapshots embedded in invoices and quotations.

use serde::{Deserialize, Serialize};

use crate::engine::tax::{normalize_state_code, state_code_from_gstin};

/// Point-in-time copy of a seller, buyer or ship-to party.
///
/// Snapshots are written when a document is created or edited and are never
/// re-derived from the live company/customer record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gstin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

fn pick(over: &Option<String>, base: &Option<String>) -> Option<String> {
    match over {
        Some(v) if !v.trim().is_empty() => Some(v.clone()),
        _ => base.clone(),
    }
}

impl PartySnapshot {
    /// Field-by-field overlay: non-empty fields of `self` win, the rest come from `base`.
    pub fn merged_over(&self, base: &PartySnapshot) -> PartySnapshot {
        PartySnapshot {
            name: pick(&self.name, &base.name),
            gstin: pick(&self.gstin, &base.gstin),
            state_code: pick(&self.state_code, &base.state_code),
            state: pick(&self.state, &base.state),
            address: pick(&self.address, &base.address),
            city: pick(&self.city, &base.city),
            pincode: pick(&self.pincode, &base.pincode),
            phone: pick(&self.phone, &base.phone),
            email: pick(&self.email, &base.email),
        }
    }

    /// GST state code: the explicit code when present, else the GSTIN prefix.
    pub fn effective_state_code(&self) -> Option<String> {
        self.state_code
            .as_deref()
            .and_then(normalize_state_code)
            .or_else(|| self.gstin.as_deref().and_then(state_code_from_gstin))
    }

    pub fn is_empty(&self) -> bool {
        *self == PartySnapshot::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buyer() -> PartySnapshot {
        PartySnapshot {
            name: Some("Acme Traders".to_string()),
            gstin: Some("27AAAPL1234C1ZV".to_string()),
            city: Some("Pune".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn ship_to_defaults_field_by_field() {
        let ship_to = PartySnapshot {
            city: Some("Mumbai".to_string()),
            address: Some("".to_string()),
            ..Default::default()
        };

        let merged = ship_to.merged_over(&buyer());
        assert_eq!(merged.name.as_deref(), Some("Acme Traders"));
        assert_eq!(merged.city.as_deref(), Some("Mumbai"));
        assert_eq!(merged.address, None);
    }

    #[test]
    fn state_code_falls_back_to_gstin_prefix() {
        assert_eq!(buyer().effective_state_code().as_deref(), Some("27"));

        let explicit = PartySnapshot {
            state_code: Some("9".to_string()),
            ..buyer()
        };
        assert_eq!(explicit.effective_state_code().as_deref(), Some("09"));
    }
}
