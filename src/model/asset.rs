//! Unified asset representation.
//!
//! One `Asset` covers both self-hosted records and federated catalog
//! datasets. Identity for deduplication is `(id, origin)` - the same id may
//! legitimately appear once per origin and the two records are never merged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where an asset record was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetOrigin {
    /// Self-hosted on this party's connector.
    Local,
    /// Discovered through the remote federated catalog.
    Federated,
}

impl AssetOrigin {
    /// User-facing label, also used as the filter vocabulary.
    pub fn label(&self) -> &'static str {
        match self {
            AssetOrigin::Local => "Local Asset",
            AssetOrigin::Federated => "External Asset",
        }
    }
}

impl std::fmt::Display for AssetOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Unified view of one data asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub short_description: String,
    pub content_type: String,
    pub byte_size: String,
    pub format: String,
    pub keywords: Vec<String>,
    pub tasks: Vec<String>,
    pub subtasks: Vec<String>,
    pub algorithms: Vec<String>,
    pub libraries: Vec<String>,
    pub frameworks: Vec<String>,
    /// Canonical storage-backend label, see `catalog::canonical_storage_type`.
    pub storage_type: String,
    pub participant_id: String,
    pub origin: AssetOrigin,
    pub has_agreement: bool,
    pub negotiation_in_progress: bool,
    pub contract_offers: Vec<ContractOffer>,
    /// Raw source document, retained for detail views.
    pub properties: Value,
}

impl Asset {
    /// Deduplication key: the same id may appear once per origin.
    pub fn key(&self) -> (String, AssetOrigin) {
        (self.id.clone(), self.origin)
    }

    pub fn is_local(&self) -> bool {
        self.origin == AssetOrigin::Local
    }
}

/// A policy-bound proposal to contract over a specific asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractOffer {
    pub offer_id: String,
    pub contract_id: String,
    /// Empty until resolved (directly from the offer or via a matching
    /// contract definition).
    pub access_policy_id: String,
    pub contract_policy_id: String,
    pub access_policy: Value,
    pub contract_policy: Value,
    pub has_agreement: bool,
    pub negotiation_in_progress: bool,
}

impl ContractOffer {
    /// True iff both policy identifiers are non-empty.
    pub fn policy_ids_resolved(&self) -> bool {
        !self.access_policy_id.is_empty() && !self.contract_policy_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn asset(id: &str, origin: AssetOrigin) -> Asset {
        Asset {
            id: id.to_string(),
            name: id.to_string(),
            version: String::new(),
            description: String::new(),
            short_description: String::new(),
            content_type: String::new(),
            byte_size: String::new(),
            format: String::new(),
            keywords: vec![],
            tasks: vec![],
            subtasks: vec![],
            algorithms: vec![],
            libraries: vec![],
            frameworks: vec![],
            storage_type: String::new(),
            participant_id: String::new(),
            origin,
            has_agreement: false,
            negotiation_in_progress: false,
            contract_offers: vec![],
            properties: json!({}),
        }
    }

    #[test]
    fn key_includes_origin() {
        let local = asset("X", AssetOrigin::Local);
        let federated = asset("X", AssetOrigin::Federated);
        assert_ne!(local.key(), federated.key());
    }

    #[test]
    fn policy_ids_resolved_requires_both() {
        let mut offer = ContractOffer {
            offer_id: "o".into(),
            contract_id: "c".into(),
            access_policy_id: "ap".into(),
            contract_policy_id: String::new(),
            access_policy: json!({}),
            contract_policy: json!({}),
            has_agreement: false,
            negotiation_in_progress: false,
        };
        assert!(!offer.policy_ids_resolved());
        offer.contract_policy_id = "cp".into();
        assert!(offer.policy_ids_resolved());
    }
}
