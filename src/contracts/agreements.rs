//! Agreement status synchronization.
//!
//! Retrieves all contract agreements from the connector and distills the
//! set of asset ids that already carry one. Local assets are implicitly
//! agreed (the owning party needs no agreement with itself); federated
//! assets are agreed iff their id appears in the set. Best-effort by
//! contract: callers absorb a failed sync and keep the previous flags.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::client::ConnectorApi;
use crate::error::Result;
use crate::extract;
use crate::model::Asset;

/// Flat candidate fields carrying the agreement's target asset id.
const ASSET_ID_KEYS: &[&str] = &[
    "assetId",
    "edc:assetId",
    "https://w3id.org/edc/v0.0.1/ns/assetId",
];

/// Nested encodings: an `asset` node as plain string or tagged object.
const ASSET_NODE_KEYS: &[&str] = &["asset", "edc:asset"];

#[derive(Clone)]
pub struct AgreementSync {
    api: Arc<dyn ConnectorApi>,
}

impl AgreementSync {
    pub fn new(api: Arc<dyn ConnectorApi>) -> Self {
        Self { api }
    }

    /// Distinct asset ids that already have a contract agreement.
    pub async fn agreed_asset_ids(&self) -> Result<HashSet<String>> {
        let agreements = self.api.list_agreements().await?;
        let mut ids = HashSet::new();
        for agreement in &agreements {
            if let Some(id) = agreement_asset_id(agreement) {
                ids.insert(id);
            }
        }
        debug!(count = ids.len(), "loaded agreed asset ids");
        Ok(ids)
    }
}

/// Target asset id of one agreement record, trying flat string fields
/// first, then the nested asset-node encodings.
pub fn agreement_asset_id(agreement: &Value) -> Option<String> {
    let direct = extract::string_field(agreement, ASSET_ID_KEYS);
    if !direct.is_empty() {
        return Some(direct);
    }
    for key in ASSET_NODE_KEYS {
        if let Some(node) = agreement.get(key) {
            if let Some(id) = extract::identifier_of(node, &["@id", "id", "assetId"]) {
                return Some(id);
            }
        }
    }
    None
}

/// Re-derive agreement flags across a full asset list.
pub fn apply_agreement_flags(assets: &mut [Asset], agreed: &HashSet<String>) {
    for asset in assets.iter_mut() {
        let has_agreement = asset.is_local() || agreed.contains(&asset.id);
        asset.has_agreement = has_agreement;
        for offer in asset.contract_offers.iter_mut() {
            offer.has_agreement = has_agreement;
        }
    }
}
