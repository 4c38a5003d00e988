//! Policy-id resolution for contract offers.
//!
//! Federated offers often omit the access/contract policy ids. The
//! provider-side contract definitions still carry them, so this module
//! matches each asset against the definitions' selectors and fills in the
//! missing ids from the first definition whose selector covers the asset.
//! Already-present ids are never overwritten. Resolution is cosmetic by
//! contract: a failed definition fetch leaves the offers untouched.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::client::ConnectorApi;
use crate::model::{Asset, ContractDefinition, ASSET_ID_PROPERTY};

/// True iff the criterion is a membership predicate over the canonical
/// asset-id property whose right operand contains `asset_id`.
pub fn criterion_matches_asset(criterion: &crate::model::Criterion, asset_id: &str) -> bool {
    if criterion.operand_left != ASSET_ID_PROPERTY {
        return false;
    }
    if criterion.operator.to_lowercase() != "in" {
        return false;
    }
    criterion
        .operand_right
        .iter()
        .any(|entry| operand_value(entry).is_some_and(|v| v == asset_id))
}

/// Identifier carried by one right-operand entry, plain or tagged.
fn operand_value(entry: &Value) -> Option<&str> {
    match entry {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => ["@value", "@id", "id"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str)),
        _ => None,
    }
}

/// True iff any selector criterion covers the asset. An empty selector
/// covers nothing here: unrestricted definitions are not used to source
/// policy ids for specific assets.
pub fn definition_matches_asset(definition: &ContractDefinition, asset_id: &str) -> bool {
    definition
        .assets_selector
        .iter()
        .any(|criterion| criterion_matches_asset(criterion, asset_id))
}

/// Fill missing policy ids on the asset's offers from the first matching
/// definition. Returns true when anything changed.
pub fn resolve_policy_ids(asset: &mut Asset, definitions: &[ContractDefinition]) -> bool {
    let matching = definitions
        .iter()
        .find(|def| definition_matches_asset(def, &asset.id));
    let Some(definition) = matching else {
        return false;
    };
    let mut changed = false;
    for offer in asset.contract_offers.iter_mut() {
        if offer.access_policy_id.is_empty() && !definition.access_policy_id.is_empty() {
            offer.access_policy_id = definition.access_policy_id.clone();
            changed = true;
        }
        if offer.contract_policy_id.is_empty() && !definition.contract_policy_id.is_empty() {
            offer.contract_policy_id = definition.contract_policy_id.clone();
            changed = true;
        }
    }
    changed
}

#[derive(Clone)]
pub struct PolicyResolver {
    api: Arc<dyn ConnectorApi>,
}

impl PolicyResolver {
    pub fn new(api: Arc<dyn ConnectorApi>) -> Self {
        Self { api }
    }

    /// Resolve missing policy ids across the whole asset list.
    pub async fn enrich(&self, assets: &mut [Asset]) {
        let definitions = match self.api.list_contract_definitions().await {
            Ok(raw) => raw
                .iter()
                .map(ContractDefinition::from_value)
                .collect::<Vec<_>>(),
            Err(e) => {
                debug!(error = %e, "contract definitions unavailable, offers keep raw policy ids");
                return;
            }
        };
        let mut resolved = 0usize;
        for asset in assets.iter_mut() {
            if resolve_policy_ids(asset, &definitions) {
                resolved += 1;
            }
        }
        if resolved > 0 {
            debug!(resolved, "policy ids resolved from contract definitions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::normalize_dataset;
    use crate::client::testing::FakeConnector;
    use crate::model::{asset_selector, Criterion};
    use serde_json::json;

    fn definition(id: &str, assets: &[&str]) -> ContractDefinition {
        ContractDefinition {
            id: id.to_string(),
            access_policy_id: format!("{id}-access"),
            contract_policy_id: format!("{id}-contract"),
            assets_selector: asset_selector(
                &assets.iter().map(|a| a.to_string()).collect::<Vec<_>>(),
            ),
        }
    }

    #[test]
    fn criterion_matching_requires_property_operator_and_membership() {
        let criterion = Criterion {
            operand_left: ASSET_ID_PROPERTY.to_string(),
            operator: "IN".to_string(),
            operand_right: vec![json!("a"), json!({ "@value": "b" }), json!({ "id": "c" })],
        };
        assert!(criterion_matches_asset(&criterion, "a"));
        assert!(criterion_matches_asset(&criterion, "b"));
        assert!(criterion_matches_asset(&criterion, "c"));
        assert!(!criterion_matches_asset(&criterion, "d"));

        let wrong_property = Criterion {
            operand_left: "type".to_string(),
            ..criterion.clone()
        };
        assert!(!criterion_matches_asset(&wrong_property, "a"));

        let wrong_operator = Criterion {
            operator: "eq".to_string(),
            ..criterion
        };
        assert!(!criterion_matches_asset(&wrong_operator, "a"));
    }

    #[test]
    fn first_matching_definition_wins_and_fills_only_gaps() {
        let mut asset = normalize_dataset(&json!({
            "@id": "A",
            "odrl:hasPolicy": { "@id": "offer-1" }
        }));
        asset.contract_offers[0].contract_policy_id = "kept".to_string();
        let definitions = vec![definition("d1", &["A"]), definition("d2", &["A"])];
        assert!(resolve_policy_ids(&mut asset, &definitions));
        assert_eq!(asset.contract_offers[0].access_policy_id, "d1-access");
        assert_eq!(asset.contract_offers[0].contract_policy_id, "kept");
    }

    #[test]
    fn no_matching_definition_changes_nothing() {
        let mut asset = normalize_dataset(&json!({
            "@id": "A",
            "odrl:hasPolicy": { "@id": "offer-1" }
        }));
        assert!(!resolve_policy_ids(&mut asset, &[definition("d1", &["B"])]));
        assert!(asset.contract_offers[0].access_policy_id.is_empty());
    }

    #[tokio::test]
    async fn enrich_with_no_definitions_changes_nothing() {
        let api = Arc::new(FakeConnector::default());
        let mut assets = vec![normalize_dataset(&json!({
            "@id": "A",
            "odrl:hasPolicy": { "@id": "offer-1" }
        }))];
        PolicyResolver::new(api).enrich(&mut assets).await;
        assert!(assets[0].contract_offers[0].access_policy_id.is_empty());
    }

    #[tokio::test]
    async fn enrich_resolves_from_listed_definitions() {
        let api = Arc::new(FakeConnector {
            definitions: vec![json!({
                "@id": "prov~1",
                "accessPolicyId": "open-access",
                "contractPolicyId": "open-contract",
                "assetsSelector": {
                    "operandLeft": ASSET_ID_PROPERTY,
                    "operator": "in",
                    "operandRight": "A"
                }
            })],
            ..Default::default()
        });
        let mut assets = vec![normalize_dataset(&json!({
            "@id": "A",
            "odrl:hasPolicy": { "@id": "offer-1" }
        }))];
        PolicyResolver::new(api).enrich(&mut assets).await;
        assert_eq!(assets[0].contract_offers[0].access_policy_id, "open-access");
        assert_eq!(
            assets[0].contract_offers[0].contract_policy_id,
            "open-contract"
        );
    }
}
