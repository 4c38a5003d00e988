//! Contract definitions and asset selectors.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::extract;

/// Canonical asset-identifier property used in selector predicates.
pub const ASSET_ID_PROPERTY: &str = "https://w3id.org/edc/v0.0.1/ns/id";

/// One selector predicate: `(operand_left, operator, operand_right)`.
///
/// The right operand set may carry plain strings or tagged objects exposing
/// the identifier under `@value`/`@id`/`id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criterion {
    pub operand_left: String,
    pub operator: String,
    pub operand_right: Vec<Value>,
}

impl Criterion {
    /// Read a criterion from a raw selector entry, trying plain and
    /// `edc:`-prefixed spellings.
    pub fn from_value(doc: &Value) -> Self {
        Criterion {
            operand_left: extract::string_field(doc, &["operandLeft", "edc:operandLeft"]),
            operator: extract::string_field(doc, &["operator", "edc:operator"]),
            operand_right: extract::value_list(doc, &["operandRight", "edc:operandRight"]),
        }
    }

    fn to_value(&self) -> Value {
        json!({
            "operandLeft": self.operand_left,
            "operator": self.operator,
            "operandRight": self.operand_right,
        })
    }
}

/// A provider-side rule binding an access policy and contract policy to a
/// set of assets via selector predicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractDefinition {
    pub id: String,
    pub access_policy_id: String,
    pub contract_policy_id: String,
    pub assets_selector: Vec<Criterion>,
}

impl ContractDefinition {
    /// Read a definition from a raw management-API record.
    pub fn from_value(doc: &Value) -> Self {
        let selector = extract::value_list(doc, &["assetsSelector", "edc:assetsSelector"]);
        ContractDefinition {
            id: extract::string_field(doc, &["@id", "id"]),
            access_policy_id: extract::string_field(doc, &["accessPolicyId", "edc:accessPolicyId"]),
            contract_policy_id: extract::string_field(
                doc,
                &["contractPolicyId", "edc:contractPolicyId"],
            ),
            assets_selector: selector.iter().map(Criterion::from_value).collect(),
        }
    }

    /// Creation request body for the management API.
    pub fn to_request_body(&self) -> Value {
        json!({
            "@id": self.id,
            "accessPolicyId": self.access_policy_id,
            "contractPolicyId": self.contract_policy_id,
            "assetsSelector": self.assets_selector.iter().map(Criterion::to_value).collect::<Vec<_>>(),
        })
    }
}

/// Selector restricting a definition to the given asset ids.
///
/// No assets selected means an unrestricted definition (empty selector).
pub fn asset_selector(asset_ids: &[String]) -> Vec<Criterion> {
    if asset_ids.is_empty() {
        return Vec::new();
    }
    vec![Criterion {
        operand_left: ASSET_ID_PROPERTY.to_string(),
        operator: "in".to_string(),
        operand_right: asset_ids.iter().map(|id| json!(id)).collect(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_prefixed_spellings() {
        let doc = json!({
            "@id": "provider~3",
            "edc:accessPolicyId": "ap",
            "edc:contractPolicyId": "cp",
            "edc:assetsSelector": {
                "edc:operandLeft": ASSET_ID_PROPERTY,
                "edc:operator": "in",
                "edc:operandRight": ["A", "B"]
            }
        });
        let def = ContractDefinition::from_value(&doc);
        assert_eq!(def.id, "provider~3");
        assert_eq!(def.access_policy_id, "ap");
        assert_eq!(def.assets_selector.len(), 1);
        assert_eq!(def.assets_selector[0].operand_right.len(), 2);
    }

    #[test]
    fn selector_for_assets_uses_membership_operator() {
        let selector = asset_selector(&["A".into(), "B".into()]);
        assert_eq!(selector.len(), 1);
        assert_eq!(selector[0].operand_left, ASSET_ID_PROPERTY);
        assert_eq!(selector[0].operator, "in");
        assert!(asset_selector(&[]).is_empty());
    }

    #[test]
    fn round_trips_through_request_body() {
        let def = ContractDefinition {
            id: "user~1".into(),
            access_policy_id: "ap".into(),
            contract_policy_id: "cp".into(),
            assets_selector: asset_selector(&["A".into()]),
        };
        let body = def.to_request_body();
        assert_eq!(body["@id"], "user~1");
        assert_eq!(body["assetsSelector"][0]["operator"], "in");
    }
}
