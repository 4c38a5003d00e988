//! Contract-definition authoring.
//!
//! Creation is peek-create-commit: the identifier slot is only committed
//! after the connector accepted the definition, so a failed creation never
//! burns an index. A commit that fails afterwards is absorbed with a
//! warning; the definition already exists and the next peek may simply
//! hand out a stale candidate.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::client::ConnectorApi;
use crate::contracts::sequence::{normalize_user_id, CommitOutcome, SequenceStore};
use crate::error::{BrowserError, Result};
use crate::extract;
use crate::model::{asset_selector, Asset, ContractDefinition};

/// Suffix of the per-user fallback policy.
const DEFAULT_POLICY_SUFFIX: &str = "default-open-policy";

pub struct DefinitionAuthor {
    api: Arc<dyn ConnectorApi>,
    sequence: Arc<dyn SequenceStore>,
    user_id: String,
}

impl DefinitionAuthor {
    pub fn new(api: Arc<dyn ConnectorApi>, sequence: Arc<dyn SequenceStore>, user_id: &str) -> Self {
        Self {
            api,
            sequence,
            user_id: normalize_user_id(user_id),
        }
    }

    /// Create a contract definition over the selected assets.
    ///
    /// Empty policy ids fall back to the user's default open policy, which
    /// is created on demand. Returns the created definition.
    pub async fn create(
        &self,
        assets: &[Asset],
        access_policy_id: Option<&str>,
        contract_policy_id: Option<&str>,
    ) -> Result<ContractDefinition> {
        if let Some(external) = assets.iter().find(|a| !a.is_local()) {
            return Err(BrowserError::Precondition(format!(
                "asset '{}' is externally hosted and cannot be wrapped in a new contract definition",
                external.id
            )));
        }

        let access_policy_id = match access_policy_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id.trim().to_string(),
            None => self.ensure_default_policy().await?,
        };
        let contract_policy_id = match contract_policy_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id.trim().to_string(),
            None => access_policy_id.clone(),
        };

        let allocation = self.sequence.peek(&self.user_id).await?;
        let asset_ids: Vec<String> = assets.iter().map(|a| a.id.clone()).collect();
        let definition = ContractDefinition {
            id: allocation.contract_definition_id.clone(),
            access_policy_id,
            contract_policy_id,
            assets_selector: asset_selector(&asset_ids),
        };

        self.api
            .create_contract_definition(&definition.to_request_body())
            .await?;
        info!(
            definition_id = %definition.id,
            assets = asset_ids.len(),
            "contract definition created"
        );

        match self.sequence.commit(&allocation.user_id, allocation.index).await {
            Ok(CommitOutcome::Committed) => {}
            Ok(CommitOutcome::Conflict { expected }) => {
                warn!(
                    definition_id = %definition.id,
                    index = allocation.index,
                    expected,
                    "sequence commit lost to a concurrent allocation; next peek may repeat a used candidate"
                );
            }
            Err(e) => {
                warn!(
                    definition_id = %definition.id,
                    index = allocation.index,
                    error = %e,
                    "sequence commit failed after creation; next peek may repeat a used candidate"
                );
            }
        }
        Ok(definition)
    }

    /// Identifier of the user's default open policy, creating an empty
    /// ODRL `Set` policy definition when none exists yet.
    pub async fn ensure_default_policy(&self) -> Result<String> {
        let policy_id = format!("{}~{}", self.user_id, DEFAULT_POLICY_SUFFIX);
        let existing = self.api.list_policies().await?;
        let present = existing.iter().any(|policy| {
            extract::string_field(policy, &["@id", "id"]) == policy_id
        });
        if present {
            return Ok(policy_id);
        }
        let body = json!({
            "@context": { "odrl": "http://www.w3.org/ns/odrl/2/" },
            "@id": policy_id,
            "policy": {
                "@context": "http://www.w3.org/ns/odrl.jsonld",
                "@type": "Set",
                "permission": [],
                "prohibition": [],
                "obligation": []
            }
        });
        self.api.create_policy(&body).await?;
        info!(policy_id = %policy_id, "default open policy created");
        Ok(policy_id)
    }
}
