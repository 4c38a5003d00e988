//! Top-level browser facade.
//!
//! Wires the reconciler, agreement synchronizer, policy resolver,
//! negotiation orchestrator and definition authoring flow around one
//! shared asset-list state.

use std::sync::Arc;

use tracing::warn;

use crate::catalog::{AssetFilter, CatalogReconciler};
use crate::client::ConnectorApi;
use crate::contracts::{AgreementSync, ConnectorSequenceStore, DefinitionAuthor, PolicyResolver};
use crate::error::{BrowserError, Result};
use crate::model::{Asset, AssetOrigin, ContractDefinition, NegotiationTarget};
use crate::negotiation::{NegotiationConfig, NegotiationOrchestrator, NegotiationOutcome};
use crate::state::{AssetListState, CurrentUserState, SelectedItemState};

pub struct DataspaceBrowser {
    reconciler: CatalogReconciler,
    agreements: AgreementSync,
    policies: PolicyResolver,
    orchestrator: NegotiationOrchestrator,
    author: DefinitionAuthor,
    assets: Arc<AssetListState>,
    pub selected: SelectedItemState,
    pub user: CurrentUserState,
    fallback_assigner: String,
}

impl DataspaceBrowser {
    pub fn new(
        api: Arc<dyn ConnectorApi>,
        negotiation: NegotiationConfig,
        user_id: &str,
        fallback_assigner: &str,
    ) -> Self {
        let assets = Arc::new(AssetListState::new());
        let sequence = Arc::new(ConnectorSequenceStore::new(api.clone()));
        Self {
            reconciler: CatalogReconciler::new(api.clone()),
            agreements: AgreementSync::new(api.clone()),
            policies: PolicyResolver::new(api.clone()),
            orchestrator: NegotiationOrchestrator::new(api.clone(), negotiation, assets.clone()),
            author: DefinitionAuthor::new(api, sequence, user_id),
            assets,
            selected: SelectedItemState::new(),
            user: CurrentUserState::new(user_id),
            fallback_assigner: fallback_assigner.to_string(),
        }
    }

    /// Reconcile the catalog, derive agreement flags, resolve policy ids
    /// and publish the result. Agreement sync and policy resolution are
    /// best-effort; a failure leaves the enrichment out, not the list.
    pub async fn load_catalog(&self, filter: &AssetFilter) -> Result<Vec<Asset>> {
        let mut assets = self.reconciler.load(filter).await?;
        match self.agreements.agreed_asset_ids().await {
            Ok(agreed) => crate::contracts::apply_agreement_flags(&mut assets, &agreed),
            Err(e) => warn!(error = %e, "agreement sync failed, agreement flags may be stale"),
        }
        self.policies.enrich(&mut assets).await;
        self.assets.replace(assets.clone()).await;
        Ok(assets)
    }

    pub async fn catalog_snapshot(&self) -> Vec<Asset> {
        self.assets.snapshot().await
    }

    /// Negotiate a contract for a federated asset from the current list.
    pub async fn negotiate_asset(&self, asset_id: &str) -> Result<NegotiationOutcome> {
        let asset = self
            .assets
            .get(asset_id, AssetOrigin::Federated)
            .await
            .ok_or_else(|| {
                BrowserError::Precondition(format!(
                    "asset '{asset_id}' is not in the current federated catalog"
                ))
            })?;
        let target =
            NegotiationTarget::from_asset(&asset, &self.fallback_assigner).ok_or_else(|| {
                BrowserError::Precondition(format!(
                    "asset '{asset_id}' carries no contract offer to negotiate"
                ))
            })?;
        self.orchestrator.negotiate(&target).await
    }

    /// Author a contract definition over local assets from the current list.
    pub async fn create_definition(
        &self,
        asset_ids: &[String],
        access_policy_id: Option<&str>,
        contract_policy_id: Option<&str>,
    ) -> Result<ContractDefinition> {
        let mut selected = Vec::with_capacity(asset_ids.len());
        for asset_id in asset_ids {
            let asset = self
                .assets
                .get(asset_id, AssetOrigin::Local)
                .await
                .ok_or_else(|| {
                    BrowserError::Precondition(format!(
                        "asset '{asset_id}' is not a known local asset"
                    ))
                })?;
            selected.push(asset);
        }
        self.author
            .create(&selected, access_policy_id, contract_policy_id)
            .await
    }
}
