//! Shared orchestration state.
//!
//! Each holder owns one piece of state behind a `tokio::sync::RwLock` with
//! a single conceptual writer. List updates go through `replace`, so a
//! reader never observes a partially rebuilt list.

use std::collections::HashSet;

use tokio::sync::RwLock;

use crate::contracts::agreements;
use crate::contracts::sequence::normalize_user_id;
use crate::model::{Asset, AssetOrigin};

/// The reconciled asset list.
#[derive(Default)]
pub struct AssetListState {
    assets: RwLock<Vec<Asset>>,
}

impl AssetListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a freshly reconciled list.
    pub async fn replace(&self, assets: Vec<Asset>) {
        *self.assets.write().await = assets;
    }

    pub async fn snapshot(&self) -> Vec<Asset> {
        self.assets.read().await.clone()
    }

    pub async fn get(&self, asset_id: &str, origin: AssetOrigin) -> Option<Asset> {
        self.assets
            .read()
            .await
            .iter()
            .find(|a| a.id == asset_id && a.origin == origin)
            .cloned()
    }

    /// Flag or clear the in-progress marker on a federated asset and its
    /// offers. Local entries are never negotiated and keep the flag off.
    pub async fn set_negotiation_in_progress(&self, asset_id: &str, in_progress: bool) {
        let mut assets = self.assets.write().await;
        for asset in assets.iter_mut() {
            if asset.id == asset_id && !asset.is_local() {
                asset.negotiation_in_progress = in_progress;
                for offer in asset.contract_offers.iter_mut() {
                    offer.negotiation_in_progress = in_progress;
                }
            }
        }
    }

    /// Record a finalized agreement on every entry carrying the asset id.
    pub async fn mark_agreement(&self, asset_id: &str) {
        let mut assets = self.assets.write().await;
        for asset in assets.iter_mut() {
            if asset.id == asset_id {
                asset.has_agreement = true;
                for offer in asset.contract_offers.iter_mut() {
                    offer.has_agreement = true;
                }
            }
        }
    }

    /// Re-derive agreement flags from a fresh agreement sync.
    pub async fn apply_agreement_flags(&self, agreed: &HashSet<String>) {
        let mut assets = self.assets.write().await;
        agreements::apply_agreement_flags(&mut assets, agreed);
    }
}

/// The catalog item currently under inspection.
#[derive(Default)]
pub struct SelectedItemState {
    selected: RwLock<Option<Asset>>,
}

impl SelectedItemState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn select(&self, asset: Asset) {
        *self.selected.write().await = Some(asset);
    }

    pub async fn clear(&self) {
        *self.selected.write().await = None;
    }

    pub async fn current(&self) -> Option<Asset> {
        self.selected.read().await.clone()
    }
}

/// Identity feeding sequence allocation and default-policy naming.
pub struct CurrentUserState {
    user_id: RwLock<String>,
}

impl CurrentUserState {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: RwLock::new(normalize_user_id(user_id)),
        }
    }

    pub async fn set(&self, user_id: &str) {
        *self.user_id.write().await = normalize_user_id(user_id);
    }

    pub async fn get(&self) -> String {
        self.user_id.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{normalize_dataset, normalize_local_asset};
    use serde_json::json;

    fn listing() -> Vec<Asset> {
        vec![
            normalize_local_asset(&json!({ "@id": "X" })),
            normalize_dataset(&json!({ "@id": "X", "odrl:hasPolicy": { "@id": "o1" } })),
            normalize_dataset(&json!({ "@id": "Y", "odrl:hasPolicy": { "@id": "o2" } })),
        ]
    }

    #[tokio::test]
    async fn replace_swaps_the_whole_list() {
        let state = AssetListState::new();
        state.replace(listing()).await;
        assert_eq!(state.snapshot().await.len(), 3);
        state.replace(Vec::new()).await;
        assert!(state.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn in_progress_flag_skips_local_entries() {
        let state = AssetListState::new();
        state.replace(listing()).await;
        state.set_negotiation_in_progress("X", true).await;

        let local = state.get("X", AssetOrigin::Local).await.expect("local");
        let federated = state.get("X", AssetOrigin::Federated).await.expect("federated");
        assert!(!local.negotiation_in_progress);
        assert!(federated.negotiation_in_progress);
        assert!(federated.contract_offers[0].negotiation_in_progress);

        state.set_negotiation_in_progress("X", false).await;
        let federated = state.get("X", AssetOrigin::Federated).await.expect("federated");
        assert!(!federated.negotiation_in_progress);
    }

    #[tokio::test]
    async fn mark_agreement_reaches_offers() {
        let state = AssetListState::new();
        state.replace(listing()).await;
        state.mark_agreement("Y").await;
        let asset = state.get("Y", AssetOrigin::Federated).await.expect("asset");
        assert!(asset.has_agreement);
        assert!(asset.contract_offers[0].has_agreement);
    }

    #[tokio::test]
    async fn selection_round_trip() {
        let state = SelectedItemState::new();
        assert!(state.current().await.is_none());
        state.select(normalize_local_asset(&json!({ "@id": "X" }))).await;
        assert_eq!(state.current().await.expect("selected").id, "X");
        state.clear().await;
        assert!(state.current().await.is_none());
    }

    #[tokio::test]
    async fn user_identity_is_normalized() {
        let state = CurrentUserState::new(" Alice ");
        assert_eq!(state.get().await, "alice");
        state.set("").await;
        assert_eq!(state.get().await, "user");
    }
}
