//! Catalog reconciliation.
//!
//! Fetches the self-hosted listing and the federated catalog concurrently,
//! tolerates one source failing, merges with `(id, origin)` deduplication
//! and applies the client-side filter.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::{datasets_of, normalize_dataset, normalize_local_asset, AssetFilter};
use crate::client::{ConnectorApi, QuerySpec};
use crate::error::{BrowserError, Result};
use crate::model::{Asset, AssetOrigin};

/// Page size for the local asset listing.
const LOCAL_PAGE_SIZE: usize = 100;

pub struct CatalogReconciler {
    api: Arc<dyn ConnectorApi>,
}

impl CatalogReconciler {
    pub fn new(api: Arc<dyn ConnectorApi>) -> Self {
        Self { api }
    }

    /// Merged, filtered asset list for the given criteria.
    ///
    /// Either source failing alone degrades to the other source's result;
    /// only both failing surfaces an error. The merge inserts federated
    /// entries first and local entries second, so a same-keyed collision
    /// (impossible today since the key includes the origin, but a guard
    /// against future key changes) prefers the local record.
    pub async fn load(&self, filter: &AssetFilter) -> Result<Vec<Asset>> {
        let (local, federated) = tokio::join!(self.fetch_local(), self.fetch_federated(filter));

        if let (Err(local_err), Err(federated_err)) = (&local, &federated) {
            return Err(BrowserError::CatalogUnavailable {
                local: local_err.to_string(),
                federated: federated_err.to_string(),
            });
        }
        let local = local.unwrap_or_else(|e| {
            warn!(error = %e, "local asset listing failed; continuing with federated catalog only");
            Vec::new()
        });
        let federated = federated.unwrap_or_else(|e| {
            warn!(error = %e, "federated catalog failed; continuing with local assets only");
            Vec::new()
        });

        let mut merged: HashMap<(String, AssetOrigin), Asset> = HashMap::new();
        for asset in federated {
            merged.insert(asset.key(), asset);
        }
        for asset in local {
            merged.insert(asset.key(), asset);
        }

        let mut assets: Vec<Asset> = merged
            .into_values()
            .filter(|asset| filter.matches(asset))
            .collect();
        assets.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.origin.label().cmp(b.origin.label())));
        debug!(count = assets.len(), "catalog reconciled");
        Ok(assets)
    }

    /// All pages of the self-hosted listing, normalized.
    async fn fetch_local(&self) -> Result<Vec<Asset>> {
        let mut assets = Vec::new();
        let mut offset = 0;
        loop {
            let page = self
                .api
                .list_local_assets(&QuerySpec {
                    offset,
                    limit: LOCAL_PAGE_SIZE,
                })
                .await?;
            let page_len = page.len();
            assets.extend(page.iter().map(normalize_local_asset));
            if page_len < LOCAL_PAGE_SIZE {
                break;
            }
            offset += page_len;
        }
        Ok(assets)
    }

    async fn fetch_federated(&self, filter: &AssetFilter) -> Result<Vec<Asset>> {
        let catalog = self.api.request_federated_catalog(filter).await?;
        Ok(datasets_of(&catalog)
            .iter()
            .map(normalize_dataset)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeConnector;
    use serde_json::json;

    fn local_record(id: &str) -> serde_json::Value {
        json!({ "@id": id, "properties": { "name": id } })
    }

    fn catalog_with(ids: &[&str]) -> serde_json::Value {
        let datasets: Vec<_> = ids
            .iter()
            .map(|id| json!({ "@id": id, "name": id, "odrl:hasPolicy": { "@id": format!("{id}-offer") } }))
            .collect();
        json!({ "dcat:dataset": datasets })
    }

    #[tokio::test]
    async fn partial_failure_of_federated_source_is_tolerated() {
        let api = Arc::new(FakeConnector {
            local_assets: Some(vec![local_record("a"), local_record("b")]),
            catalog: None,
            ..Default::default()
        });
        let assets = CatalogReconciler::new(api)
            .load(&AssetFilter::default())
            .await
            .expect("one live source is enough");
        assert_eq!(assets.len(), 2);
        assert!(assets.iter().all(|a| a.is_local()));
    }

    #[tokio::test]
    async fn partial_failure_of_local_source_is_tolerated() {
        let api = Arc::new(FakeConnector {
            local_assets: None,
            catalog: Some(catalog_with(&["x"])),
            ..Default::default()
        });
        let assets = CatalogReconciler::new(api)
            .load(&AssetFilter::default())
            .await
            .expect("one live source is enough");
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].origin, AssetOrigin::Federated);
    }

    #[tokio::test]
    async fn both_sources_failing_is_an_error() {
        let api = Arc::new(FakeConnector {
            local_assets: None,
            catalog: None,
            ..Default::default()
        });
        let err = CatalogReconciler::new(api)
            .load(&AssetFilter::default())
            .await
            .expect_err("no source left");
        assert!(matches!(err, BrowserError::CatalogUnavailable { .. }));
    }

    #[tokio::test]
    async fn same_id_across_origins_stays_two_entries() {
        let api = Arc::new(FakeConnector {
            local_assets: Some(vec![local_record("X")]),
            catalog: Some(catalog_with(&["X"])),
            ..Default::default()
        });
        let assets = CatalogReconciler::new(api)
            .load(&AssetFilter::default())
            .await
            .expect("load");
        assert_eq!(assets.len(), 2);
        let origins: Vec<_> = assets.iter().map(|a| a.origin).collect();
        assert!(origins.contains(&AssetOrigin::Local));
        assert!(origins.contains(&AssetOrigin::Federated));
    }

    #[tokio::test]
    async fn filter_applies_after_merge() {
        let api = Arc::new(FakeConnector {
            local_assets: Some(vec![local_record("a")]),
            catalog: Some(catalog_with(&["b"])),
            ..Default::default()
        });
        let filter = AssetFilter {
            origins: vec![AssetOrigin::Federated],
            ..Default::default()
        };
        let assets = CatalogReconciler::new(api).load(&filter).await.expect("load");
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].id, "b");
    }
}
