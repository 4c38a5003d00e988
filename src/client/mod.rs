//! Connector boundary.
//!
//! Every remote call the orchestration core makes goes through the
//! [`ConnectorApi`] trait, so the reconciler, orchestrator and authoring
//! flow are tested against scripted fakes without HTTP. The production
//! implementation is [`ManagementClient`].

mod http;

pub use http::ManagementClient;

use async_trait::async_trait;
use serde_json::Value;

use crate::catalog::AssetFilter;
use crate::error::Result;
use crate::model::NegotiationTarget;

/// Paged query for the local asset listing.
#[derive(Debug, Clone, Copy)]
pub struct QuerySpec {
    pub offset: usize,
    pub limit: usize,
}

/// Request/response boundary to the dataspace connector pair.
#[async_trait]
pub trait ConnectorApi: Send + Sync {
    /// One page of raw self-hosted asset records.
    async fn list_local_assets(&self, query: &QuerySpec) -> Result<Vec<Value>>;

    /// Federated catalog document for the counter-party, optionally
    /// narrowed by search/filter parameters the connector understands.
    async fn request_federated_catalog(&self, filter: &AssetFilter) -> Result<Value>;

    async fn list_contract_definitions(&self) -> Result<Vec<Value>>;

    async fn create_contract_definition(&self, body: &Value) -> Result<()>;

    async fn list_policies(&self) -> Result<Vec<Value>>;

    async fn create_policy(&self, body: &Value) -> Result<()>;

    async fn list_agreements(&self) -> Result<Vec<Value>>;

    /// Start a negotiation; returns the negotiation identifier.
    async fn initiate_negotiation(&self, target: &NegotiationTarget) -> Result<String>;

    /// Raw status document for a running negotiation.
    async fn get_negotiation(&self, negotiation_id: &str) -> Result<Value>;

    async fn sequence_peek(&self, user_id: &str) -> Result<Value>;

    async fn sequence_commit(&self, user_id: &str, index: u64) -> Result<Value>;
}
