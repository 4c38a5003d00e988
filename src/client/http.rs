//! Reqwest-backed management API client.
//!
//! Implements every boundary call of [`ConnectorApi`] against the EDC
//! management API of the active connector, the contract-sequence extension
//! on its default API, and the filtered-browse endpoint. Request bodies
//! carry the EDC JSON-LD default context; non-2xx responses map to
//! [`BrowserError::Remote`], network failures to [`BrowserError::Transport`].

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{ConnectorApi, QuerySpec};
use crate::catalog::AssetFilter;
use crate::config::ConnectorContext;
use crate::error::{BrowserError, Result};
use crate::extract;
use crate::model::NegotiationTarget;

/// EDC management namespace used as the JSON-LD vocabulary.
pub const EDC_NAMESPACE: &str = "https://w3id.org/edc/v0.0.1/ns/";

pub struct ManagementClient {
    http: reqwest::Client,
    context: ConnectorContext,
}

impl ManagementClient {
    pub fn new(context: ConnectorContext, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("dataspace-browser/0.1")
            .build()
            .unwrap_or_default();
        Self { http, context }
    }

    fn default_context() -> Value {
        json!({ "@vocab": EDC_NAMESPACE })
    }

    fn management(&self, path: &str) -> String {
        format!("{}{}", self.context.management_url, path)
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        debug!(url = %url, "POST");
        let response = self.http.post(url).json(body).send().await?;
        Self::read_json(response).await
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        debug!(url = %url, "GET");
        let response = self.http.get(url).send().await?;
        Self::read_json(response).await
    }

    async fn read_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(BrowserError::Remote {
                status: status.as_u16(),
                message: text,
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| BrowserError::InvalidResponse(e.to_string()))
    }

    /// Query string for the filtered-browse endpoint. Frameworks share the
    /// `library` parameter with libraries; formats travel as a content-type
    /// filter expression.
    fn filter_query(filter: &AssetFilter) -> String {
        let mut params = vec!["profile=daimo".to_string()];
        if let Some(term) = filter.search_term.as_deref() {
            if !term.trim().is_empty() {
                params.push(format!("q={}", urlencoding::encode(term.trim())));
            }
        }
        if !filter.tasks.is_empty() {
            params.push(format!(
                "task={}",
                urlencoding::encode(&filter.tasks.join(","))
            ));
        }
        if !filter.libraries.is_empty() {
            params.push(format!(
                "library={}",
                urlencoding::encode(&filter.libraries.join(","))
            ));
        }
        if !filter.frameworks.is_empty() {
            params.push(format!(
                "library={}",
                urlencoding::encode(&filter.frameworks.join(","))
            ));
        }
        if !filter.formats.is_empty() {
            params.push(format!(
                "filter=contenttype={}",
                urlencoding::encode(&filter.formats.join(","))
            ));
        }
        params.join("&")
    }

    fn catalog_request_body(&self) -> Value {
        json!({
            "@context": Self::default_context(),
            "counterPartyAddress": self.context.counter_party_protocol_url,
            "protocol": self.context.catalog_protocol,
        })
    }
}

#[async_trait]
impl ConnectorApi for ManagementClient {
    async fn list_local_assets(&self, query: &QuerySpec) -> Result<Vec<Value>> {
        let body = json!({
            "@context": Self::default_context(),
            "@type": "QuerySpec",
            "offset": query.offset,
            "limit": query.limit,
        });
        let response = self
            .post_json(&self.management("/v3/assets/request"), &body)
            .await?;
        Ok(extract::collection_items(&response))
    }

    async fn request_federated_catalog(&self, filter: &AssetFilter) -> Result<Value> {
        let url = format!("{}?{}", self.context.filter_api_url, Self::filter_query(filter));
        self.post_json(&url, &self.catalog_request_body()).await
    }

    async fn list_contract_definitions(&self) -> Result<Vec<Value>> {
        let body = json!({
            "@context": Self::default_context(),
            "filterExpression": [],
        });
        let response = self
            .post_json(&self.management("/v3/contractdefinitions/request"), &body)
            .await?;
        Ok(extract::collection_items(&response))
    }

    async fn create_contract_definition(&self, body: &Value) -> Result<()> {
        let mut request = body.clone();
        if let Value::Object(map) = &mut request {
            map.insert("@context".to_string(), Self::default_context());
        }
        self.post_json(&self.management("/v3/contractdefinitions"), &request)
            .await?;
        Ok(())
    }

    async fn list_policies(&self) -> Result<Vec<Value>> {
        let body = json!({
            "@context": Self::default_context(),
            "filterExpression": [],
        });
        let response = self
            .post_json(&self.management("/v3/policydefinitions/request"), &body)
            .await?;
        Ok(extract::collection_items(&response))
    }

    async fn create_policy(&self, body: &Value) -> Result<()> {
        let mut request = body.clone();
        if let Value::Object(map) = &mut request {
            map.insert("@context".to_string(), Self::default_context());
        }
        self.post_json(&self.management("/v3/policydefinitions"), &request)
            .await?;
        Ok(())
    }

    async fn list_agreements(&self) -> Result<Vec<Value>> {
        let body = json!({
            "@context": Self::default_context(),
            "filterExpression": [],
        });
        let response = self
            .post_json(&self.management("/v3/contractagreements/request"), &body)
            .await?;
        Ok(extract::collection_items(&response))
    }

    async fn initiate_negotiation(&self, target: &NegotiationTarget) -> Result<String> {
        let body = json!({
            "@context": Self::default_context(),
            "@type": "ContractRequest",
            "counterPartyAddress": self.context.counter_party_protocol_url,
            "protocol": self.context.catalog_protocol,
            "policy": {
                "@context": "http://www.w3.org/ns/odrl.jsonld",
                "@id": target.contract_id,
                "@type": "Offer",
                "assigner": target.assigner,
                "target": target.asset_id,
            },
        });
        let response = self
            .post_json(&self.management("/v3/contractnegotiations"), &body)
            .await?;
        let id = extract::string_field(&response, &["@id", "id"]);
        if id.is_empty() {
            return Err(BrowserError::InvalidResponse(
                "negotiation accepted but no identifier returned".to_string(),
            ));
        }
        Ok(id)
    }

    async fn get_negotiation(&self, negotiation_id: &str) -> Result<Value> {
        self.get_json(&self.management(&format!(
            "/v3/contractnegotiations/{}",
            negotiation_id
        )))
        .await
    }

    async fn sequence_peek(&self, user_id: &str) -> Result<Value> {
        let url = format!("{}/api/contract-sequences/peek", self.context.api_url);
        self.post_json(&url, &json!({ "userId": user_id })).await
    }

    async fn sequence_commit(&self, user_id: &str, index: u64) -> Result<Value> {
        let url = format!("{}/api/contract-sequences/commit", self.context.api_url);
        self.post_json(&url, &json!({ "userId": user_id, "index": index }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_query_always_carries_profile() {
        assert_eq!(
            ManagementClient::filter_query(&AssetFilter::default()),
            "profile=daimo"
        );
    }

    #[test]
    fn filter_query_encodes_parameters() {
        let filter = AssetFilter {
            search_term: Some("image net".to_string()),
            tasks: vec!["classification".to_string()],
            libraries: vec!["pytorch".to_string()],
            frameworks: vec!["onnx".to_string()],
            formats: vec!["application/zip".to_string()],
            ..Default::default()
        };
        let query = ManagementClient::filter_query(&filter);
        assert!(query.contains("q=image%20net"));
        assert!(query.contains("task=classification"));
        assert!(query.contains("library=pytorch"));
        assert!(query.contains("library=onnx"));
        assert!(query.contains("filter=contenttype=application%2Fzip"));
    }
}
