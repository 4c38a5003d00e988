//! Configuration for the dataspace browser.
//!
//! CLI arguments and environment variable handling using clap. The browser
//! can act as either party of the dataspace; [`ConnectorContext`] resolves
//! the role-dependent endpoints (own management/API URLs, counter-party
//! protocol URL).

use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;

/// Which side of the dataspace this client drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConnectorRole {
    Consumer,
    Provider,
}

impl ConnectorRole {
    /// Participant id of the other side, used as the offer assigner when a
    /// catalog record carries none.
    pub fn counter_party_participant(&self) -> &'static str {
        match self {
            ConnectorRole::Consumer => "provider",
            ConnectorRole::Provider => "consumer",
        }
    }
}

/// Dataspace browser - catalog reconciliation, contract negotiation and
/// contract-definition authoring against an EDC connector pair.
#[derive(Parser, Debug, Clone)]
#[command(name = "dataspace-browser")]
#[command(about = "Browse and negotiate data assets across an EDC dataspace")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Role this client acts as
    #[arg(long, env = "CONNECTOR_ROLE", value_enum, default_value = "consumer")]
    pub role: ConnectorRole,

    /// Consumer connector management API base URL
    #[arg(long, env = "CONSUMER_MANAGEMENT_URL", default_value = "http://localhost:29193/management")]
    pub consumer_management_url: String,

    /// Provider connector management API base URL
    #[arg(long, env = "PROVIDER_MANAGEMENT_URL", default_value = "http://localhost:19193/management")]
    pub provider_management_url: String,

    /// Consumer connector DSP protocol URL
    #[arg(long, env = "CONSUMER_PROTOCOL_URL", default_value = "http://localhost:29194/protocol")]
    pub consumer_protocol_url: String,

    /// Provider connector DSP protocol URL
    #[arg(long, env = "PROVIDER_PROTOCOL_URL", default_value = "http://localhost:19194/protocol")]
    pub provider_protocol_url: String,

    /// Consumer connector default API URL (contract-sequence extension)
    #[arg(long, env = "CONSUMER_API_URL", default_value = "http://localhost:29191")]
    pub consumer_api_url: String,

    /// Provider connector default API URL (contract-sequence extension)
    #[arg(long, env = "PROVIDER_API_URL", default_value = "http://localhost:19191")]
    pub provider_api_url: String,

    /// Filtered-browse endpoint override; defaults to {api}/api/filter/catalog
    #[arg(long, env = "FILTER_API_URL")]
    pub filter_api_url: Option<String>,

    /// Catalog/negotiation wire protocol identifier
    #[arg(long, env = "CATALOG_PROTOCOL", default_value = "dataspace-protocol-http")]
    pub catalog_protocol: String,

    /// User identifier feeding sequence allocation and default-policy naming
    #[arg(long, env = "USER_ID", default_value = "user")]
    pub user_id: String,

    /// HTTP request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Delay between negotiation status polls in milliseconds
    #[arg(long, env = "NEGOTIATION_POLL_DELAY_MS", default_value = "2000")]
    pub negotiation_poll_delay_ms: u64,

    /// Upper bound on status polls per negotiation (bounds total wait time
    /// at delay x attempts)
    #[arg(long, env = "NEGOTIATION_POLL_MAX_ATTEMPTS", default_value = "30")]
    pub negotiation_poll_max_attempts: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Browser operations exposed on the command line.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Load and print the reconciled dataspace catalog
    Browse {
        /// Free-text search over names, descriptions and keywords
        #[arg(long)]
        search: Option<String>,
        /// Restrict to assets carrying one of these task tags
        #[arg(long = "task")]
        tasks: Vec<String>,
        /// Restrict to assets carrying one of these library tags
        #[arg(long = "library")]
        libraries: Vec<String>,
        /// Restrict to assets carrying one of these framework tags
        #[arg(long = "framework")]
        frameworks: Vec<String>,
        /// Restrict to one of these content-type formats
        #[arg(long = "format")]
        formats: Vec<String>,
        /// Restrict to an origin: "Local Asset" or "External Asset"
        #[arg(long = "origin")]
        origins: Vec<String>,
    },
    /// Negotiate a contract for a federated asset and poll to completion
    Negotiate {
        /// Identifier of the asset to negotiate
        asset_id: String,
    },
    /// Create a contract definition over local assets
    Define {
        /// Local asset identifiers the definition applies to
        asset_ids: Vec<String>,
        /// Access policy id (defaults to the user's default open policy)
        #[arg(long)]
        access_policy: Option<String>,
        /// Contract policy id (defaults to the user's default open policy)
        #[arg(long)]
        contract_policy: Option<String>,
    },
}

impl Args {
    /// Validate configuration before startup.
    pub fn validate(&self) -> Result<(), String> {
        for (name, url) in [
            ("consumer management URL", &self.consumer_management_url),
            ("provider management URL", &self.provider_management_url),
            ("consumer protocol URL", &self.consumer_protocol_url),
            ("provider protocol URL", &self.provider_protocol_url),
            ("consumer API URL", &self.consumer_api_url),
            ("provider API URL", &self.provider_api_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("{} must be an http(s) URL: {}", name, url));
            }
        }
        if self.negotiation_poll_max_attempts == 0 {
            return Err("negotiation poll max attempts must be at least 1".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("request timeout must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Role-resolved endpoints for the active side.
    pub fn context(&self) -> ConnectorContext {
        let (management_url, counter_party_protocol_url, api_url) = match self.role {
            ConnectorRole::Consumer => (
                self.consumer_management_url.clone(),
                self.provider_protocol_url.clone(),
                self.consumer_api_url.clone(),
            ),
            ConnectorRole::Provider => (
                self.provider_management_url.clone(),
                self.consumer_protocol_url.clone(),
                self.provider_api_url.clone(),
            ),
        };
        let filter_api_url = self
            .filter_api_url
            .clone()
            .unwrap_or_else(|| format!("{}/api/filter/catalog", api_url));
        ConnectorContext {
            role: self.role,
            management_url,
            counter_party_protocol_url,
            api_url,
            filter_api_url,
            catalog_protocol: self.catalog_protocol.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn negotiation_config(&self) -> crate::negotiation::NegotiationConfig {
        crate::negotiation::NegotiationConfig {
            poll_delay: Duration::from_millis(self.negotiation_poll_delay_ms),
            max_attempts: self.negotiation_poll_max_attempts,
        }
    }
}

/// Role-dependent endpoint set every boundary call goes through.
#[derive(Debug, Clone)]
pub struct ConnectorContext {
    pub role: ConnectorRole,
    /// Own management API base URL.
    pub management_url: String,
    /// Protocol URL of the other party (catalog requests, negotiations).
    pub counter_party_protocol_url: String,
    /// Own default API URL (contract-sequence extension).
    pub api_url: String,
    /// Filtered-browse endpoint.
    pub filter_api_url: String,
    pub catalog_protocol: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["dataspace-browser"];
        argv.extend_from_slice(extra);
        argv.push("browse");
        Args::try_parse_from(argv).expect("args parse")
    }

    #[test]
    fn consumer_context_targets_provider_protocol() {
        let ctx = args(&[]).context();
        assert_eq!(ctx.management_url, "http://localhost:29193/management");
        assert_eq!(
            ctx.counter_party_protocol_url,
            "http://localhost:19194/protocol"
        );
        assert_eq!(
            ctx.filter_api_url,
            "http://localhost:29191/api/filter/catalog"
        );
    }

    #[test]
    fn provider_context_swaps_sides() {
        let ctx = args(&["--role", "provider"]).context();
        assert_eq!(ctx.management_url, "http://localhost:19193/management");
        assert_eq!(
            ctx.counter_party_protocol_url,
            "http://localhost:29194/protocol"
        );
        assert_eq!(ctx.role.counter_party_participant(), "consumer");
    }

    #[test]
    fn validate_rejects_non_http_urls_and_zero_budget() {
        let mut bad = args(&[]);
        bad.consumer_management_url = "ftp://nope".into();
        assert!(bad.validate().is_err());

        let mut bad = args(&[]);
        bad.negotiation_poll_max_attempts = 0;
        assert!(bad.validate().is_err());

        assert!(args(&[]).validate().is_ok());
    }
}
