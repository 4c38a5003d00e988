//! Dataspace browser - client-side orchestration for an EDC connector pair

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dataspace_browser::{
    browser::DataspaceBrowser,
    catalog::{self, AssetFilter},
    client::ManagementClient,
    config::{Args, Command},
    negotiation::NegotiationOutcome,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("dataspace_browser={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let context = args.context();
    info!("======================================");
    info!("  Dataspace Browser");
    info!("======================================");
    info!("Role: {:?}", context.role);
    info!("Management API: {}", context.management_url);
    info!("Counter-party protocol: {}", context.counter_party_protocol_url);
    info!("Filtered browse: {}", context.filter_api_url);
    info!("User: {}", args.user_id);
    info!("======================================");

    let fallback_assigner = context.role.counter_party_participant().to_string();
    let api = Arc::new(ManagementClient::new(context, args.request_timeout()));
    let browser = DataspaceBrowser::new(
        api,
        args.negotiation_config(),
        &args.user_id,
        &fallback_assigner,
    );

    match args.command.clone() {
        Command::Browse {
            search,
            tasks,
            libraries,
            frameworks,
            formats,
            origins,
        } => {
            let filter = AssetFilter {
                search_term: search,
                tasks,
                libraries,
                frameworks,
                formats,
                origins: origins
                    .iter()
                    .filter_map(|label| catalog::parse_origin(label))
                    .collect(),
                ..Default::default()
            };
            let assets = browser.load_catalog(&filter).await?;
            info!("{} asset(s) in the reconciled catalog", assets.len());
            for asset in &assets {
                let name = if asset.name.is_empty() { "(unnamed)" } else { &asset.name };
                println!(
                    "{:40} {:15} agreement={} offers={} {}",
                    asset.id,
                    asset.origin.label(),
                    asset.has_agreement,
                    asset.contract_offers.len(),
                    name,
                );
            }
            let tasks = catalog::unique_tasks(&assets);
            if !tasks.is_empty() {
                info!("Tasks: {}", tasks.join(", "));
            }
            let software = catalog::unique_software(&assets);
            if !software.is_empty() {
                info!("Software: {}", software.join(", "));
            }
        }
        Command::Negotiate { asset_id } => {
            browser.load_catalog(&AssetFilter::default()).await?;
            match browser.negotiate_asset(&asset_id).await? {
                NegotiationOutcome::Finalized { negotiation_id } => {
                    info!("Negotiation {} finalized", negotiation_id);
                }
                NegotiationOutcome::AlreadyAgreed => {
                    info!("Asset {} already has an agreement", asset_id);
                }
                NegotiationOutcome::AlreadyInProgress => {
                    info!("A negotiation for {} is already running", asset_id);
                }
                NegotiationOutcome::StillPending {
                    negotiation_id,
                    attempts,
                } => {
                    info!(
                        "Negotiation {} still pending after {} poll(s); it may finalize later",
                        negotiation_id, attempts
                    );
                }
                NegotiationOutcome::PollFailed {
                    negotiation_id,
                    message,
                } => {
                    error!(
                        "Status polling for negotiation {} failed: {}",
                        negotiation_id, message
                    );
                }
            }
        }
        Command::Define {
            asset_ids,
            access_policy,
            contract_policy,
        } => {
            browser.load_catalog(&AssetFilter::default()).await?;
            let definition = browser
                .create_definition(
                    &asset_ids,
                    access_policy.as_deref(),
                    contract_policy.as_deref(),
                )
                .await?;
            info!(
                "Contract definition {} created over {} asset(s)",
                definition.id,
                asset_ids.len()
            );
        }
    }

    Ok(())
}
