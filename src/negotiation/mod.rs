//! Contract-negotiation orchestration.
//!
//! One negotiation per asset at a time: the in-flight guard is claimed
//! synchronously before the first await, so two concurrent attempts on the
//! same asset cannot both initiate. Status polling is a bounded loop with a
//! fixed delay between attempts; the budget exhausting is not an error, the
//! negotiation may still finalize on the connector afterwards.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::client::ConnectorApi;
use crate::contracts::AgreementSync;
use crate::error::{BrowserError, Result};
use crate::model::{extract_negotiation_state, NegotiationState, NegotiationTarget};
use crate::state::AssetListState;

/// Polling budget for one negotiation.
#[derive(Debug, Clone, Copy)]
pub struct NegotiationConfig {
    pub poll_delay: Duration,
    pub max_attempts: u32,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            poll_delay: Duration::from_millis(2000),
            max_attempts: 30,
        }
    }
}

/// How one negotiation attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationOutcome {
    /// An agreement already exists; nothing was initiated.
    AlreadyAgreed,
    /// Another attempt for the same asset is still running.
    AlreadyInProgress,
    Finalized {
        negotiation_id: String,
    },
    /// The polling budget ran out while the negotiation was still moving.
    StillPending {
        negotiation_id: String,
        attempts: u32,
    },
    /// A status poll failed; the negotiation itself may still be running.
    PollFailed {
        negotiation_id: String,
        message: String,
    },
}

pub struct NegotiationOrchestrator {
    api: Arc<dyn ConnectorApi>,
    config: NegotiationConfig,
    assets: Arc<AssetListState>,
    agreements: AgreementSync,
    in_flight: DashMap<String, ()>,
}

impl NegotiationOrchestrator {
    pub fn new(
        api: Arc<dyn ConnectorApi>,
        config: NegotiationConfig,
        assets: Arc<AssetListState>,
    ) -> Self {
        Self {
            agreements: AgreementSync::new(api.clone()),
            api,
            config,
            assets,
            in_flight: DashMap::new(),
        }
    }

    /// Run one negotiation to a terminal observation or budget exhaustion.
    pub async fn negotiate(&self, target: &NegotiationTarget) -> Result<NegotiationOutcome> {
        if target.has_agreement {
            debug!(asset_id = %target.asset_id, "agreement already present, not negotiating");
            return Ok(NegotiationOutcome::AlreadyAgreed);
        }
        if target.contract_id.is_empty() {
            return Err(BrowserError::Precondition(format!(
                "asset '{}' carries no contract offer to negotiate",
                target.asset_id
            )));
        }

        // Claimed before the first await, so concurrent attempts on the
        // same asset settle here and exactly one proceeds.
        match self.in_flight.entry(target.asset_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                debug!(asset_id = %target.asset_id, "negotiation already in flight");
                return Ok(NegotiationOutcome::AlreadyInProgress);
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(());
            }
        }

        let outcome = self.run(target).await;
        self.in_flight.remove(&target.asset_id);
        self.assets
            .set_negotiation_in_progress(&target.asset_id, false)
            .await;
        outcome
    }

    async fn run(&self, target: &NegotiationTarget) -> Result<NegotiationOutcome> {
        self.assets
            .set_negotiation_in_progress(&target.asset_id, true)
            .await;

        let negotiation_id = self.api.initiate_negotiation(target).await?;
        info!(
            asset_id = %target.asset_id,
            negotiation_id = %negotiation_id,
            "contract negotiation initiated"
        );

        for attempt in 1..=self.config.max_attempts {
            let status = match self.api.get_negotiation(&negotiation_id).await {
                Ok(doc) => doc,
                Err(e) => {
                    warn!(
                        negotiation_id = %negotiation_id,
                        attempt,
                        error = %e,
                        "status poll failed, negotiation may still complete on the connector"
                    );
                    return Ok(NegotiationOutcome::PollFailed {
                        negotiation_id,
                        message: e.to_string(),
                    });
                }
            };
            let state = extract_negotiation_state(&status);
            debug!(negotiation_id = %negotiation_id, attempt, state = %state, "negotiation status");

            match state {
                NegotiationState::Finalized => {
                    info!(
                        asset_id = %target.asset_id,
                        negotiation_id = %negotiation_id,
                        attempt,
                        "contract negotiation finalized"
                    );
                    self.assets.mark_agreement(&target.asset_id).await;
                    self.resync_agreements().await;
                    return Ok(NegotiationOutcome::Finalized { negotiation_id });
                }
                state if state.is_terminal_failure() => {
                    return Err(BrowserError::NegotiationFailed(state));
                }
                // Pending and Unknown both stay in the loop.
                _ => {
                    if attempt < self.config.max_attempts {
                        sleep(self.config.poll_delay).await;
                    }
                }
            }
        }

        warn!(
            asset_id = %target.asset_id,
            negotiation_id = %negotiation_id,
            attempts = self.config.max_attempts,
            "polling budget exhausted, negotiation left running"
        );
        self.resync_agreements().await;
        Ok(NegotiationOutcome::StillPending {
            negotiation_id,
            attempts: self.config.max_attempts,
        })
    }

    /// Best-effort agreement refresh; a failed sync keeps the current flags.
    async fn resync_agreements(&self) {
        match self.agreements.agreed_asset_ids().await {
            Ok(agreed) => self.assets.apply_agreement_flags(&agreed).await,
            Err(e) => warn!(error = %e, "agreement resync failed, keeping current flags"),
        }
    }
}
