//! Negotiation protocol state and negotiation targets.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract;
use crate::model::Asset;

/// Candidate fields carrying the negotiation state, in priority order.
const STATE_KEYS: &[&str] = &[
    "state",
    "edc:state",
    "negotiationState",
    "edc:negotiationState",
    "https://w3id.org/edc/v0.0.1/ns/state",
];

/// Protocol state of a contract negotiation, as observed by this client.
///
/// Every intermediate protocol state (REQUESTED, AGREED, VERIFIED, ...)
/// collapses to `Pending`; `Unknown` is the defensive state for documents
/// whose state field cannot be parsed and is retried like `Pending`, never
/// treated as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NegotiationState {
    Pending,
    Finalized,
    Terminated,
    Declined,
    Error,
    Unknown,
}

impl NegotiationState {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "" => NegotiationState::Unknown,
            "FINALIZED" => NegotiationState::Finalized,
            "TERMINATED" => NegotiationState::Terminated,
            "DECLINED" => NegotiationState::Declined,
            "ERROR" => NegotiationState::Error,
            _ => NegotiationState::Pending,
        }
    }

    /// Terminal failure states surfaced to the caller as hard errors.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            NegotiationState::Terminated | NegotiationState::Declined | NegotiationState::Error
        )
    }
}

impl std::fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NegotiationState::Pending => "PENDING",
            NegotiationState::Finalized => "FINALIZED",
            NegotiationState::Terminated => "TERMINATED",
            NegotiationState::Declined => "DECLINED",
            NegotiationState::Error => "ERROR",
            NegotiationState::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Read the negotiation state from a status document, trying every
/// candidate field and case-normalizing the first non-empty match.
pub fn extract_negotiation_state(doc: &Value) -> NegotiationState {
    let raw = extract::string_field(doc, STATE_KEYS);
    NegotiationState::from_raw(&raw)
}

/// Everything the orchestrator needs to start one negotiation.
#[derive(Debug, Clone)]
pub struct NegotiationTarget {
    pub asset_id: String,
    /// Offer identifier the ODRL offer snapshot references.
    pub contract_id: String,
    /// Party granting the offer; falls back to the counter-party role when
    /// the catalog record carries no participant id.
    pub assigner: String,
    pub has_agreement: bool,
}

impl NegotiationTarget {
    /// Build a target from an asset's first contract offer.
    ///
    /// Returns `None` when the asset carries no offer with a usable id.
    pub fn from_asset(asset: &Asset, fallback_assigner: &str) -> Option<Self> {
        let offer = asset.contract_offers.first()?;
        let contract_id = if !offer.contract_id.is_empty() {
            offer.contract_id.clone()
        } else if !offer.offer_id.is_empty() {
            offer.offer_id.clone()
        } else {
            return None;
        };
        let assigner = if asset.participant_id.is_empty() {
            fallback_assigner.to_string()
        } else {
            asset.participant_id.clone()
        };
        Some(NegotiationTarget {
            asset_id: asset.id.clone(),
            contract_id,
            assigner,
            has_agreement: asset.has_agreement,
        })
    }
}
