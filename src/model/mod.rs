//! Unified data model for the dataspace browser.
//!
//! Raw boundary documents stay as `serde_json::Value`; these types are the
//! normalized view the orchestration core works with.

mod asset;
mod definition;
mod negotiation;

pub use asset::{Asset, AssetOrigin, ContractOffer};
pub use definition::{asset_selector, ContractDefinition, Criterion, ASSET_ID_PROPERTY};
pub use negotiation::{extract_negotiation_state, NegotiationState, NegotiationTarget};
