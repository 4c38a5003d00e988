//! Dataspace browser - client-side orchestration for an EDC connector pair
//!
//! Browses data assets across a dataspace (self-hosted and federated),
//! negotiates contracts for external assets over the dataspace protocol,
//! and authors contract definitions for local assets with collision-free
//! identifiers.
//!
//! ## Components
//!
//! - **Catalog**: concurrent local/federated fetch, normalization of
//!   vocabulary-drifting JSON-LD records, client-side filtering
//! - **Contracts**: agreement synchronization, policy-id resolution,
//!   two-phase (peek/commit) sequence allocation, definition authoring
//! - **Negotiation**: bounded status polling with an at-most-one-in-flight
//!   guard per asset

pub mod browser;
pub mod catalog;
pub mod client;
pub mod config;
pub mod contracts;
pub mod error;
pub mod extract;
pub mod model;
pub mod negotiation;
pub mod state;

pub use browser::DataspaceBrowser;
pub use config::Args;
pub use error::{BrowserError, Result};
