//! Error types for the dataspace browser.
//!
//! One central enum covers the boundary taxonomy: transport failures,
//! non-2xx remote responses, total catalog loss, protocol terminal failures
//! and precondition violations. Degraded-but-safe conditions (one catalog
//! source down, polling budget exhausted) are not errors; they surface as
//! warnings or as [`NegotiationOutcome`](crate::negotiation::NegotiationOutcome)
//! variants instead.

use crate::model::NegotiationState;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Catalog unavailable: local listing failed ({local}); federated catalog failed ({federated})")]
    CatalogUnavailable { local: String, federated: String },

    #[error("Contract negotiation failed ({0})")]
    NegotiationFailed(NegotiationState),

    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for BrowserError {
    fn from(err: reqwest::Error) -> Self {
        BrowserError::Transport(err.to_string())
    }
}
