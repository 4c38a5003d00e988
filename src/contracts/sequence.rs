//! Two-phase sequence allocation for contract-definition identifiers.
//!
//! Peek reserves nothing: it reports the next index a user would get and
//! the definition id it maps to. Commit advances the counter only when the
//! caller presents exactly that next index, so two racing writers cannot
//! both claim the same slot; the loser gets a [`CommitOutcome::Conflict`]
//! and must peek again.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::client::ConnectorApi;
use crate::error::{BrowserError, Result};
use crate::extract;

/// Canonical user key: trimmed, lowercased, empty replaced by "user".
pub fn normalize_user_id(raw: &str) -> String {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
        "user".to_string()
    } else {
        normalized
    }
}

/// Definition id a given slot maps to.
pub fn contract_definition_id(user_id: &str, index: u64) -> String {
    format!("{}~{}", normalize_user_id(user_id), index)
}

/// Result of a peek: the slot the user would commit next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceAllocation {
    pub user_id: String,
    pub index: u64,
    pub contract_definition_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The presented index is no longer the next one; a concurrent commit
    /// won the slot.
    Conflict { expected: u64 },
}

#[async_trait]
pub trait SequenceStore: Send + Sync {
    async fn peek(&self, user_id: &str) -> Result<SequenceAllocation>;

    async fn commit(&self, user_id: &str, index: u64) -> Result<CommitOutcome>;
}

/// In-process store keyed by normalized user id. The counter holds the
/// last committed index, so the next slot is always `current + 1`.
#[derive(Default)]
pub struct MemorySequenceStore {
    committed: DashMap<String, u64>,
}

impl MemorySequenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SequenceStore for MemorySequenceStore {
    async fn peek(&self, user_id: &str) -> Result<SequenceAllocation> {
        let user = normalize_user_id(user_id);
        let next = self.committed.get(&user).map(|c| *c).unwrap_or(0) + 1;
        Ok(SequenceAllocation {
            contract_definition_id: contract_definition_id(&user, next),
            user_id: user,
            index: next,
        })
    }

    async fn commit(&self, user_id: &str, index: u64) -> Result<CommitOutcome> {
        let user = normalize_user_id(user_id);
        let mut current = self.committed.entry(user.clone()).or_insert(0);
        if *current + 1 == index {
            *current = index;
            debug!(user = %user, index, "sequence slot committed");
            Ok(CommitOutcome::Committed)
        } else {
            Ok(CommitOutcome::Conflict {
                expected: *current + 1,
            })
        }
    }
}

/// Store backed by the connector's sequence endpoints.
pub struct ConnectorSequenceStore {
    api: Arc<dyn ConnectorApi>,
}

impl ConnectorSequenceStore {
    pub fn new(api: Arc<dyn ConnectorApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SequenceStore for ConnectorSequenceStore {
    async fn peek(&self, user_id: &str) -> Result<SequenceAllocation> {
        let user = normalize_user_id(user_id);
        let doc = self.api.sequence_peek(&user).await?;
        let index = doc
            .get("index")
            .and_then(Value::as_u64)
            .ok_or_else(|| BrowserError::InvalidResponse("sequence peek missing index".into()))?;
        let definition_id = extract::string_field(&doc, &["contractDefinitionId"]);
        Ok(SequenceAllocation {
            contract_definition_id: if definition_id.is_empty() {
                contract_definition_id(&user, index)
            } else {
                definition_id
            },
            user_id: user,
            index,
        })
    }

    async fn commit(&self, user_id: &str, index: u64) -> Result<CommitOutcome> {
        let user = normalize_user_id(user_id);
        match self.api.sequence_commit(&user, index).await {
            Ok(_) => Ok(CommitOutcome::Committed),
            // The connector answers a stale index with a conflict status.
            Err(BrowserError::Remote { status: 409, .. }) => {
                let next = self.peek(&user).await.map(|a| a.index).unwrap_or(index);
                Ok(CommitOutcome::Conflict { expected: next })
            }
            Err(e) => Err(e),
        }
    }
}
