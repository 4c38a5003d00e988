//! Contract plumbing: agreement status, policy-id resolution, sequence
//! allocation and contract-definition authoring.

pub mod agreements;
pub mod definitions;
pub mod policy;
pub mod sequence;

pub use agreements::{apply_agreement_flags, AgreementSync};
pub use definitions::DefinitionAuthor;
pub use policy::{definition_matches_asset, resolve_policy_ids, PolicyResolver};
pub use sequence::{
    CommitOutcome, ConnectorSequenceStore, MemorySequenceStore, SequenceAllocation, SequenceStore,
};
