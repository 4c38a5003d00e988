//! Catalog reconciliation.
//!
//! Normalizes heterogeneous raw records from both asset sources into the
//! unified [`Asset`](crate::model::Asset) view, merges them with
//! `(id, origin)` deduplication and applies client-side search/filtering.

mod filter;
mod normalize;
mod reconcile;

pub use filter::{
    parse_origin, unique_algorithms, unique_formats, unique_frameworks, unique_libraries,
    unique_origins, unique_software, unique_storage_types, unique_subtasks, unique_tasks,
    AssetFilter,
};
pub use normalize::{
    canonical_storage_type, datasets_of, normalize_contract_offers, normalize_dataset,
    normalize_local_asset,
};
pub use reconcile::CatalogReconciler;
