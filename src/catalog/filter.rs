//! Client-side search and structured filtering.
//!
//! Each non-empty filter requires at least one membership match against the
//! asset's corresponding list; all active predicates are combined with AND.
//! Facet helpers collect the distinct values a filter UI can offer.

use std::collections::BTreeSet;

use crate::model::{Asset, AssetOrigin};

/// Search text plus structured filter criteria.
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    pub search_term: Option<String>,
    pub tasks: Vec<String>,
    pub subtasks: Vec<String>,
    pub algorithms: Vec<String>,
    pub libraries: Vec<String>,
    pub frameworks: Vec<String>,
    pub storage_types: Vec<String>,
    /// Union filter over libraries and frameworks.
    pub software: Vec<String>,
    pub origins: Vec<AssetOrigin>,
    pub formats: Vec<String>,
}

impl AssetFilter {
    pub fn is_empty(&self) -> bool {
        self.search_term
            .as_deref()
            .map_or(true, |term| term.trim().is_empty())
            && self.tasks.is_empty()
            && self.subtasks.is_empty()
            && self.algorithms.is_empty()
            && self.libraries.is_empty()
            && self.frameworks.is_empty()
            && self.storage_types.is_empty()
            && self.software.is_empty()
            && self.origins.is_empty()
            && self.formats.is_empty()
    }

    /// AND of all active predicates.
    pub fn matches(&self, asset: &Asset) -> bool {
        if let Some(term) = self.search_term.as_deref() {
            let needle = term.trim().to_lowercase();
            if !needle.is_empty() && !search_hit(asset, &needle) {
                return false;
            }
        }
        if !self.tasks.is_empty() && !intersects(&asset.tasks, &self.tasks) {
            return false;
        }
        if !self.subtasks.is_empty() && !intersects(&asset.subtasks, &self.subtasks) {
            return false;
        }
        if !self.algorithms.is_empty() && !intersects(&asset.algorithms, &self.algorithms) {
            return false;
        }
        if !self.libraries.is_empty() && !intersects(&asset.libraries, &self.libraries) {
            return false;
        }
        if !self.frameworks.is_empty() && !intersects(&asset.frameworks, &self.frameworks) {
            return false;
        }
        if !self.storage_types.is_empty()
            && (asset.storage_type.is_empty()
                || !self.storage_types.contains(&asset.storage_type))
        {
            return false;
        }
        if !self.software.is_empty()
            && !intersects(&asset.libraries, &self.software)
            && !intersects(&asset.frameworks, &self.software)
        {
            return false;
        }
        if !self.origins.is_empty() && !self.origins.contains(&asset.origin) {
            return false;
        }
        if !self.formats.is_empty()
            && (asset.format.is_empty() || !self.formats.contains(&asset.format))
        {
            return false;
        }
        true
    }
}

fn search_hit(asset: &Asset, needle: &str) -> bool {
    asset.name.to_lowercase().contains(needle)
        || asset.description.to_lowercase().contains(needle)
        || asset.short_description.to_lowercase().contains(needle)
        || asset
            .keywords
            .iter()
            .any(|k| k.to_lowercase().contains(needle))
}

fn intersects(values: &[String], wanted: &[String]) -> bool {
    values.iter().any(|v| wanted.contains(v))
}

/// Parse a user-facing origin label ("Local Asset" / "External Asset",
/// also accepted in short form).
pub fn parse_origin(label: &str) -> Option<AssetOrigin> {
    match label.trim().to_lowercase().as_str() {
        "local asset" | "local" => Some(AssetOrigin::Local),
        "external asset" | "external" | "federated" => Some(AssetOrigin::Federated),
        _ => None,
    }
}

fn distinct_sorted<F>(assets: &[Asset], select: F) -> Vec<String>
where
    F: Fn(&Asset) -> Vec<String>,
{
    let mut values = BTreeSet::new();
    for asset in assets {
        values.extend(select(asset));
    }
    values.into_iter().collect()
}

pub fn unique_tasks(assets: &[Asset]) -> Vec<String> {
    distinct_sorted(assets, |a| a.tasks.clone())
}

pub fn unique_subtasks(assets: &[Asset]) -> Vec<String> {
    distinct_sorted(assets, |a| a.subtasks.clone())
}

pub fn unique_algorithms(assets: &[Asset]) -> Vec<String> {
    distinct_sorted(assets, |a| a.algorithms.clone())
}

pub fn unique_libraries(assets: &[Asset]) -> Vec<String> {
    distinct_sorted(assets, |a| a.libraries.clone())
}

pub fn unique_frameworks(assets: &[Asset]) -> Vec<String> {
    distinct_sorted(assets, |a| a.frameworks.clone())
}

pub fn unique_storage_types(assets: &[Asset]) -> Vec<String> {
    distinct_sorted(assets, |a| {
        if a.storage_type.is_empty() {
            vec![]
        } else {
            vec![a.storage_type.clone()]
        }
    })
}

pub fn unique_software(assets: &[Asset]) -> Vec<String> {
    distinct_sorted(assets, |a| {
        let mut software = a.libraries.clone();
        software.extend(a.frameworks.clone());
        software
    })
}

pub fn unique_origins(assets: &[Asset]) -> Vec<String> {
    distinct_sorted(assets, |a| vec![a.origin.label().to_string()])
}

pub fn unique_formats(assets: &[Asset]) -> Vec<String> {
    distinct_sorted(assets, |a| {
        if a.format.is_empty() {
            vec![]
        } else {
            vec![a.format.clone()]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn asset(id: &str, origin: AssetOrigin) -> Asset {
        Asset {
            id: id.to_string(),
            name: format!("{} model", id),
            version: String::new(),
            description: "an image classifier".to_string(),
            short_description: String::new(),
            content_type: String::new(),
            byte_size: String::new(),
            format: String::new(),
            keywords: vec!["vision".to_string()],
            tasks: vec!["classification".to_string()],
            subtasks: vec![],
            algorithms: vec![],
            libraries: vec!["pytorch".to_string()],
            frameworks: vec!["onnx".to_string()],
            storage_type: "HttpData".to_string(),
            participant_id: String::new(),
            origin,
            has_agreement: false,
            negotiation_in_progress: false,
            contract_offers: vec![],
            properties: json!({}),
        }
    }

    #[test]
    fn search_is_case_insensitive_over_text_and_keywords() {
        let a = asset("resnet", AssetOrigin::Local);
        let mut filter = AssetFilter {
            search_term: Some("RESNET".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&a));
        filter.search_term = Some("VISION".to_string());
        assert!(filter.matches(&a));
        filter.search_term = Some("audio".to_string());
        assert!(!filter.matches(&a));
    }

    #[test]
    fn predicates_combine_with_and() {
        let a = asset("resnet", AssetOrigin::Local);
        let filter = AssetFilter {
            tasks: vec!["classification".to_string()],
            libraries: vec!["tensorflow".to_string()],
            ..Default::default()
        };
        // task matches but library does not
        assert!(!filter.matches(&a));
    }

    #[test]
    fn software_filter_spans_libraries_and_frameworks() {
        let a = asset("resnet", AssetOrigin::Local);
        let filter = AssetFilter {
            software: vec!["onnx".to_string()],
            ..Default::default()
        };
        assert!(filter.matches(&a));
    }

    #[test]
    fn origin_filter_uses_origin_membership() {
        let local = asset("a", AssetOrigin::Local);
        let federated = asset("a", AssetOrigin::Federated);
        let filter = AssetFilter {
            origins: vec![AssetOrigin::Federated],
            ..Default::default()
        };
        assert!(!filter.matches(&local));
        assert!(filter.matches(&federated));
    }

    #[test]
    fn origin_labels_parse() {
        assert_eq!(parse_origin("Local Asset"), Some(AssetOrigin::Local));
        assert_eq!(parse_origin("external"), Some(AssetOrigin::Federated));
        assert_eq!(parse_origin("weird"), None);
    }

    #[test]
    fn facets_are_sorted_and_distinct() {
        let assets = vec![
            asset("b", AssetOrigin::Local),
            asset("a", AssetOrigin::Federated),
        ];
        assert_eq!(unique_tasks(&assets), vec!["classification"]);
        assert_eq!(unique_software(&assets), vec!["onnx", "pytorch"]);
        assert_eq!(
            unique_origins(&assets),
            vec!["External Asset", "Local Asset"]
        );
    }
}
