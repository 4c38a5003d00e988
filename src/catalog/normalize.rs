//! Raw-record normalization.
//!
//! Converts one raw record from either source (self-hosted asset records,
//! federated catalog datasets) into exactly one unified [`Asset`]. Pure
//! functions: missing or malformed fields fall back to empty values, never
//! to panics or nulls. Field reads cover the vocabulary spellings both
//! connector generations emit (`plain`, `asset:prop:`, `edc:`, full IRI,
//! and the `daimo` ML vocabulary).

use serde_json::Value;

use crate::extract;
use crate::model::{Asset, AssetOrigin, ContractOffer};

const TAGS_KEYS: &[&str] = &[
    "keywords",
    "asset:prop:keywords",
    "daimo:tags",
    "https://pionera.ai/edc/daimo#tags",
];
const PIPELINE_TAG_KEYS: &[&str] = &[
    "tasks",
    "daimo:pipeline_tag",
    "https://pionera.ai/edc/daimo#pipeline_tag",
];
const LIBRARY_KEYS: &[&str] = &[
    "libraries",
    "daimo:library_name",
    "https://pionera.ai/edc/daimo#library_name",
];
const FRAMEWORK_KEYS: &[&str] = &[
    "frameworks",
    "daimo:library_name",
    "https://pionera.ai/edc/daimo#library_name",
];

/// Canonical storage labels, matched by case-insensitive substring in this
/// priority order; first match wins.
const STORAGE_TYPE_LABELS: &[(&str, &str)] = &[
    ("http", "HttpData"),
    ("s3", "AmazonS3"),
    ("amazon", "AmazonS3"),
    ("azure", "AzureStorage"),
    ("file", "LocalFile"),
    ("local", "LocalFile"),
];

/// Normalize a raw storage-backend descriptor into the canonical label set.
///
/// Empty input stays empty; a descriptor matching no known backend becomes
/// `Unknown` rather than leaking raw vocabulary into the unified view.
pub fn canonical_storage_type(raw: &str) -> String {
    let haystack = raw.trim().to_lowercase();
    if haystack.is_empty() {
        return String::new();
    }
    for (needle, label) in STORAGE_TYPE_LABELS {
        if haystack.contains(needle) {
            return (*label).to_string();
        }
    }
    "Unknown".to_string()
}

/// Convert one raw self-hosted asset record into the unified view.
///
/// Fields may sit flat on the record or inside its `properties` sub-object;
/// both spots are tried, properties first.
pub fn normalize_local_asset(doc: &Value) -> Asset {
    let empty = Value::Null;
    let properties = doc
        .get("properties")
        .or_else(|| doc.get("edc:properties"))
        .unwrap_or(&empty);
    let data_address = doc
        .get("dataAddress")
        .or_else(|| doc.get("edc:dataAddress"))
        .unwrap_or(&empty);

    let id = {
        let direct = extract::string_field(doc, &["@id", "id"]);
        if direct.is_empty() {
            extract::string_field(properties, &["asset:prop:id", "id"])
        } else {
            direct
        }
    };
    let name = prop(doc, properties, &["name", "asset:prop:name", "edc:name"]);
    let storage_raw = extract::string_field(
        data_address,
        &["type", "edc:type", "https://w3id.org/edc/v0.0.1/ns/type"],
    );

    Asset {
        name: if name.is_empty() { id.clone() } else { name },
        version: prop(doc, properties, &["version", "asset:prop:version"]),
        description: prop(doc, properties, &["description", "asset:prop:description"]),
        short_description: prop(
            doc,
            properties,
            &["shortDescription", "asset:prop:shortDescription"],
        ),
        content_type: prop(
            doc,
            properties,
            &["contenttype", "contentType", "asset:prop:contenttype"],
        ),
        byte_size: prop(doc, properties, &["byteSize", "asset:prop:byteSize"]),
        format: prop(doc, properties, &["format", "asset:prop:format"]),
        keywords: prop_list(doc, properties, TAGS_KEYS),
        tasks: prop_list(doc, properties, PIPELINE_TAG_KEYS),
        subtasks: prop_list(doc, properties, &["subtasks"]),
        algorithms: prop_list(doc, properties, &["algorithms"]),
        libraries: prop_list(doc, properties, LIBRARY_KEYS),
        frameworks: prop_list(doc, properties, FRAMEWORK_KEYS),
        storage_type: canonical_storage_type(&storage_raw),
        participant_id: prop(
            doc,
            properties,
            &["participantId", "owner", "asset:prop:owner"],
        ),
        origin: AssetOrigin::Local,
        // The owning party needs no agreement with itself.
        has_agreement: true,
        negotiation_in_progress: false,
        contract_offers: Vec::new(),
        properties: doc.clone(),
        id,
    }
}

/// Convert one federated catalog dataset record into the unified view.
pub fn normalize_dataset(doc: &Value) -> Asset {
    let id = extract::string_field(doc, &["@id", "id"]);
    let id = if id.is_empty() { "unknown".to_string() } else { id };
    let name = extract::string_field(doc, &["name", "dct:title", "title"]);
    let offers = extract::value_list(doc, &["odrl:hasPolicy", "hasPolicy"]);

    Asset {
        name: if name.is_empty() { id.clone() } else { name },
        version: extract::string_field(doc, &["version"]),
        description: extract::string_field(doc, &["description", "dct:description"]),
        short_description: extract::string_field(doc, &["shortDescription"]),
        content_type: extract::string_field(
            doc,
            &[
                "contenttype",
                "daimo:contenttype",
                "https://pionera.ai/edc/daimo#contenttype",
            ],
        ),
        byte_size: extract::string_field(doc, &["byteSize"]),
        format: extract::string_field(doc, &["format"]),
        keywords: extract::list_field(doc, TAGS_KEYS),
        tasks: extract::list_field(doc, PIPELINE_TAG_KEYS),
        subtasks: extract::list_field(doc, &["subtasks"]),
        algorithms: extract::list_field(doc, &["algorithms"]),
        libraries: extract::list_field(doc, LIBRARY_KEYS),
        frameworks: extract::list_field(doc, FRAMEWORK_KEYS),
        storage_type: dataset_storage(doc),
        participant_id: extract::string_field(doc, &["dspace:participantId", "participantId"]),
        origin: AssetOrigin::Federated,
        has_agreement: false,
        negotiation_in_progress: false,
        contract_offers: normalize_contract_offers(&offers),
        properties: doc.clone(),
        id,
    }
}

/// Datasets of a catalog document; one dataset may arrive as a bare object.
pub fn datasets_of(catalog: &Value) -> Vec<Value> {
    extract::value_list(catalog, &["dcat:dataset", "dataset"])
}

/// Convert raw policy offers into typed contract offers.
///
/// An offer may embed its policy directly or wrap it under `policy`; the
/// policy identifiers are usually absent from catalog offers and resolved
/// later against the known contract definitions.
pub fn normalize_contract_offers(raw_offers: &[Value]) -> Vec<ContractOffer> {
    raw_offers
        .iter()
        .map(|raw| {
            let empty = Value::Null;
            let raw_policy = raw.get("policy").unwrap_or(raw);
            let contract_id = {
                let direct = extract::string_field(raw, &["contractId", "@id"]);
                if direct.is_empty() {
                    extract::string_field(raw_policy, &["@id"])
                } else {
                    direct
                }
            };
            let offer_id = {
                let direct = extract::string_field(raw, &["@id"]);
                if direct.is_empty() {
                    contract_id.clone()
                } else {
                    direct
                }
            };
            let wrap = |policy: &Value| {
                if policy.is_null() {
                    serde_json::json!({ "policy": raw_policy })
                } else {
                    policy.clone()
                }
            };
            ContractOffer {
                offer_id,
                contract_id,
                access_policy_id: extract::string_field(
                    raw,
                    &["accessPolicyId", "edc:accessPolicyId"],
                ),
                contract_policy_id: extract::string_field(
                    raw,
                    &["contractPolicyId", "edc:contractPolicyId"],
                ),
                access_policy: wrap(raw.get("accessPolicy").unwrap_or(&empty)),
                contract_policy: wrap(raw.get("contractPolicy").unwrap_or(&empty)),
                has_agreement: false,
                negotiation_in_progress: false,
            }
        })
        .collect()
}

fn prop(doc: &Value, properties: &Value, keys: &[&str]) -> String {
    let from_properties = extract::string_field(properties, keys);
    if from_properties.is_empty() {
        extract::string_field(doc, keys)
    } else {
        from_properties
    }
}

fn prop_list(doc: &Value, properties: &Value, keys: &[&str]) -> Vec<String> {
    let from_properties = extract::list_field(properties, keys);
    if from_properties.is_empty() {
        extract::list_field(doc, keys)
    } else {
        from_properties
    }
}

fn dataset_storage(doc: &Value) -> String {
    let distributions = extract::value_list(doc, &["dcat:distribution", "distribution"]);
    let Some(first) = distributions.first() else {
        return String::new();
    };
    let raw = first
        .get("dct:format")
        .or_else(|| first.get("format"))
        .and_then(|v| extract::identifier_of(v, &["@id", "id"]))
        .unwrap_or_default();
    canonical_storage_type(&raw)
}
