//! Multi-key field extraction over loosely structured JSON documents.
//!
//! The connector boundary speaks several vocabulary spellings for the same
//! semantic field (plain, `edc:`-prefixed, full IRI). Every read tries an
//! ordered candidate list and falls back to an empty value instead of
//! failing, so schema/vocabulary drift at the boundary never propagates as
//! nulls or panics.

use serde_json::Value;

/// First non-empty scalar found under any of `keys`, as a trimmed string.
///
/// Numbers are accepted and stringified; absence yields an empty string.
pub fn string_field(doc: &Value, keys: &[&str]) -> String {
    for key in keys {
        if let Some(text) = doc.get(key).and_then(scalar_string) {
            return text;
        }
    }
    String::new()
}

/// First value found under any of `keys`, collapsed into a list of strings.
///
/// A scalar collapses into a one-element list; absence becomes an empty
/// list. Duplicates within one list are dropped, order preserved.
pub fn list_field(doc: &Value, keys: &[&str]) -> Vec<String> {
    for key in keys {
        match doc.get(key) {
            Some(Value::Array(items)) => {
                let mut out = Vec::new();
                for item in items {
                    if let Some(text) = scalar_string(item) {
                        push_unique(&mut out, text);
                    }
                }
                if !out.is_empty() {
                    return out;
                }
            }
            Some(value) => {
                if let Some(text) = scalar_string(value) {
                    return vec![text];
                }
            }
            None => {}
        }
    }
    Vec::new()
}

/// Identifier carried either as a plain string or as a tagged object
/// exposing it under one of `object_keys` (`@value`, `@id`, `id`, ...).
pub fn identifier_of(value: &Value, object_keys: &[&str]) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(_) => {
            for key in object_keys {
                if let Some(text) = value.get(key).and_then(scalar_string) {
                    return Some(text);
                }
            }
            None
        }
        _ => None,
    }
}

/// Collapse an array-or-scalar value under any of `keys` into a vector of
/// raw values. Used for fields that may carry one record or many.
pub fn value_list(doc: &Value, keys: &[&str]) -> Vec<Value> {
    for key in keys {
        match doc.get(key) {
            Some(Value::Array(items)) if !items.is_empty() => return items.clone(),
            Some(Value::Null) | None => {}
            Some(Value::Array(_)) => {}
            Some(value) => return vec![value.clone()],
        }
    }
    Vec::new()
}

/// Items of a listing response, absorbing the response-shape drift the
/// management API exhibits: a bare array, a wrapper object (`results`,
/// `items`, `contractAgreements`, `@graph`), or a single record.
pub fn collection_items(doc: &Value) -> Vec<Value> {
    match doc {
        Value::Null => Vec::new(),
        Value::Array(items) => items.clone(),
        Value::Object(_) => {
            for key in ["results", "items", "contractAgreements", "@graph"] {
                if let Some(Value::Array(items)) = doc.get(key) {
                    return items.clone();
                }
            }
            vec![doc.clone()]
        }
        _ => Vec::new(),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_field_tries_candidates_in_order() {
        let doc = json!({ "edc:name": "fallback", "name": "primary" });
        assert_eq!(string_field(&doc, &["name", "edc:name"]), "primary");
        assert_eq!(string_field(&doc, &["missing", "edc:name"]), "fallback");
        assert_eq!(string_field(&doc, &["missing"]), "");
    }

    #[test]
    fn string_field_skips_empty_and_accepts_numbers() {
        let doc = json!({ "name": "  ", "byteSize": 1024 });
        assert_eq!(string_field(&doc, &["name", "byteSize"]), "1024");
    }

    #[test]
    fn list_field_collapses_scalar_into_one_element() {
        let doc = json!({ "tags": "classification" });
        assert_eq!(list_field(&doc, &["tags"]), vec!["classification"]);
    }

    #[test]
    fn list_field_dedupes_and_drops_non_scalars() {
        let doc = json!({ "tags": ["nlp", "nlp", {"nested": true}, "vision"] });
        assert_eq!(list_field(&doc, &["tags"]), vec!["nlp", "vision"]);
    }

    #[test]
    fn list_field_absent_is_empty() {
        assert!(list_field(&json!({}), &["tags"]).is_empty());
    }

    #[test]
    fn identifier_of_reads_strings_and_tagged_objects() {
        assert_eq!(
            identifier_of(&json!("asset-1"), &["@id"]),
            Some("asset-1".to_string())
        );
        assert_eq!(
            identifier_of(&json!({ "@value": "asset-2" }), &["@value", "@id"]),
            Some("asset-2".to_string())
        );
        assert_eq!(identifier_of(&json!({ "other": "x" }), &["@id"]), None);
        assert_eq!(identifier_of(&json!(42), &["@id"]), None);
    }

    #[test]
    fn collection_items_absorbs_wrapper_shapes() {
        assert_eq!(collection_items(&json!([1, 2])).len(), 2);
        assert_eq!(collection_items(&json!({ "results": [1] })).len(), 1);
        assert_eq!(collection_items(&json!({ "@graph": [1, 2, 3] })).len(), 3);
        // A single record without a known wrapper key is itself the listing.
        assert_eq!(collection_items(&json!({ "assetId": "a" })).len(), 1);
        assert!(collection_items(&Value::Null).is_empty());
    }
}
