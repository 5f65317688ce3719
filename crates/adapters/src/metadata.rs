// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Metadata cleaning for the storage stage (§4.3 "Storage", §9): vector
//! stores accept only scalars, so list values are joined with a delimiter,
//! nested maps are serialized to string, and null values are dropped. This
//! is the one canonical place that flattens — individual parsers and
//! extractors emit arbitrary JSON and never need to know about this rule.

use std::collections::BTreeMap;

const LIST_JOIN_DELIMITER: &str = ", ";

/// A vector-store-safe scalar: string, integer, float, or boolean.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

/// Flatten an arbitrary JSON metadata map down to scalars only, dropping
/// null values.
pub fn clean_metadata(raw: &BTreeMap<String, serde_json::Value>) -> BTreeMap<String, MetadataValue> {
    raw.iter().filter_map(|(k, v)| clean_value(v).map(|cleaned| (k.clone(), cleaned))).collect()
}

fn clean_value(value: &serde_json::Value) -> Option<MetadataValue> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(MetadataValue::Boolean(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(MetadataValue::Integer(i))
            } else {
                n.as_f64().map(MetadataValue::Float)
            }
        }
        serde_json::Value::String(s) => Some(MetadataValue::String(s.clone())),
        serde_json::Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) => Some(s.clone()),
                    other => clean_value(other).map(|v| scalar_to_string(&v)),
                })
                .collect::<Vec<_>>()
                .join(LIST_JOIN_DELIMITER);
            Some(MetadataValue::String(joined))
        }
        serde_json::Value::Object(_) => Some(MetadataValue::String(value.to_string())),
    }
}

fn scalar_to_string(value: &MetadataValue) -> String {
    match value {
        MetadataValue::String(s) => s.clone(),
        MetadataValue::Integer(i) => i.to_string(),
        MetadataValue::Float(f) => f.to_string(),
        MetadataValue::Boolean(b) => b.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(pairs: Vec<(&str, serde_json::Value)>) -> BTreeMap<String, serde_json::Value> {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn null_values_are_dropped() {
        let cleaned = clean_metadata(&map(vec![("a", json!(null)), ("b", json!(1))]));
        assert!(!cleaned.contains_key("a"));
        assert_eq!(cleaned["b"], MetadataValue::Integer(1));
    }

    #[test]
    fn list_values_are_joined() {
        let cleaned = clean_metadata(&map(vec![("tags", json!(["a", "b", "c"]))]));
        assert_eq!(cleaned["tags"], MetadataValue::String("a, b, c".to_string()));
    }

    #[test]
    fn nested_maps_are_serialized_to_string() {
        let cleaned = clean_metadata(&map(vec![("nested", json!({"x": 1}))]));
        assert!(matches!(cleaned["nested"], MetadataValue::String(_)));
    }

    #[test]
    fn scalars_pass_through_by_type() {
        let cleaned = clean_metadata(&map(vec![
            ("s", json!("hi")),
            ("i", json!(42)),
            ("f", json!(1.5)),
            ("b", json!(true)),
        ]));
        assert_eq!(cleaned["s"], MetadataValue::String("hi".to_string()));
        assert_eq!(cleaned["i"], MetadataValue::Integer(42));
        assert_eq!(cleaned["f"], MetadataValue::Float(1.5));
        assert_eq!(cleaned["b"], MetadataValue::Boolean(true));
    }
}
