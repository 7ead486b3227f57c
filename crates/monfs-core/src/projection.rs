// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Attribute projection for remote resource objects
//!
//! Each resource type knows how to project itself into an ordered mapping of
//! public scalar attributes. The mapping is what a file read serializes, so
//! ordering must be deterministic: a `BTreeMap` keeps keys sorted, and
//! repeated reads of an unmodified object stay byte-identical.

use std::collections::BTreeMap;

use monfs_api_contract::{Check, Entity};
use serde_json::Value;

/// Projection capability of a remote resource object.
pub trait Describe {
    /// Ordered mapping of the object's public scalar attributes.
    fn describe(&self) -> BTreeMap<String, String>;
}

impl Describe for Entity {
    fn describe(&self) -> BTreeMap<String, String> {
        let mut attrs = BTreeMap::new();
        attrs.insert("id".to_string(), self.id.clone());
        insert_text(&mut attrs, "label", self.label.as_deref());
        insert_text(&mut attrs, "agent_id", self.agent_id.as_deref());
        insert_text(&mut attrs, "uri", self.uri.as_deref());
        fold_extra(&mut attrs, &self.extra);
        attrs
    }
}

impl Describe for Check {
    fn describe(&self) -> BTreeMap<String, String> {
        let mut attrs = BTreeMap::new();
        attrs.insert("id".to_string(), self.id.clone());
        insert_text(&mut attrs, "label", self.label.as_deref());
        insert_text(&mut attrs, "type", self.check_type.as_deref());
        if let Some(period) = self.period {
            attrs.insert("period".to_string(), period.to_string());
        }
        if let Some(timeout) = self.timeout {
            attrs.insert("timeout".to_string(), timeout.to_string());
        }
        if let Some(disabled) = self.disabled {
            attrs.insert("disabled".to_string(), disabled.to_string());
        }
        fold_extra(&mut attrs, &self.extra);
        attrs
    }
}

/// Projection of an optional remote object; an absent object yields an
/// empty mapping.
pub fn project(obj: Option<&dyn Describe>) -> BTreeMap<String, String> {
    obj.map(Describe::describe).unwrap_or_default()
}

/// Pretty JSON rendering of the projection: 2-space indent, stable key
/// order.
pub fn serialize(obj: Option<&dyn Describe>) -> String {
    serde_json::to_string_pretty(&project(obj)).expect("string map serializes")
}

/// Byte length of [`serialize`]'s output, so size metadata and reads agree.
pub fn byte_len(obj: Option<&dyn Describe>) -> u64 {
    serialize(obj).len() as u64
}

fn insert_text(attrs: &mut BTreeMap<String, String>, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        attrs.insert(name.to_string(), value.to_string());
    }
}

fn fold_extra(attrs: &mut BTreeMap<String, String>, extra: &serde_json::Map<String, Value>) {
    for (name, value) in extra {
        if name.starts_with("__") {
            continue;
        }
        if let Some(text) = stringify(value) {
            attrs.insert(name.clone(), text);
        }
    }
}

/// Textual form of a payload value, or `None` for values the projection
/// excludes. Objects are the driver-handle/instance analog and are dropped;
/// nulls are absent attributes; arrays fall back to their compact JSON text.
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) => Some(value.to_string()),
        Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check_with_extras() -> Check {
        serde_json::from_value(json!({
            "id": "chA",
            "label": "ping",
            "type": "remote.ping",
            "period": 60,
            "disabled": false,
            "monitoring_zones_poll": ["mzdfw", "mzord"],
            "details": { "count": 5 },
            "__internal": "hidden",
            "target_alias": null
        }))
        .unwrap()
    }

    #[test]
    fn test_projection_includes_scalars_and_arrays() {
        let attrs = check_with_extras().describe();
        assert_eq!(attrs["id"], "chA");
        assert_eq!(attrs["type"], "remote.ping");
        assert_eq!(attrs["period"], "60");
        assert_eq!(attrs["disabled"], "false");
        assert_eq!(attrs["monitoring_zones_poll"], r#"["mzdfw","mzord"]"#);
    }

    #[test]
    fn test_projection_excludes_objects_internals_and_nulls() {
        let attrs = check_with_extras().describe();
        assert!(!attrs.contains_key("details"));
        assert!(!attrs.contains_key("__internal"));
        assert!(!attrs.contains_key("target_alias"));
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let check = check_with_extras();
        let first = serialize(Some(&check));
        let second = serialize(Some(&check));
        assert_eq!(first, second);
        assert_eq!(byte_len(Some(&check)), first.len() as u64);
    }

    #[test]
    fn test_serialize_uses_two_space_indent() {
        let entity: Entity = serde_json::from_value(json!({ "id": "en1" })).unwrap();
        assert_eq!(serialize(Some(&entity)), "{\n  \"id\": \"en1\"\n}");
    }

    #[test]
    fn test_absent_object_projects_empty() {
        assert!(project(None).is_empty());
        assert_eq!(serialize(None), "{}");
        assert_eq!(byte_len(None), 2);
    }
}
