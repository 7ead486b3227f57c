// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Path-shape classification
//!
//! The tree has a fixed depth, so every incoming path falls into a closed
//! set of shapes. Classification anchors on exact segment depth; there is
//! no prefix matching and no ordering ambiguity between shapes.

/// Name of the synthetic file exposing a check's serialized fields.
pub const ATTRIBUTES_LEAF: &str = "attributes";

/// Path shapes the tree can contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathKind {
    Root,
    Entity(String),
    EntityCheck(String, String),
    AttributesLeaf(String, String),
    Unknown,
}

/// Classify an absolute slash-separated path.
pub fn classify(path: &str) -> PathKind {
    if path == "/" {
        return PathKind::Root;
    }
    let Some(rest) = path.strip_prefix('/') else {
        return PathKind::Unknown;
    };
    let segments: Vec<&str> = rest.split('/').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return PathKind::Unknown;
    }
    match segments.as_slice() {
        [entity] => PathKind::Entity((*entity).to_string()),
        [entity, check] => PathKind::EntityCheck((*entity).to_string(), (*check).to_string()),
        [entity, check, leaf] if *leaf == ATTRIBUTES_LEAF => {
            PathKind::AttributesLeaf((*entity).to_string(), (*check).to_string())
        }
        _ => PathKind::Unknown,
    }
}
