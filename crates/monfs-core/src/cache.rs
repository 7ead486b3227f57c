// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Path-keyed store of materialized nodes
//!
//! The cache is the single source of truth for metadata queries and reads:
//! a path is addressable once its parent has been listed, and never before.
//! Entries are never removed or replaced, so the map only grows for the
//! life of the mount. No size bound is imposed; monitoring hierarchies are
//! small enough that unbounded growth is an accepted tradeoff.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::node::VNode;

pub struct NodeCache {
    nodes: Mutex<HashMap<String, Arc<VNode>>>,
}

impl NodeCache {
    /// A cache holding exactly the root directory.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert("/".to_string(), Arc::new(VNode::directory("/", None)));
        Self {
            nodes: Mutex::new(nodes),
        }
    }

    pub fn get(&self, path: &str) -> Option<Arc<VNode>> {
        self.nodes.lock().unwrap().get(path).cloned()
    }

    pub fn exists(&self, path: &str) -> bool {
        self.nodes.lock().unwrap().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.nodes.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.lock().unwrap().is_empty()
    }

    /// Insert a node, keeping any existing entry for the path. Paths are
    /// stable identities within a session, so the first materialization
    /// wins and re-insertion from a repeated listing is a no-op.
    pub fn insert(&self, node: VNode) -> Arc<VNode> {
        let mut nodes = self.nodes.lock().unwrap();
        Self::insert_locked(&mut nodes, node)
    }

    /// Commit a batch of freshly discovered children under one lock
    /// acquisition, so a listing publishes its children as a unit.
    pub fn insert_all(&self, batch: Vec<VNode>) {
        let mut nodes = self.nodes.lock().unwrap();
        for node in batch {
            Self::insert_locked(&mut nodes, node);
        }
    }

    fn insert_locked(nodes: &mut HashMap<String, Arc<VNode>>, node: VNode) -> Arc<VNode> {
        match nodes.entry(node.path().to_string()) {
            Entry::Occupied(existing) => {
                if existing.get().kind() != node.kind() {
                    warn!(
                        path = node.path(),
                        "refusing to replace cached node with a different kind"
                    );
                }
                Arc::clone(existing.get())
            }
            Entry::Vacant(slot) => Arc::clone(slot.insert(Arc::new(node))),
        }
    }
}

impl Default for NodeCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    #[test]
    fn test_root_is_seeded() {
        let cache = NodeCache::new();
        assert_eq!(cache.len(), 1);
        assert!(!cache.is_empty());
        let root = cache.get("/").unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_insert_is_first_write_wins() {
        let cache = NodeCache::new();
        let first = cache.insert(VNode::directory("/en1", None));
        let second = cache.insert(VNode::directory("/en1", None));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_kind_conflict_keeps_original() {
        let cache = NodeCache::new();
        cache.insert(VNode::directory("/en1", None));
        let check = serde_json::from_value(serde_json::json!({ "id": "chA" })).unwrap();
        let kept = cache.insert(VNode::file(
            "/en1",
            crate::node::RemoteRef::Check(Arc::new(check)),
        ));
        assert_eq!(kept.kind(), NodeKind::Directory);
        assert!(cache.get("/en1").unwrap().is_dir());
    }

    #[test]
    fn test_insert_all_publishes_every_child() {
        let cache = NodeCache::new();
        cache.insert_all(vec![
            VNode::directory("/en1", None),
            VNode::directory("/en2", None),
        ]);
        assert!(cache.exists("/en1"));
        assert!(cache.exists("/en2"));
        assert_eq!(cache.len(), 3);
    }
}
