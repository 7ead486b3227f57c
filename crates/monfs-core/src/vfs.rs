// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Virtual filesystem facade
//!
//! `MonFsCore` adapts the node cache and the remote client to the fixed
//! operation set a file-tree driver needs: metadata queries, reads,
//! directory listings, and a fixed capacity report. Listing a directory is
//! the only operation that mutates the cache; it fetches the directory's
//! children from the remote service before publishing any of them, so a
//! failed remote call leaves the cache exactly as it was.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::NodeCache;
use crate::config::FsConfig;
use crate::error::{FsError, FsResult};
use crate::node::{RemoteRef, VNode};
use crate::router::{classify, PathKind, ATTRIBUTES_LEAF};
use crate::types::{Attributes, DirEntry, FsStatvfs, MonitoringApi};

pub struct MonFsCore {
    config: FsConfig,
    client: Arc<dyn MonitoringApi>,
    nodes: NodeCache,
    uid: u32,
    gid: u32,
}

impl MonFsCore {
    pub fn new(config: FsConfig, client: Arc<dyn MonitoringApi>) -> Self {
        let uid = config.security.default_uid.unwrap_or_else(current_uid);
        let gid = config.security.default_gid.unwrap_or_else(current_gid);
        Self {
            config,
            client,
            nodes: NodeCache::new(),
            uid,
            gid,
        }
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    pub fn exists(&self, path: &str) -> bool {
        self.nodes.exists(path)
    }

    /// Metadata for a previously discovered path.
    pub fn getattr(&self, path: &str) -> FsResult<Attributes> {
        let node = self.nodes.get(path).ok_or(FsError::NotFound)?;
        Ok(node.attributes(self.uid, self.gid))
    }

    /// Content of a file node, sliced to the requested window.
    pub fn read(&self, path: &str, offset: u64, size: u32) -> FsResult<Vec<u8>> {
        let node = self.nodes.get(path).ok_or(FsError::NotFound)?;
        let content = node.read()?;
        let start = (offset as usize).min(content.len());
        let end = start.saturating_add(size as usize).min(content.len());
        Ok(content[start..end].to_vec())
    }

    /// List a directory, lazily materializing its children.
    pub fn readdir(&self, path: &str) -> FsResult<Vec<DirEntry>> {
        match classify(path) {
            PathKind::Root => self.list_root(),
            PathKind::Entity(_) => self.list_entity(path),
            PathKind::EntityCheck(entity_id, check_id) => {
                self.list_check(path, &entity_id, &check_id)
            }
            PathKind::AttributesLeaf(_, _) | PathKind::Unknown => {
                // Defensive default; the dispatch layer should never route a
                // listing at a file or an out-of-shape path.
                warn!(path, "listing requested outside the tree shape");
                Ok(dots())
            }
        }
    }

    /// Fixed small capacity report.
    pub fn statfs(&self) -> FsStatvfs {
        FsStatvfs {
            f_bsize: 512,
            f_frsize: 512,
            f_blocks: 4096,
            f_bfree: 2048,
            f_bavail: 2048,
            f_files: 0,
            f_ffree: 0,
            f_namemax: 255,
        }
    }

    fn list_root(&self) -> FsResult<Vec<DirEntry>> {
        let entities = self.client.list_entities()?;
        debug!(count = entities.len(), "materializing entity directories");

        let mut listing = dots();
        let mut discovered = Vec::with_capacity(entities.len());
        for entity in entities {
            listing.push(DirEntry {
                name: entity.id.clone(),
                is_dir: true,
                len: 0,
            });
            let child = format!("/{}", entity.id);
            discovered.push(VNode::directory(child, Some(RemoteRef::Entity(Arc::new(entity)))));
        }
        self.nodes.insert_all(discovered);
        Ok(listing)
    }

    fn list_entity(&self, path: &str) -> FsResult<Vec<DirEntry>> {
        let node = self.nodes.get(path).ok_or(FsError::NotFound)?;
        let entity = match node.remote() {
            Some(RemoteRef::Entity(entity)) => Arc::clone(entity),
            _ => return Err(FsError::NotFound),
        };

        let checks = self.client.list_checks(&entity)?;
        debug!(entity = %entity.id, count = checks.len(), "materializing check directories");

        let mut listing = dots();
        let mut discovered = Vec::with_capacity(checks.len());
        for check in checks {
            listing.push(DirEntry {
                name: check.id.clone(),
                is_dir: true,
                len: 0,
            });
            let child = format!("{}/{}", path, check.id);
            discovered.push(VNode::directory(child, Some(RemoteRef::Check(Arc::new(check)))));
        }
        self.nodes.insert_all(discovered);
        Ok(listing)
    }

    fn list_check(&self, path: &str, entity_id: &str, check_id: &str) -> FsResult<Vec<DirEntry>> {
        let check = self.client.get_check(entity_id, check_id)?;
        debug!(entity = entity_id, check = check_id, "materializing attributes leaf");

        let leaf = VNode::file(
            format!("{}/{}", path, ATTRIBUTES_LEAF),
            RemoteRef::Check(Arc::new(check)),
        );
        let len = leaf.size();

        let mut listing = dots();
        listing.push(DirEntry {
            name: ATTRIBUTES_LEAF.to_string(),
            is_dir: false,
            len,
        });
        self.nodes.insert_all(vec![leaf]);
        Ok(listing)
    }
}

fn dots() -> Vec<DirEntry> {
    vec![
        DirEntry {
            name: ".".to_string(),
            is_dir: true,
            len: 0,
        },
        DirEntry {
            name: "..".to_string(),
            is_dir: true,
            len: 0,
        },
    ]
}

fn current_uid() -> u32 {
    unsafe { libc::getuid() }
}

fn current_gid() -> u32 {
    unsafe { libc::getgid() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MockMonitoringApi;
    use monfs_api_contract::{Check, Entity};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn entity(id: &str) -> Entity {
        serde_json::from_value(json!({
            "id": id,
            "label": format!("{} label", id),
            "agent_id": "ag7"
        }))
        .unwrap()
    }

    fn check(id: &str) -> Check {
        serde_json::from_value(json!({
            "id": id,
            "label": format!("{} label", id),
            "type": "remote.ping",
            "period": 60
        }))
        .unwrap()
    }

    fn names(listing: &[DirEntry]) -> Vec<&str> {
        listing.iter().map(|entry| entry.name.as_str()).collect()
    }

    fn core_with(client: MockMonitoringApi) -> MonFsCore {
        MonFsCore::new(FsConfig::default(), Arc::new(client))
    }

    #[test]
    fn test_root_listing_makes_entities_addressable() {
        let mut client = MockMonitoringApi::new();
        client
            .expect_list_entities()
            .returning(|| Ok(vec![entity("en1"), entity("en2")]));
        let core = core_with(client);

        let listing = core.readdir("/").unwrap();
        assert_eq!(names(&listing), vec![".", "..", "en1", "en2"]);

        for id in ["en1", "en2"] {
            let attrs = core.getattr(&format!("/{}", id)).unwrap();
            assert!(attrs.is_dir);
        }
    }

    #[test]
    fn test_check_listing_exposes_attributes_leaf() {
        let mut client = MockMonitoringApi::new();
        client.expect_list_entities().returning(|| Ok(vec![entity("en1")]));
        client
            .expect_list_checks()
            .returning(|_| Ok(vec![check("chA")]));
        client
            .expect_get_check()
            .returning(|_, check_id| Ok(check(check_id)));
        let core = core_with(client);

        core.readdir("/").unwrap();
        let listing = core.readdir("/en1").unwrap();
        assert_eq!(names(&listing), vec![".", "..", "chA"]);

        let listing = core.readdir("/en1/chA").unwrap();
        assert_eq!(names(&listing), vec![".", "..", "attributes"]);
    }

    #[test]
    fn test_attributes_read_matches_projection() {
        let mut client = MockMonitoringApi::new();
        client.expect_list_entities().returning(|| Ok(vec![entity("en1")]));
        client
            .expect_list_checks()
            .returning(|_| Ok(vec![check("chA")]));
        client
            .expect_get_check()
            .returning(|_, check_id| Ok(check(check_id)));
        let core = core_with(client);

        core.readdir("/").unwrap();
        core.readdir("/en1").unwrap();
        core.readdir("/en1/chA").unwrap();

        let content = core.read("/en1/chA/attributes", 0, u32::MAX).unwrap();
        let decoded: BTreeMap<String, String> = serde_json::from_slice(&content).unwrap();
        let expected = crate::projection::project(Some(&check("chA")));
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_repeated_root_listing_is_idempotent() {
        let mut client = MockMonitoringApi::new();
        client
            .expect_list_entities()
            .times(2)
            .returning(|| Ok(vec![entity("en1")]));
        let core = core_with(client);

        let first = core.readdir("/").unwrap();
        let before = core.nodes.get("/en1").unwrap();
        let second = core.readdir("/").unwrap();
        let after = core.nodes.get("/en1").unwrap();

        assert_eq!(first, second);
        assert_eq!(core.nodes.len(), 2);
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_undiscovered_paths_are_not_addressable() {
        let mut client = MockMonitoringApi::new();
        client.expect_list_entities().returning(|| Ok(vec![entity("en1")]));
        let core = core_with(client);

        // The entity would exist after a root listing, but none has run yet.
        assert!(matches!(core.getattr("/en1"), Err(FsError::NotFound)));
        assert!(matches!(core.readdir("/en1"), Err(FsError::NotFound)));

        core.readdir("/").unwrap();
        assert!(core.getattr("/en1").is_ok());
        // Deeper paths still need their own parent listed first.
        assert!(matches!(
            core.getattr("/en1/chA"),
            Err(FsError::NotFound)
        ));
    }

    #[test]
    fn test_end_to_end_walk() {
        let mut client = MockMonitoringApi::new();
        client.expect_list_entities().returning(|| Ok(vec![entity("en1")]));
        client
            .expect_list_checks()
            .withf(|entity| entity.id == "en1")
            .returning(|_| Ok(vec![check("chA"), check("chB")]));
        client
            .expect_get_check()
            .withf(|entity_id, check_id| entity_id == "en1" && check_id == "chA")
            .returning(|_, check_id| Ok(check(check_id)));
        let core = core_with(client);

        assert_eq!(names(&core.readdir("/").unwrap()), vec![".", "..", "en1"]);
        assert_eq!(
            names(&core.readdir("/en1").unwrap()),
            vec![".", "..", "chA", "chB"]
        );
        assert_eq!(
            names(&core.readdir("/en1/chA").unwrap()),
            vec![".", "..", "attributes"]
        );

        let content = core.read("/en1/chA/attributes", 0, u32::MAX).unwrap();
        assert!(serde_json::from_slice::<serde_json::Value>(&content).is_ok());

        let attrs = core.getattr("/en1/chA/attributes").unwrap();
        assert!(!attrs.is_dir);
        assert_eq!(attrs.len, content.len() as u64);
    }

    #[test]
    fn test_failed_listing_leaves_cache_untouched() {
        let mut client = MockMonitoringApi::new();
        client
            .expect_list_entities()
            .returning(|| Err(FsError::RemoteUnavailable("connection refused".to_string())));
        let core = core_with(client);

        let result = core.readdir("/");
        assert!(matches!(result, Err(FsError::RemoteUnavailable(_))));
        assert_eq!(core.nodes.len(), 1);
        assert!(core.exists("/"));
    }

    #[test]
    fn test_partial_reads_honor_offset_and_size() {
        let mut client = MockMonitoringApi::new();
        client.expect_list_entities().returning(|| Ok(vec![entity("en1")]));
        client
            .expect_list_checks()
            .returning(|_| Ok(vec![check("chA")]));
        client
            .expect_get_check()
            .returning(|_, check_id| Ok(check(check_id)));
        let core = core_with(client);

        core.readdir("/").unwrap();
        core.readdir("/en1").unwrap();
        core.readdir("/en1/chA").unwrap();

        let path = "/en1/chA/attributes";
        let full = core.read(path, 0, u32::MAX).unwrap();
        let head = core.read(path, 0, 4).unwrap();
        let tail = core.read(path, 4, u32::MAX).unwrap();

        assert_eq!(head, &full[..4]);
        assert_eq!(tail, &full[4..]);
        assert!(core.read(path, full.len() as u64 + 10, 16).unwrap().is_empty());
    }

    #[test]
    fn test_reading_a_directory_is_rejected() {
        let mut client = MockMonitoringApi::new();
        client.expect_list_entities().returning(|| Ok(vec![entity("en1")]));
        let core = core_with(client);

        core.readdir("/").unwrap();
        assert!(matches!(
            core.read("/en1", 0, 16),
            Err(FsError::IsADirectory)
        ));
    }

    #[test]
    fn test_out_of_shape_listing_is_empty_but_successful() {
        let client = MockMonitoringApi::new();
        let core = core_with(client);

        let listing = core.readdir("/en1/chA/attributes/deeper").unwrap();
        assert_eq!(names(&listing), vec![".", ".."]);
        assert_eq!(core.nodes.len(), 1);
    }

    #[test]
    fn test_statfs_is_fixed() {
        let core = core_with(MockMonitoringApi::new());
        let stats = core.statfs();
        assert_eq!(stats.f_bsize, 512);
        assert_eq!(stats.f_blocks, 4096);
        assert_eq!(stats.f_bavail, 2048);
    }
}
