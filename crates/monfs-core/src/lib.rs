// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! monfs-core — virtual filesystem engine over a remote monitoring hierarchy
//!
//! The engine exposes a monitoring service's entities, their checks, and the
//! checks' attributes as a read-only path-addressable tree:
//!
//! ```text
//! /                                 lists entity ids
//! /<entityId>                       lists check ids
//! /<entityId>/<checkId>             lists exactly "attributes"
//! /<entityId>/<checkId>/attributes  JSON projection of the check
//! ```
//!
//! Directory contents are populated lazily: listing a directory is the only
//! operation that talks to the remote service and the only one that grows
//! the node cache. Everything else (metadata, reads) answers from nodes the
//! cache already holds.

pub mod cache;
pub mod config;
pub mod error;
pub mod node;
pub mod projection;
pub mod router;
pub mod types;
pub mod vfs;

pub use config::{CachePolicy, FsConfig, RemotePolicy, SecurityPolicy};
pub use error::{FsError, FsResult};
pub use node::{NodeKind, RemoteRef, VNode};
pub use types::{Attributes, DirEntry, FileMode, FileTimes, FsStatvfs, MonitoringApi};
pub use vfs::MonFsCore;
