// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Engine configuration

use serde::{Deserialize, Serialize};

/// Top-level configuration for a mount.
///
/// Every field carries a serde default so a partial (or absent) config file
/// yields a working setup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    pub cache: CachePolicy,
    pub remote: RemotePolicy,
    pub security: SecurityPolicy,
}

/// TTLs handed to the kernel with attribute and entry replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CachePolicy {
    pub attr_ttl_ms: u32,
    pub entry_ttl_ms: u32,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            attr_ttl_ms: 1000,
            entry_ttl_ms: 1000,
        }
    }
}

/// Remote-client behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemotePolicy {
    /// Per-request timeout; a listing fails rather than hang the dispatch
    /// thread past this bound.
    pub request_timeout_ms: u64,
}

impl Default for RemotePolicy {
    fn default() -> Self {
        Self {
            request_timeout_ms: 10_000,
        }
    }
}

/// Ownership stamped on synthesized attributes.
///
/// `None` resolves to the mounting process's uid/gid, which keeps the
/// owner-only permission bits usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityPolicy {
    pub default_uid: Option<u32>,
    pub default_gid: Option<u32>,
}
