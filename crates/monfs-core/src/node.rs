// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Virtual nodes of the monitoring file tree

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use monfs_api_contract::{Check, Entity};

use crate::error::{FsError, FsResult};
use crate::projection::{self, Describe};
use crate::types::{Attributes, FileMode, FileTimes};

/// Remote object a node wraps.
#[derive(Debug, Clone)]
pub enum RemoteRef {
    Entity(Arc<Entity>),
    Check(Arc<Check>),
}

impl RemoteRef {
    pub fn as_describe(&self) -> &dyn Describe {
        match self {
            RemoteRef::Entity(entity) => entity.as_ref(),
            RemoteRef::Check(check) => check.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File,
}

/// The unit of the file tree: a directory or regular file wrapping an
/// optional remote object. Nodes are created when their path is first
/// discovered and live for the duration of the mount.
#[derive(Debug, Clone)]
pub struct VNode {
    path: String,
    kind: NodeKind,
    remote: Option<RemoteRef>,
}

impl VNode {
    pub fn directory(path: impl Into<String>, remote: Option<RemoteRef>) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::Directory,
            remote,
        }
    }

    pub fn file(path: impl Into<String>, remote: RemoteRef) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::File,
            remote: Some(remote),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn remote(&self) -> Option<&RemoteRef> {
        self.remote.as_ref()
    }

    /// Serialized content length for files; directories report zero.
    pub fn size(&self) -> u64 {
        match self.kind {
            NodeKind::Directory => 0,
            NodeKind::File => projection::byte_len(self.describe_ref()),
        }
    }

    /// Metadata with timestamps synthesized at call time. The remote
    /// service's real modification times are not tracked.
    pub fn attributes(&self, uid: u32, gid: u32) -> Attributes {
        let now = unix_now();
        let is_dir = self.is_dir();
        Attributes {
            len: self.size(),
            times: FileTimes {
                atime: now,
                mtime: now,
                ctime: now,
                birthtime: now,
            },
            uid,
            gid,
            nlink: 2,
            is_dir,
            mode_user: FileMode {
                read: true,
                write: true,
                exec: is_dir,
            },
            mode_group: FileMode {
                read: false,
                write: false,
                exec: false,
            },
            mode_other: FileMode {
                read: false,
                write: false,
                exec: false,
            },
        }
    }

    /// Serialized content of a file node. Directories have no content;
    /// the facade never routes a read at one.
    pub fn read(&self) -> FsResult<Vec<u8>> {
        match self.kind {
            NodeKind::Directory => Err(FsError::IsADirectory),
            NodeKind::File => Ok(projection::serialize(self.describe_ref()).into_bytes()),
        }
    }

    fn describe_ref(&self) -> Option<&dyn Describe> {
        self.remote.as_ref().map(RemoteRef::as_describe)
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
