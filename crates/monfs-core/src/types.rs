// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Core type definitions for monfs

use monfs_api_contract::{Check, Entity};

use crate::error::FsResult;

/// File timestamps (seconds since the epoch)
#[derive(Clone, Copy, Debug)]
pub struct FileTimes {
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
    pub birthtime: i64,
}

/// File permissions for one permission class
#[derive(Clone, Debug, PartialEq)]
pub struct FileMode {
    pub read: bool,
    pub write: bool,
    pub exec: bool,
}

impl FileMode {
    fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.read {
            bits |= 0o4;
        }
        if self.write {
            bits |= 0o2;
        }
        if self.exec {
            bits |= 0o1;
        }
        bits
    }
}

/// File attributes
#[derive(Clone, Debug)]
pub struct Attributes {
    pub len: u64,
    pub times: FileTimes,
    pub uid: u32,
    pub gid: u32,
    pub nlink: u32,
    pub is_dir: bool,
    pub mode_user: FileMode,
    pub mode_group: FileMode,
    pub mode_other: FileMode,
}

impl Attributes {
    /// Full st_mode word: file-type bits plus permission bits.
    pub fn mode(&self) -> u32 {
        let type_bits = if self.is_dir {
            libc::S_IFDIR as u32
        } else {
            libc::S_IFREG as u32
        };
        type_bits
            | (self.mode_user.bits() << 6)
            | (self.mode_group.bits() << 3)
            | self.mode_other.bits()
    }
}

/// Directory entry information
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
    pub len: u64,
}

/// Fixed filesystem capacity report
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FsStatvfs {
    pub f_bsize: u32,
    pub f_frsize: u32,
    pub f_blocks: u64,
    pub f_bfree: u64,
    pub f_bavail: u64,
    pub f_files: u64,
    pub f_ffree: u64,
    pub f_namemax: u32,
}

/// Remote monitoring client trait.
///
/// This is the interface the engine calls while populating directories; the
/// concrete REST client implements it, and tests substitute a mock. All
/// calls are expected to be bounded by the configured request timeout.
#[cfg_attr(test, mockall::automock)]
pub trait MonitoringApi: Send + Sync {
    /// List every entity visible to the authenticated account.
    fn list_entities(&self) -> FsResult<Vec<Entity>>;

    /// List the checks configured against an entity.
    fn list_checks(&self, entity: &Entity) -> FsResult<Vec<Check>>;

    /// Fetch a single check by entity and check id.
    fn get_check(&self, entity_id: &str, check_id: &str) -> FsResult<Check>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_attrs() -> Attributes {
        Attributes {
            len: 42,
            times: FileTimes {
                atime: 0,
                mtime: 0,
                ctime: 0,
                birthtime: 0,
            },
            uid: 1000,
            gid: 1000,
            nlink: 2,
            is_dir: false,
            mode_user: FileMode {
                read: true,
                write: true,
                exec: false,
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

    #[test]
    fn test_mode_regular_file() {
        let attrs = file_attrs();
        assert_eq!(attrs.mode() & libc::S_IFMT as u32, libc::S_IFREG as u32);
        assert_eq!(attrs.mode() & 0o777, 0o600);
    }

    #[test]
    fn test_mode_directory() {
        let mut attrs = file_attrs();
        attrs.is_dir = true;
        attrs.mode_user.exec = true;
        assert_eq!(attrs.mode() & libc::S_IFMT as u32, libc::S_IFDIR as u32);
        assert_eq!(attrs.mode() & 0o777, 0o700);
    }
}
