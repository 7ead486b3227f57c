// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! monfs FUSE adapter implementation
//!
//! Maps FUSE operations to the monfs engine. The engine is path-addressed
//! while FUSE is inode-addressed, so the adapter owns the inode↔path
//! bookkeeping; inodes are allocated as paths become visible through
//! lookups and directory listings.
//!
//! Mutating operations are accepted and succeed without effect. Generic
//! file-tree tooling probes for their existence, and rejecting them would
//! break that tooling even though the tree is read-only.

#[cfg(not(all(feature = "fuse", target_os = "linux")))]
compile_error!("This module requires the 'fuse' feature on Linux");

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use fuser::{
    FileAttr, FileType, ReplyAttr, ReplyCreate, ReplyData, ReplyDirectory, ReplyEmpty, ReplyEntry,
    ReplyOpen, ReplyStatfs, ReplyWrite, Request, TimeOrNow, FUSE_ROOT_ID,
};
use libc::{c_int, EINVAL, EIO, EISDIR, ENAMETOOLONG, ENOENT, ENOTDIR};
use monfs_core::{Attributes, FsError, MonFsCore};
use tracing::{debug, info, warn};

/// Maximum single path component length to guard against overly long names
const NAME_MAX: usize = 255;

/// monfs FUSE filesystem adapter
pub struct MonFsFuse {
    /// Core engine instance
    core: Arc<MonFsCore>,
    /// TTL for attribute cache responses
    attr_ttl: Duration,
    /// TTL for directory entry cache responses
    entry_ttl: Duration,
    /// Cache of inode to path mappings
    inodes: HashMap<u64, String>,
    /// Reverse mapping from path to inode
    paths: HashMap<String, u64>,
    /// Next available inode number
    next_inode: u64,
}

impl MonFsFuse {
    /// Create a new FUSE adapter over an engine instance
    pub fn new(core: Arc<MonFsCore>) -> Self {
        let attr_ttl = Duration::from_millis(core.config().cache.attr_ttl_ms as u64);
        let entry_ttl = Duration::from_millis(core.config().cache.entry_ttl_ms as u64);

        let mut inodes = HashMap::new();
        let mut paths = HashMap::new();
        inodes.insert(FUSE_ROOT_ID, "/".to_string());
        paths.insert("/".to_string(), FUSE_ROOT_ID);

        Self {
            core,
            attr_ttl,
            entry_ttl,
            inodes,
            paths,
            next_inode: FUSE_ROOT_ID + 1,
        }
    }

    /// Get the path for a given inode
    fn inode_to_path(&self, ino: u64) -> Option<&str> {
        self.inodes.get(&ino).map(|p| p.as_str())
    }

    /// Get or allocate an inode for a path
    fn get_or_alloc_inode(&mut self, path: &str) -> u64 {
        if let Some(&inode) = self.paths.get(path) {
            return inode;
        }

        let inode = self.next_inode;
        self.next_inode += 1;
        self.paths.insert(path.to_string(), inode);
        self.inodes.insert(inode, path.to_string());
        inode
    }

    /// Convert engine Attributes to FUSE FileAttr
    fn attr_to_fuse(&self, attr: &Attributes, ino: u64) -> FileAttr {
        let kind = if attr.is_dir {
            FileType::Directory
        } else {
            FileType::RegularFile
        };

        let to_system_time =
            |secs: i64| SystemTime::UNIX_EPOCH + Duration::from_secs(secs.max(0) as u64);

        FileAttr {
            ino,
            size: attr.len,
            blocks: attr.len.div_ceil(512),
            atime: to_system_time(attr.times.atime),
            mtime: to_system_time(attr.times.mtime),
            ctime: to_system_time(attr.times.ctime),
            crtime: to_system_time(attr.times.birthtime),
            kind,
            perm: (attr.mode() & 0o7777) as u16,
            nlink: attr.nlink,
            uid: attr.uid,
            gid: attr.gid,
            rdev: 0,
            blksize: 512,
            flags: 0,
        }
    }

    /// Plausible attributes for a mutator that must reply with an entry.
    /// Nothing is recorded in the engine, so the path stays unaddressable.
    fn synthesized_attr(&mut self, path: &str, kind: FileType, uid: u32, gid: u32) -> FileAttr {
        let ino = self.get_or_alloc_inode(path);
        let now = SystemTime::now();
        FileAttr {
            ino,
            size: 0,
            blocks: 0,
            atime: now,
            mtime: now,
            ctime: now,
            crtime: now,
            kind,
            perm: if kind == FileType::Directory { 0o700 } else { 0o600 },
            nlink: 2,
            uid,
            gid,
            rdev: 0,
            blksize: 512,
            flags: 0,
        }
    }

    /// Resolve parent inode + component name into a child path, guarding
    /// component length and encoding. Yields the errno to reply with when
    /// resolution fails.
    fn resolve_child(&self, parent: u64, name: &OsStr) -> Result<String, c_int> {
        let name = name.to_str().ok_or(ENOENT)?;
        if name.len() > NAME_MAX {
            return Err(ENAMETOOLONG);
        }
        let parent_path = self.inode_to_path(parent).ok_or(ENOENT)?;
        Ok(child_path(parent_path, name))
    }
}

fn child_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}

fn parent_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

impl fuser::Filesystem for MonFsFuse {
    fn init(&mut self, _req: &Request, _config: &mut fuser::KernelConfig) -> Result<(), c_int> {
        info!(
            "monfs FUSE adapter initialized (attr_ttl={:?}, entry_ttl={:?})",
            self.attr_ttl, self.entry_ttl
        );
        Ok(())
    }

    fn destroy(&mut self) {
        info!("monfs FUSE adapter destroyed");
    }

    fn lookup(&mut self, _req: &Request, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let full_path = match self.resolve_child(parent, name) {
            Ok(path) => path,
            Err(errno) => {
                reply.error(errno);
                return;
            }
        };

        match self.core.getattr(&full_path) {
            Ok(attr) => {
                let ino = self.get_or_alloc_inode(&full_path);
                let fuse_attr = self.attr_to_fuse(&attr, ino);
                reply.entry(&self.entry_ttl, &fuse_attr, 0);
            }
            Err(FsError::NotFound) => reply.error(ENOENT),
            Err(_) => reply.error(EIO),
        }
    }

    fn getattr(&mut self, _req: &Request, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        let path = match self.inode_to_path(ino) {
            Some(p) => p,
            None => {
                reply.error(ENOENT);
                return;
            }
        };

        match self.core.getattr(path) {
            Ok(attr) => {
                let fuse_attr = self.attr_to_fuse(&attr, ino);
                reply.attr(&self.attr_ttl, &fuse_attr);
            }
            Err(FsError::NotFound) => reply.error(ENOENT),
            Err(_) => reply.error(EIO),
        }
    }

    fn setattr(
        &mut self,
        _req: &Request,
        ino: u64,
        _mode: Option<u32>,
        _uid: Option<u32>,
        _gid: Option<u32>,
        _size: Option<u64>,
        _atime: Option<TimeOrNow>,
        _mtime: Option<TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        // chmod/chown/truncate/utimens all land here; accept and change nothing
        let path = match self.inode_to_path(ino) {
            Some(p) => p,
            None => {
                reply.error(ENOENT);
                return;
            }
        };

        debug!(path, "ignoring attribute change on read-only tree");
        match self.core.getattr(path) {
            Ok(attr) => {
                let fuse_attr = self.attr_to_fuse(&attr, ino);
                reply.attr(&self.attr_ttl, &fuse_attr);
            }
            Err(FsError::NotFound) => reply.error(ENOENT),
            Err(_) => reply.error(EIO),
        }
    }

    fn readlink(&mut self, _req: &Request, _ino: u64, reply: ReplyData) {
        reply.data(&[]);
    }

    fn mknod(
        &mut self,
        req: &Request,
        parent: u64,
        name: &OsStr,
        _mode: u32,
        _umask: u32,
        _rdev: u32,
        reply: ReplyEntry,
    ) {
        match self.resolve_child(parent, name) {
            Ok(path) => {
                let attr = self.synthesized_attr(&path, FileType::RegularFile, req.uid(), req.gid());
                reply.entry(&self.entry_ttl, &attr, 0);
            }
            Err(errno) => reply.error(errno),
        }
    }

    fn mkdir(
        &mut self,
        req: &Request,
        parent: u64,
        name: &OsStr,
        _mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        match self.resolve_child(parent, name) {
            Ok(path) => {
                let attr = self.synthesized_attr(&path, FileType::Directory, req.uid(), req.gid());
                reply.entry(&self.entry_ttl, &attr, 0);
            }
            Err(errno) => reply.error(errno),
        }
    }

    fn unlink(&mut self, _req: &Request, _parent: u64, _name: &OsStr, reply: ReplyEmpty) {
        reply.ok();
    }

    fn rmdir(&mut self, _req: &Request, _parent: u64, _name: &OsStr, reply: ReplyEmpty) {
        reply.ok();
    }

    fn symlink(
        &mut self,
        req: &Request,
        parent: u64,
        link_name: &OsStr,
        _target: &Path,
        reply: ReplyEntry,
    ) {
        match self.resolve_child(parent, link_name) {
            Ok(path) => {
                let attr = self.synthesized_attr(&path, FileType::Symlink, req.uid(), req.gid());
                reply.entry(&self.entry_ttl, &attr, 0);
            }
            Err(errno) => reply.error(errno),
        }
    }

    fn rename(
        &mut self,
        _req: &Request,
        _parent: u64,
        _name: &OsStr,
        _newparent: u64,
        _newname: &OsStr,
        _flags: u32,
        reply: ReplyEmpty,
    ) {
        reply.ok();
    }

    fn open(&mut self, _req: &Request, ino: u64, _flags: i32, reply: ReplyOpen) {
        let path = match self.inode_to_path(ino) {
            Some(p) => p,
            None => {
                reply.error(ENOENT);
                return;
            }
        };

        if self.core.exists(path) {
            reply.opened(0, 0);
        } else {
            reply.error(ENOENT);
        }
    }

    fn read(
        &mut self,
        _req: &Request,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        if offset < 0 {
            reply.error(EINVAL);
            return;
        }

        let path = match self.inode_to_path(ino) {
            Some(p) => p,
            None => {
                reply.error(ENOENT);
                return;
            }
        };

        match self.core.read(path, offset as u64, size) {
            Ok(data) => reply.data(&data),
            Err(FsError::NotFound) => reply.error(ENOENT),
            Err(FsError::IsADirectory) => reply.error(EISDIR),
            Err(_) => reply.error(EIO),
        }
    }

    fn write(
        &mut self,
        _req: &Request,
        ino: u64,
        _fh: u64,
        _offset: i64,
        data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        // Accepted and discarded; report the full count so callers complete
        debug!(ino, len = data.len(), "discarding write on read-only tree");
        reply.written(data.len() as u32);
    }

    fn flush(&mut self, _req: &Request, _ino: u64, _fh: u64, _lock_owner: u64, reply: ReplyEmpty) {
        reply.ok();
    }

    fn release(
        &mut self,
        _req: &Request,
        _ino: u64,
        _fh: u64,
        _flags: i32,
        _lock_owner: Option<u64>,
        _flush: bool,
        reply: ReplyEmpty,
    ) {
        reply.ok();
    }

    fn fsync(&mut self, _req: &Request, _ino: u64, _fh: u64, _datasync: bool, reply: ReplyEmpty) {
        reply.ok();
    }

    fn readdir(
        &mut self,
        _req: &Request,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        let path = match self.inode_to_path(ino) {
            Some(p) => p.to_string(),
            None => {
                reply.error(ENOENT);
                return;
            }
        };

        match self.core.readdir(&path) {
            Ok(entries) => {
                for (i, entry) in entries.iter().enumerate().skip(offset as usize) {
                    let entry_ino = match entry.name.as_str() {
                        "." => ino,
                        ".." => {
                            let parent = parent_path(&path).to_string();
                            self.get_or_alloc_inode(&parent)
                        }
                        name => {
                            let child = child_path(&path, name);
                            self.get_or_alloc_inode(&child)
                        }
                    };

                    let file_type = if entry.is_dir {
                        FileType::Directory
                    } else {
                        FileType::RegularFile
                    };

                    if reply.add(entry_ino, (i + 1) as i64, file_type, &entry.name) {
                        break;
                    }
                }
                reply.ok();
            }
            Err(FsError::NotFound) => reply.error(ENOENT),
            Err(FsError::NotADirectory) => reply.error(ENOTDIR),
            Err(err) => {
                // A failed remote listing must surface, never read as empty
                warn!(%path, %err, "directory listing failed");
                reply.error(EIO);
            }
        }
    }

    fn create(
        &mut self,
        req: &Request,
        parent: u64,
        name: &OsStr,
        _mode: u32,
        _umask: u32,
        _flags: i32,
        reply: ReplyCreate,
    ) {
        match self.resolve_child(parent, name) {
            Ok(path) => {
                let attr = self.synthesized_attr(&path, FileType::RegularFile, req.uid(), req.gid());
                reply.created(&self.entry_ttl, &attr, 0, 0, 0);
            }
            Err(errno) => reply.error(errno),
        }
    }

    fn statfs(&mut self, _req: &Request, _ino: u64, reply: ReplyStatfs) {
        let stats = self.core.statfs();
        reply.statfs(
            stats.f_blocks,
            stats.f_bfree,
            stats.f_bavail,
            stats.f_files,
            stats.f_ffree,
            stats.f_bsize,
            stats.f_namemax,
            stats.f_frsize,
        );
    }
}
