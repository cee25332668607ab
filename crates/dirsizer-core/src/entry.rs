//! File entries as reported by a filesystem collaborator.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Inode information for hardlink detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InodeInfo {
    /// Inode number.
    pub inode: u64,
    /// Device ID.
    pub device: u64,
}

impl InodeInfo {
    /// Create new inode info.
    pub fn new(inode: u64, device: u64) -> Self {
        Self { inode, device }
    }
}

/// A file found directly inside a directory, with its length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Full path of the file.
    pub path: PathBuf,
    /// Length in bytes.
    pub len: u64,
    /// Identity of the file, set only when it has more than one hard link.
    pub inode: Option<InodeInfo>,
}

impl FileEntry {
    /// Create a file entry without hardlink identity.
    pub fn new(path: impl Into<PathBuf>, len: u64) -> Self {
        Self {
            path: path.into(),
            len,
            inode: None,
        }
    }

    /// Attach hardlink identity.
    pub fn with_inode(mut self, inode: InodeInfo) -> Self {
        self.inode = Some(inode);
        self
    }
}
