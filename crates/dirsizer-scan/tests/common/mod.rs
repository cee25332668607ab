//! In-memory filesystem for exercising the sizer without touching disk.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dirsizer_scan::{
    CancellationToken, DirListing, EntryFailure, FailureKind, FileEntry, FileSystem,
};

#[derive(Debug, Default, Clone)]
struct MemDir {
    files: Vec<(PathBuf, Result<u64, FailureKind>)>,
    subdirs: Vec<PathBuf>,
    denied: bool,
    reparse: bool,
}

/// A directory tree held in memory that records which directories were
/// listed.
#[derive(Debug, Default)]
pub struct MemoryFs {
    dirs: HashMap<PathBuf, MemDir>,
    listed: Mutex<Vec<PathBuf>>,
    rotation: usize,
    reversed: bool,
    cancel_on: Option<(PathBuf, CancellationToken)>,
}

impl MemoryFs {
    pub fn new(root: &str) -> Self {
        let mut fs = Self::default();
        fs.dirs.insert(PathBuf::from(root), MemDir::default());
        fs
    }

    /// Add a directory under an existing parent.
    pub fn dir(mut self, path: &str) -> Self {
        let path = PathBuf::from(path);
        self.parent_of(&path).subdirs.push(path.clone());
        self.dirs.insert(path, MemDir::default());
        self
    }

    /// Add a readable file.
    pub fn file(mut self, path: &str, len: u64) -> Self {
        let path = PathBuf::from(path);
        self.parent_of(&path).files.push((path.clone(), Ok(len)));
        self
    }

    /// Add a file whose length cannot be read.
    pub fn unreadable_file(mut self, path: &str, kind: FailureKind) -> Self {
        let path = PathBuf::from(path);
        self.parent_of(&path).files.push((path.clone(), Err(kind)));
        self
    }

    /// Make a directory refuse to be listed.
    pub fn deny(mut self, path: &str) -> Self {
        self.dirs.get_mut(Path::new(path)).expect("unknown dir").denied = true;
        self
    }

    /// Mark a directory as a reparse point.
    pub fn reparse(mut self, path: &str) -> Self {
        self.dirs.get_mut(Path::new(path)).expect("unknown dir").reparse = true;
        self
    }

    /// Rotate every listing by `n` positions.
    pub fn rotated(mut self, n: usize) -> Self {
        self.rotation = n;
        self
    }

    /// Reverse every listing.
    pub fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    /// Cancel `token` as soon as `path` is listed.
    pub fn cancel_when_listing(mut self, path: &str, token: CancellationToken) -> Self {
        self.cancel_on = Some((PathBuf::from(path), token));
        self
    }

    /// Whether the sizer ever asked for the contents of `path`.
    pub fn was_listed(&self, path: &str) -> bool {
        self.listed.lock().unwrap().iter().any(|p| p == Path::new(path))
    }

    fn parent_of(&mut self, path: &Path) -> &mut MemDir {
        let parent = path.parent().expect("path has a parent");
        self.dirs.get_mut(parent).expect("parent dir must be added first")
    }

    fn permute<T>(&self, mut items: Vec<T>) -> Vec<T> {
        if !items.is_empty() {
            let n = self.rotation % items.len();
            items.rotate_left(n);
        }
        if self.reversed {
            items.reverse();
        }
        items
    }

    fn lookup(&self, dir: &Path) -> Result<&MemDir, EntryFailure> {
        self.listed.lock().unwrap().push(dir.to_path_buf());
        let node = self
            .dirs
            .get(dir)
            .ok_or_else(|| EntryFailure::new(dir, FailureKind::Vanished, "no such directory"))?;
        if node.denied {
            return Err(EntryFailure::access_denied(dir));
        }
        Ok(node)
    }
}

impl FileSystem for MemoryFs {
    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains_key(path)
    }

    fn list(&self, dir: &Path) -> Result<DirListing, EntryFailure> {
        let node = self.lookup(dir)?;
        if let Some((path, token)) = &self.cancel_on
            && path == dir
        {
            token.cancel();
        }

        let files = node
            .files
            .iter()
            .map(|(path, len)| match len {
                Ok(len) => Ok(FileEntry::new(path, *len)),
                Err(kind) => Err(EntryFailure::new(path, *kind, "unreadable")),
            })
            .collect();
        Ok(DirListing {
            files: self.permute(files),
            subdirectories: self.permute(node.subdirs.clone()),
        })
    }

    fn is_reparse_point(&self, path: &Path) -> Result<bool, EntryFailure> {
        Ok(self.dirs.get(path).is_some_and(|d| d.reparse))
    }
}

/// root: A (100 bytes), S1/B (50 bytes), S2 inaccessible.
pub fn scenario_tree() -> MemoryFs {
    MemoryFs::new("/root")
        .file("/root/A", 100)
        .dir("/root/S1")
        .file("/root/S1/B", 50)
        .dir("/root/S2")
        .file("/root/S2/hidden", 999)
        .deny("/root/S2")
}

/// A wider tree with files at several depths. Total is 1 + 2 + ... + 12 = 78.
pub fn wide_tree() -> MemoryFs {
    MemoryFs::new("/w")
        .file("/w/f1", 1)
        .file("/w/f2", 2)
        .dir("/w/a")
        .file("/w/a/f3", 3)
        .dir("/w/a/x")
        .file("/w/a/x/f4", 4)
        .file("/w/a/x/f5", 5)
        .dir("/w/a/y")
        .file("/w/a/y/f6", 6)
        .dir("/w/b")
        .file("/w/b/f7", 7)
        .dir("/w/b/z")
        .dir("/w/b/z/deep")
        .file("/w/b/z/deep/f8", 8)
        .file("/w/b/z/deep/f9", 9)
        .dir("/w/c")
        .file("/w/c/f10", 10)
        .file("/w/c/f11", 11)
        .file("/w/c/f12", 12)
}

pub const WIDE_TREE_BYTES: u64 = 78;

/// A single chain `/chain/d/d/...` of `depth` directories below the root,
/// each holding one 1-byte file. Total is `depth + 1`.
pub fn chain_tree(depth: usize) -> MemoryFs {
    let mut fs = MemoryFs::new("/chain").file("/chain/f", 1);
    let mut dir = String::from("/chain");
    for _ in 0..depth {
        dir.push_str("/d");
        fs = fs.dir(&dir).file(&format!("{dir}/f"), 1);
    }
    fs
}

/// Like [`chain_tree`], but every level also has an empty sibling, so each
/// level branches. Total is `depth + 1`.
pub fn branching_chain_tree(depth: usize) -> MemoryFs {
    let mut fs = MemoryFs::new("/chain").file("/chain/f", 1);
    let mut dir = String::from("/chain");
    for _ in 0..depth {
        fs = fs.dir(&format!("{dir}/e"));
        dir.push_str("/d");
        fs = fs.dir(&dir).file(&format!("{dir}/f"), 1);
    }
    fs
}
