//! Filesystem collaborator used by the sizer.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use dirsizer_core::{EntryFailure, FileEntry, InodeInfo};

/// Result of probing one file's length.
pub type FileProbe = Result<FileEntry, EntryFailure>;

/// Immediate contents of one directory, read in a single pass.
#[derive(Debug, Default)]
pub struct DirListing {
    /// Files directly inside the directory. An `Err` is an entry that could
    /// not be read.
    pub files: Vec<FileProbe>,
    /// Directories directly inside the directory, reparse points included.
    pub subdirectories: Vec<PathBuf>,
}

/// The filesystem operations the sizer depends on.
///
/// Every operation may fail per entry. An `Err` from [`list`](Self::list)
/// means the directory itself could not be read.
pub trait FileSystem: Send + Sync {
    /// Whether `path` currently references a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Files (with their lengths) and subdirectories directly inside `dir`.
    fn list(&self, dir: &Path) -> Result<DirListing, EntryFailure>;

    /// Whether `path` redirects elsewhere (symbolic link, junction).
    fn is_reparse_point(&self, path: &Path) -> Result<bool, EntryFailure>;
}

impl<T: FileSystem + ?Sized> FileSystem for Arc<T> {
    fn is_dir(&self, path: &Path) -> bool {
        (**self).is_dir(path)
    }

    fn list(&self, dir: &Path) -> Result<DirListing, EntryFailure> {
        (**self).list(dir)
    }

    fn is_reparse_point(&self, path: &Path) -> Result<bool, EntryFailure> {
        (**self).is_reparse_point(path)
    }
}

/// [`FileSystem`] backed by `std::fs`.
///
/// Symbolic links to directories are listed as subdirectories and reported as
/// reparse points. Symbolic links to files are not files and contribute
/// nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl OsFileSystem {
    /// Create a new OS-backed filesystem.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for OsFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list(&self, dir: &Path) -> Result<DirListing, EntryFailure> {
        let entries = fs::read_dir(dir).map_err(|e| EntryFailure::from_io(dir, &e))?;
        let mut listing = DirListing::default();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    listing.files.push(Err(EntryFailure::from_io(dir, &err)));
                    continue;
                }
            };

            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => {
                    listing.files.push(Err(EntryFailure::from_io(&path, &err)));
                    continue;
                }
            };

            if file_type.is_dir() || (file_type.is_symlink() && path.is_dir()) {
                listing.subdirectories.push(path);
            } else if file_type.is_file() {
                let probe = match entry.metadata() {
                    Ok(metadata) => Ok(file_entry(path, &metadata)),
                    Err(err) => Err(EntryFailure::from_io(&path, &err)),
                };
                listing.files.push(probe);
            }
        }

        Ok(listing)
    }

    fn is_reparse_point(&self, path: &Path) -> Result<bool, EntryFailure> {
        let metadata = fs::symlink_metadata(path).map_err(|e| EntryFailure::from_io(path, &e))?;
        Ok(is_reparse(&metadata))
    }
}

fn file_entry(path: PathBuf, metadata: &fs::Metadata) -> FileEntry {
    let entry = FileEntry::new(path, metadata.len());
    if get_nlink(metadata) > 1 {
        entry.with_inode(InodeInfo::new(get_ino(metadata), get_dev(metadata)))
    } else {
        entry
    }
}

#[cfg(windows)]
fn is_reparse(metadata: &fs::Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_REPARSE_POINT: u32 = 0x400;
    metadata.file_type().is_symlink()
        || metadata.file_attributes() & FILE_ATTRIBUTE_REPARSE_POINT != 0
}

#[cfg(not(windows))]
fn is_reparse(metadata: &fs::Metadata) -> bool {
    metadata.file_type().is_symlink()
}

// Cross-platform metadata helpers

/// Get the device ID from metadata.
#[cfg(unix)]
fn get_dev(metadata: &fs::Metadata) -> u64 {
    metadata.dev()
}

#[cfg(not(unix))]
fn get_dev(_metadata: &fs::Metadata) -> u64 {
    0
}

/// Get the inode number from metadata.
#[cfg(unix)]
fn get_ino(metadata: &fs::Metadata) -> u64 {
    metadata.ino()
}

#[cfg(not(unix))]
fn get_ino(_metadata: &fs::Metadata) -> u64 {
    0
}

/// Get the number of hard links from metadata.
#[cfg(unix)]
fn get_nlink(metadata: &fs::Metadata) -> u64 {
    metadata.nlink()
}

#[cfg(not(unix))]
fn get_nlink(_metadata: &fs::Metadata) -> u64 {
    1 // Assume single link without inode support
}
