//! Filesystem boundary: directory listing, metadata, and file removal.
//!
//! The scanner never touches `std::fs` directly; everything goes through
//! [`Filesystem`] so a directory pass can run against a scripted fake.

#![allow(missing_docs)]

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// One raw entry from a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: OsString,
    /// False when the entry's inode is already gone (d_ino == 0).
    pub live: bool,
}

impl DirEntryInfo {
    #[must_use]
    pub fn new(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            live: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

/// Device and inode of the object an entry resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId {
    pub dev: u64,
    pub ino: u64,
}

/// Metadata the classifier needs for a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Type of the entry after following symlinks.
    pub kind: EntryKind,
    pub modified: SystemTime,
    pub writable: bool,
    /// The entry itself is a symlink.
    pub is_symlink: bool,
    /// `None` where the platform has no stable identity.
    pub id: Option<FileId>,
}

/// Reader and mutator contract used by the scanner.
pub trait Filesystem {
    /// List a directory. Fails when the directory cannot be opened.
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>>;

    /// Stat an entry, following symlinks.
    fn stat(&self, path: &Path) -> io::Result<FileStat>;

    /// Remove a single named file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// The real filesystem.
///
/// Listings are sorted by name so output and first-seen-wins pairing do not
/// depend on the platform's readdir order.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl Filesystem for RealFs {
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            out.push(DirEntryInfo {
                name: entry.file_name(),
                live: entry_is_live(&entry),
            });
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let link_meta = fs::symlink_metadata(path)?;
        let is_symlink = link_meta.file_type().is_symlink();
        let meta = if is_symlink {
            fs::metadata(path)?
        } else {
            link_meta
        };

        let kind = if meta.is_dir() {
            EntryKind::Directory
        } else if meta.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };

        Ok(FileStat {
            kind,
            modified: meta.modified()?,
            writable: is_writable(path, &meta),
            is_symlink,
            id: file_id(&meta),
        })
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

#[cfg(unix)]
fn entry_is_live(entry: &fs::DirEntry) -> bool {
    use std::os::unix::fs::DirEntryExt;
    entry.ino() != 0
}

#[cfg(not(unix))]
fn entry_is_live(_entry: &fs::DirEntry) -> bool {
    true
}

#[cfg(unix)]
fn file_id(meta: &fs::Metadata) -> Option<FileId> {
    use std::os::unix::fs::MetadataExt;
    Some(FileId {
        dev: meta.dev(),
        ino: meta.ino(),
    })
}

#[cfg(not(unix))]
fn file_id(_meta: &fs::Metadata) -> Option<FileId> {
    None
}

/// Writability as seen by the current process.
#[cfg(unix)]
fn is_writable(path: &Path, _meta: &fs::Metadata) -> bool {
    use nix::unistd::{AccessFlags, access};
    access(path, AccessFlags::W_OK).is_ok()
}

#[cfg(not(unix))]
fn is_writable(_path: &Path, meta: &fs::Metadata) -> bool {
    !meta.permissions().readonly()
}
