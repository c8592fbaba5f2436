//! Directory classifier: one directory listing in, extension buckets out.
//!
//! Per entry:
//! 1. Skip `.`/`..` and entries whose inode is already gone
//! 2. Stat; failures become warnings and the entry is skipped
//! 3. Directories are queued for recursion (when enabled) and never bucketed
//! 4. Backup-suffixed names are set aside for immediate removal; the suffix
//!    is matched on the raw name bytes, so non-UTF-8 backups count too
//! 5. Everything else is classified by extension into its bucket

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::core::config::CleanPolicy;
use crate::core::errors::{LintexError, Result};
use crate::logger::events::{CleanEvent, UnclassifiedReason};
use crate::logger::reporter::{Reporter, emit};
use crate::scanner::fs::{EntryKind, Filesystem};
use crate::scanner::registry::{ExtensionRegistry, NameClass};

/// A tracked file with its registered extension stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub basename: String,
    pub modified: SystemTime,
    pub writable: bool,
    /// Set once the record has been paired with a source file.
    pub consumed: bool,
}

impl FileRecord {
    #[must_use]
    pub fn new(basename: impl Into<String>, modified: SystemTime, writable: bool) -> Self {
        Self {
            basename: basename.into(),
            modified,
            writable,
            consumed: false,
        }
    }
}

/// All records sharing one registered extension, in listing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionBucket {
    pub extension: String,
    pub records: Vec<FileRecord>,
}

/// One bucket per tracked extension, in registry order. Bucket 0 is the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSet {
    buckets: Vec<ExtensionBucket>,
}

impl BucketSet {
    /// Empty buckets mirroring the registry's extension table.
    #[must_use]
    pub fn for_registry(registry: &ExtensionRegistry) -> Self {
        Self {
            buckets: registry
                .tracked_extensions()
                .iter()
                .map(|ext| ExtensionBucket {
                    extension: ext.clone(),
                    records: Vec::new(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn source(&self) -> &ExtensionBucket {
        &self.buckets[0]
    }

    #[must_use]
    pub fn buckets(&self) -> &[ExtensionBucket] {
        &self.buckets
    }

    /// The source bucket, and mutable access to every artifact bucket.
    pub fn split_source_mut(&mut self) -> (&ExtensionBucket, &mut [ExtensionBucket]) {
        let (head, tail) = self.buckets.split_at_mut(1);
        (&head[0], tail)
    }

    /// Artifact records never paired with a source, with their extension.
    pub fn unconsumed_artifacts(&self) -> impl Iterator<Item = (&str, &FileRecord)> {
        self.buckets[1..].iter().flat_map(|bucket| {
            bucket
                .records
                .iter()
                .filter(|r| !r.consumed)
                .map(move |r| (bucket.extension.as_str(), r))
        })
    }

    /// Append a record to the bucket at `index`.
    pub fn push(&mut self, index: usize, record: FileRecord) {
        self.buckets[index].records.push(record);
    }

    /// Bucket for `extension`, if registered.
    #[must_use]
    pub fn get(&self, extension: &str) -> Option<&ExtensionBucket> {
        self.buckets.iter().find(|b| b.extension == extension)
    }

    #[must_use]
    pub fn total_records(&self) -> usize {
        self.buckets.iter().map(|b| b.records.len()).sum()
    }
}

/// A subdirectory waiting for its own pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubdirectory {
    pub path: PathBuf,
}

/// An entry skipped because its metadata could not be read.
#[derive(Debug)]
pub struct ScanWarning {
    pub path: PathBuf,
    pub error: LintexError,
}

/// Result of classifying one directory.
#[derive(Debug)]
pub struct DirectoryScan {
    pub dir: PathBuf,
    pub buckets: BucketSet,
    pub subdirectories: Vec<PendingSubdirectory>,
    /// Editor backups, to be removed before correlation.
    pub backup_files: Vec<PathBuf>,
    pub unclassified: Vec<String>,
    pub warnings: Vec<ScanWarning>,
}

/// Scan `dir` and sort its files into extension buckets.
///
/// Fails only when the directory itself cannot be listed. Per-entry failures
/// end up in [`DirectoryScan::warnings`].
pub fn classify_directory(
    fs: &dyn Filesystem,
    dir: &Path,
    registry: &ExtensionRegistry,
    policy: &CleanPolicy,
    reporter: &mut dyn Reporter,
) -> Result<DirectoryScan> {
    let entries = fs
        .list_dir(dir)
        .map_err(|source| LintexError::DirectoryUnreadable {
            path: dir.to_path_buf(),
            source,
        })?;

    let mut scan = DirectoryScan {
        dir: dir.to_path_buf(),
        buckets: BucketSet::for_registry(registry),
        subdirectories: Vec::new(),
        backup_files: Vec::new(),
        unclassified: Vec::new(),
        warnings: Vec::new(),
    };

    for entry in entries {
        if !entry.live || entry.name == "." || entry.name == ".." {
            continue;
        }

        let path = dir.join(&entry.name);

        let stat = match fs.stat(&path) {
            Ok(stat) => stat,
            Err(source) => {
                let error = LintexError::Metadata {
                    path: path.clone(),
                    source,
                };
                emit(reporter, &CleanEvent::entry_skipped(&path, &error));
                scan.warnings.push(ScanWarning { path, error });
                continue;
            }
        };

        let display_name = entry.name.to_string_lossy().into_owned();

        if stat.kind == EntryKind::Directory {
            let queued = policy.recurse && (!stat.is_symlink || policy.follow_symlinks);
            emit(
                reporter,
                &CleanEvent::SubdirectoryFound {
                    name: display_name,
                    queued,
                },
            );
            if queued {
                scan.subdirectories.push(PendingSubdirectory { path });
            }
            continue;
        }

        if registry.is_backup(&entry.name) {
            scan.backup_files.push(path);
            continue;
        }

        let Some(name) = entry.name.to_str() else {
            emit(
                reporter,
                &CleanEvent::EntryUnclassified {
                    name: display_name.clone(),
                    reason: UnclassifiedReason::NonUtf8Name,
                },
            );
            scan.unclassified.push(display_name);
            continue;
        };

        let reason = match registry.classify_name(name) {
            NameClass::Tracked { bucket, basename } => {
                scan.buckets
                    .push(bucket, FileRecord::new(basename, stat.modified, stat.writable));
                emit(
                    reporter,
                    &CleanEvent::EntryClassified {
                        name: name.to_string(),
                        extension: registry.tracked_extensions()[bucket].clone(),
                    },
                );
                continue;
            }
            NameClass::NoExtension => UnclassifiedReason::NoExtension,
            NameClass::EmptyExtension => UnclassifiedReason::EmptyExtension,
            NameClass::BareSuffix => UnclassifiedReason::BareSuffix,
            NameClass::Unregistered { suffix } => UnclassifiedReason::UnregisteredExtension {
                suffix: suffix.to_string(),
            },
        };
        emit(
            reporter,
            &CleanEvent::EntryUnclassified {
                name: name.to_string(),
                reason,
            },
        );
        scan.unclassified.push(name.to_string());
    }

    for bucket in scan.buckets.buckets() {
        emit(
            reporter,
            &CleanEvent::BucketSummary {
                extension: bucket.extension.clone(),
                count: bucket.records.len(),
            },
        );
    }

    Ok(scan)
}
