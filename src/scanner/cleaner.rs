//! Cleaner: one directory pass (classify, correlate, delete, report garbage)
//! and the depth-first walk over the subdirectories each pass queues.
//!
//! Nothing crosses directories. Buckets, records and decisions live for one
//! pass and are dropped before the next directory is opened.

#![allow(missing_docs)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::config::CleanPolicy;
use crate::core::errors::Result;
use crate::logger::events::CleanEvent;
use crate::logger::reporter::{Reporter, emit};
use crate::scanner::classifier::{PendingSubdirectory, ScanWarning, classify_directory};
use crate::scanner::correlation::{Pairing, correlate};
use crate::scanner::deletion::{Confirmer, DeletionConfig, DeletionExecutor, DeletionReport};
use crate::scanner::fs::Filesystem;
use crate::scanner::garbage::report_unmatched;
use crate::scanner::registry::ExtensionRegistry;

// ──────────────────── report types ────────────────────

/// Everything one directory pass produced.
#[derive(Debug)]
pub struct DirectoryReport {
    pub dir: PathBuf,
    pub pairings: Vec<Pairing>,
    pub deletion: DeletionReport,
    pub unmatched: Vec<PathBuf>,
    pub unclassified: usize,
    pub warnings: Vec<ScanWarning>,
    pub subdirectories: Vec<PendingSubdirectory>,
}

/// Totals over a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub directories_scanned: usize,
    pub directories_failed: usize,
    /// Directories reached again through a symlink and skipped.
    pub directories_revisited: usize,
    pub removed: usize,
    pub simulated: usize,
    pub declined: usize,
    pub failed: usize,
    pub kept_final_product: usize,
    pub kept_read_only: usize,
    pub kept_newer_source: usize,
    pub unmatched: usize,
    pub warnings: usize,
}

impl RunSummary {
    #[must_use]
    pub fn kept(&self) -> usize {
        self.kept_final_product + self.kept_read_only + self.kept_newer_source
    }

    /// True when any directory, entry or removal failed along the way.
    #[must_use]
    pub fn had_errors(&self) -> bool {
        self.directories_failed > 0 || self.failed > 0 || self.warnings > 0
    }

    fn absorb(&mut self, report: &DirectoryReport) {
        let d = &report.deletion;
        self.directories_scanned += 1;
        self.removed += d.removed;
        self.simulated += d.simulated;
        self.declined += d.declined;
        self.failed += d.failed;
        self.kept_final_product += d.kept_final_product;
        self.kept_read_only += d.kept_read_only;
        self.kept_newer_source += d.kept_newer_source;
        self.unmatched += report.unmatched.len();
        self.warnings += report.warnings.len();
    }
}

// ──────────────────── cleaner ────────────────────

pub struct Cleaner<'a> {
    fs: &'a dyn Filesystem,
    registry: &'a ExtensionRegistry,
    policy: CleanPolicy,
    confirmer: &'a mut dyn Confirmer,
    reporter: &'a mut dyn Reporter,
    config_hash: Option<String>,
}

impl<'a> Cleaner<'a> {
    pub fn new(
        fs: &'a dyn Filesystem,
        registry: &'a ExtensionRegistry,
        policy: CleanPolicy,
        confirmer: &'a mut dyn Confirmer,
        reporter: &'a mut dyn Reporter,
    ) -> Self {
        Self {
            fs,
            registry,
            policy,
            confirmer,
            reporter,
            config_hash: None,
        }
    }

    /// Fingerprint of the effective configuration, shown in the run header.
    #[must_use]
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Clean each root in order, each with its own depth-first walk.
    ///
    /// No roots means the current directory. An unreadable directory is
    /// reported and skipped; the walk carries on with its siblings. A
    /// directory already cleaned in the same walk (reached again through a
    /// followed symlink) is skipped.
    pub fn run(&mut self, roots: &[PathBuf]) -> RunSummary {
        let roots: Vec<PathBuf> = if roots.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            roots.to_vec()
        };

        emit(
            self.reporter,
            &CleanEvent::RunStarted {
                roots: roots.iter().map(|r| r.display().to_string()).collect(),
                recurse: self.policy.recurse,
                confirm: self.policy.confirm,
                pretend: self.policy.pretend,
                keep_final_products: self.policy.keep_final_products,
                remove_older: self.policy.remove_older,
                backup_suffix: self.registry.backup_suffix().to_string(),
                config_hash: self.config_hash.clone().unwrap_or_else(|| "-".to_string()),
            },
        );

        let mut summary = RunSummary::default();
        for root in roots {
            let mut visited = HashSet::new();
            let mut stack = vec![root];
            while let Some(dir) = stack.pop() {
                let id = self.fs.stat(&dir).ok().and_then(|stat| stat.id);
                if let Some(id) = id
                    && !visited.insert(id)
                {
                    summary.directories_revisited += 1;
                    emit(
                        self.reporter,
                        &CleanEvent::DirectoryRevisited {
                            dir: dir.display().to_string(),
                        },
                    );
                    continue;
                }
                match self.clean_directory(&dir) {
                    Ok(report) => {
                        summary.absorb(&report);
                        stack.extend(report.subdirectories.into_iter().rev().map(|s| s.path));
                    }
                    Err(err) => {
                        summary.directories_failed += 1;
                        emit(self.reporter, &CleanEvent::directory_unreadable(&dir, &err));
                    }
                }
            }
        }

        emit(
            self.reporter,
            &CleanEvent::RunFinished {
                summary: summary.clone(),
            },
        );
        summary
    }

    /// One full pass over a single directory. Subdirectories are returned,
    /// not visited.
    pub fn clean_directory(&mut self, dir: &Path) -> Result<DirectoryReport> {
        emit(
            self.reporter,
            &CleanEvent::DirectoryScanStarted {
                dir: dir.display().to_string(),
            },
        );

        let mut scan =
            classify_directory(self.fs, dir, self.registry, &self.policy, self.reporter)?;

        let mut executor =
            DeletionExecutor::new(DeletionConfig::from(&self.policy), self.fs, self.confirmer);

        for backup in &scan.backup_files {
            executor.remove(backup, self.reporter);
        }

        let pairings = correlate(&mut scan.buckets, self.registry, &self.policy);
        for pairing in &pairings {
            executor.execute(
                dir,
                self.registry.source_extension(),
                pairing,
                self.reporter,
            );
        }
        let deletion = executor.into_report();

        let unmatched = report_unmatched(dir, &scan.buckets, self.reporter);

        Ok(DirectoryReport {
            dir: scan.dir,
            pairings,
            deletion,
            unmatched,
            unclassified: scan.unclassified.len(),
            warnings: scan.warnings,
            subdirectories: scan.subdirectories,
        })
    }
}
