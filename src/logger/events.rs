//! Clean events: everything the scanner has to say, each with its own tier.
//!
//! The scanner never decides presentation. It emits every event at its
//! intrinsic [`Verbosity`] and the reporter chooses what to surface.

#![allow(missing_docs)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::LintexError;
use crate::scanner::cleaner::RunSummary;

/// Output tiers, quietest first.
///
/// An event is shown when its tier is at or below the configured verbosity.
/// Errors carry [`Verbosity::Silent`] and are therefore always shown.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Verbosity {
    /// Errors only.
    Silent,
    /// Actions taken (removals).
    #[default]
    ActionOnly,
    /// Actions plus files left alone and why.
    Verbose,
    /// Every classification step.
    Debug,
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Silent => "silent",
            Self::ActionOnly => "action-only",
            Self::Verbose => "verbose",
            Self::Debug => "debug",
        })
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" | "quiet" | "0" => Ok(Self::Silent),
            "action-only" | "whisper" | "1" => Ok(Self::ActionOnly),
            "verbose" | "2" => Ok(Self::Verbose),
            "debug" | "3" => Ok(Self::Debug),
            other => Err(format!(
                "unknown verbosity {other:?} (expected silent, action-only, verbose or debug)"
            )),
        }
    }
}

/// Why a file name was left out of every bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum UnclassifiedReason {
    NoExtension,
    EmptyExtension,
    BareSuffix,
    UnregisteredExtension { suffix: String },
    NonUtf8Name,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CleanEvent {
    RunStarted {
        roots: Vec<String>,
        recurse: bool,
        confirm: bool,
        pretend: bool,
        keep_final_products: bool,
        remove_older: bool,
        backup_suffix: String,
        config_hash: String,
    },
    DirectoryScanStarted {
        dir: String,
    },
    DirectoryUnreadable {
        dir: String,
        code: String,
        message: String,
    },
    DirectoryRevisited {
        dir: String,
    },
    EntrySkipped {
        path: String,
        code: String,
        message: String,
    },
    SubdirectoryFound {
        name: String,
        queued: bool,
    },
    EntryClassified {
        name: String,
        extension: String,
    },
    EntryUnclassified {
        name: String,
        #[serde(flatten)]
        reason: UnclassifiedReason,
    },
    BucketSummary {
        extension: String,
        count: usize,
    },
    PairingStarted {
        source: String,
    },
    Removed {
        path: String,
    },
    WouldRemove {
        path: String,
    },
    RemovalDeclined {
        path: String,
    },
    RemovalFailed {
        path: String,
        code: String,
        message: String,
    },
    KeptFinalProduct {
        path: String,
    },
    KeptReadOnly {
        path: String,
    },
    KeptNewerSource {
        path: String,
        source: String,
    },
    Unmatched {
        path: String,
        source_extension: String,
    },
    RunFinished {
        summary: RunSummary,
    },
}

impl CleanEvent {
    /// Intrinsic tier of this event.
    #[must_use]
    pub const fn tier(&self) -> Verbosity {
        match self {
            Self::DirectoryUnreadable { .. }
            | Self::EntrySkipped { .. }
            | Self::RemovalFailed { .. } => Verbosity::Silent,
            Self::Removed { .. }
            | Self::WouldRemove { .. }
            | Self::RemovalDeclined { .. }
            | Self::KeptFinalProduct { .. } => Verbosity::ActionOnly,
            Self::KeptReadOnly { .. }
            | Self::KeptNewerSource { .. }
            | Self::Unmatched { .. }
            | Self::DirectoryRevisited { .. }
            | Self::RunFinished { .. }
            | Self::EntryUnclassified {
                reason: UnclassifiedReason::EmptyExtension,
                ..
            } => Verbosity::Verbose,
            Self::RunStarted { .. }
            | Self::DirectoryScanStarted { .. }
            | Self::SubdirectoryFound { .. }
            | Self::EntryClassified { .. }
            | Self::EntryUnclassified { .. }
            | Self::BucketSummary { .. }
            | Self::PairingStarted { .. } => Verbosity::Debug,
        }
    }

    /// Errors go to the error stream of the console reporter.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(
            self,
            Self::DirectoryUnreadable { .. } | Self::EntrySkipped { .. } | Self::RemovalFailed { .. }
        )
    }

    pub(crate) fn directory_unreadable(dir: &std::path::Path, err: &LintexError) -> Self {
        Self::DirectoryUnreadable {
            dir: dir.display().to_string(),
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn entry_skipped(path: &std::path::Path, err: &LintexError) -> Self {
        Self::EntrySkipped {
            path: path.display().to_string(),
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn removal_failed(path: &std::path::Path, err: &LintexError) -> Self {
        Self::RemovalFailed {
            path: path.display().to_string(),
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

fn yn(flag: bool) -> char {
    if flag { 'Y' } else { 'N' }
}

impl fmt::Display for CleanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunStarted {
                roots,
                recurse,
                confirm,
                pretend,
                keep_final_products,
                remove_older,
                backup_suffix,
                config_hash,
            } => write!(
                f,
                "* lintex {} - roots = {roots:?}, confirm = {}, recurse = {}, keep = {}, pretend = {}, older = {}, editor trailer = {backup_suffix:?}, config = {config_hash}",
                env!("CARGO_PKG_VERSION"),
                yn(*confirm),
                yn(*recurse),
                yn(*keep_final_products),
                yn(*pretend),
                yn(*remove_older),
            ),
            Self::DirectoryScanStarted { dir } => write!(f, "* Scanning directory \"{dir}\""),
            Self::DirectoryRevisited { dir } => {
                write!(f, "* Skipping directory \"{dir}\": already visited")
            }
            Self::DirectoryUnreadable { message, .. }
            | Self::EntrySkipped { message, .. }
            | Self::RemovalFailed { message, .. } => write!(f, "lintex: {message}"),
            Self::SubdirectoryFound { name, queued } => {
                if *queued {
                    write!(f, "File {name} - is a directory, queued")
                } else {
                    write!(f, "File {name} - is a directory")
                }
            }
            Self::EntryClassified { name, extension } => {
                write!(f, "File {name} - extension {extension} - inserted in tree")
            }
            Self::EntryUnclassified { name, reason } => match reason {
                UnclassifiedReason::NoExtension => write!(f, "File {name} - without extension"),
                UnclassifiedReason::EmptyExtension => write!(f, "File {name} - empty extension"),
                UnclassifiedReason::BareSuffix => write!(f, "File {name} - nothing before extension"),
                UnclassifiedReason::UnregisteredExtension { suffix } => {
                    write!(f, "File {name} - extension {suffix}")
                }
                UnclassifiedReason::NonUtf8Name => write!(f, "File {name} - name is not UTF-8"),
            },
            Self::BucketSummary { extension, count } => write!(
                f,
                "  --> {count} file{} with extension {extension}",
                if *count == 1 { "" } else { "s" }
            ),
            Self::PairingStarted { source } => write!(f, "    Finding files related to {source}:"),
            Self::Removed { path } => write!(f, "{path} has been removed"),
            Self::WouldRemove { path } => {
                write!(f, "*** File \"{path}\" would have been removed ***")
            }
            Self::RemovalDeclined { path } => write!(f, "*** {path} not removed; not confirmed ***"),
            Self::KeptFinalProduct { path } => {
                write!(f, "*** {path} not removed; keep is enabled ***")
            }
            Self::KeptReadOnly { path } => write!(f, "*** {path} not removed; it is read only ***"),
            Self::KeptNewerSource { path, source } => {
                write!(f, "*** {path} not removed; {source} is newer ***")
            }
            Self::Unmatched {
                path,
                source_extension,
            } => write!(
                f,
                "*** {path} not removed; no {source_extension} file found ***"
            ),
            Self::RunFinished { summary } => write!(
                f,
                "{} director{} scanned ({} unreadable): {} removed, {} would be removed, {} declined, {} failed, {} kept, {} unmatched",
                summary.directories_scanned,
                if summary.directories_scanned == 1 { "y" } else { "ies" },
                summary.directories_failed,
                summary.removed,
                summary.simulated,
                summary.declined,
                summary.failed,
                summary.kept(),
                summary.unmatched,
            ),
        }
    }
}
