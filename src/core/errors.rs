//! LTX-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, LintexError>;

/// Top-level error type for lintex.
#[derive(Debug, Error)]
pub enum LintexError {
    #[error("[LTX-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[LTX-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[LTX-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[LTX-2001] \"{path}\" cannot be opened (or is not a directory): {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[LTX-2002] metadata unavailable for {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[LTX-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[LTX-3001] permission denied for {path}")]
    PermissionDenied { path: PathBuf },

    #[error("[LTX-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[LTX-3003] {path} vanished before it could be removed")]
    Vanished { path: PathBuf },
}

impl LintexError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "LTX-1001",
            Self::MissingConfig { .. } => "LTX-1002",
            Self::ConfigParse { .. } => "LTX-1003",
            Self::DirectoryUnreadable { .. } => "LTX-2001",
            Self::Metadata { .. } => "LTX-2002",
            Self::Serialization { .. } => "LTX-2101",
            Self::PermissionDenied { .. } => "LTX-3001",
            Self::Io { .. } => "LTX-3002",
            Self::Vanished { .. } => "LTX-3003",
        }
    }

    /// Whether the run must stop before touching the filesystem.
    ///
    /// Only caller-input problems are fatal; scan and deletion failures are
    /// reported and the run continues with the remaining files.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. } | Self::MissingConfig { .. } | Self::ConfigParse { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Map an IO failure on `path` to the most specific variant.
    #[must_use]
    pub fn from_io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match source.kind() {
            ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            ErrorKind::NotFound => Self::Vanished { path },
            _ => Self::Io { path, source },
        }
    }
}

impl From<serde_json::Error> for LintexError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for LintexError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
