//! Configuration system: TOML file + env var overrides + defaults.
//!
//! Resolution order, later wins: built-in defaults, the TOML file,
//! `LINTEX_*` environment variables, then command-line flags (applied by the
//! CLI layer on the returned [`Config`]).

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{LintexError, Result};
use crate::logger::events::Verbosity;
use crate::scanner::registry::{
    DEFAULT_ARTIFACT_EXTENSIONS, DEFAULT_BACKUP_SUFFIX, DEFAULT_FINAL_PRODUCT_EXTENSIONS,
    DEFAULT_SOURCE_EXTENSION, ExtensionRegistry,
};

/// Full lintex configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub clean: CleanConfig,
    pub extensions: ExtensionsConfig,
}

/// Run modes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CleanConfig {
    pub recurse: bool,
    pub confirm: bool,
    pub pretend: bool,
    pub keep_final_products: bool,
    /// Also remove artifacts that are not newer than their source.
    pub remove_older: bool,
    pub follow_symlinks: bool,
    /// Editor backup trailer. Empty disables backup removal.
    pub backup_suffix: String,
    pub verbosity: Verbosity,
}

/// The tracked extension table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtensionsConfig {
    pub source: String,
    pub artifacts: Vec<String>,
    pub final_products: Vec<String>,
}

/// Immutable switches threaded through every directory pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanPolicy {
    pub recurse: bool,
    pub confirm: bool,
    pub pretend: bool,
    pub keep_final_products: bool,
    pub remove_older: bool,
    pub follow_symlinks: bool,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            recurse: false,
            confirm: false,
            pretend: false,
            keep_final_products: false,
            remove_older: false,
            follow_symlinks: false,
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
            verbosity: Verbosity::default(),
        }
    }
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE_EXTENSION.to_string(),
            artifacts: DEFAULT_ARTIFACT_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            final_products: DEFAULT_FINAL_PRODUCT_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        default_path_from(|name| env::var(name).ok())
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    /// The result is not validated: callers layer their own overrides first,
    /// then [`Config::validate`] or [`Config::registry`] checks the final values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf)
                .map_err(|source| LintexError::io(&path_buf, source))?;
            toml::from_str::<Self>(&raw)?
        } else if path.is_some() {
            return Err(LintexError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.apply_env_overrides_from(|name| env::var(name).ok())?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for the run header.
    ///
    /// FNV-1a over the canonical JSON form, stable across processes and
    /// toolchain releases.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    /// Apply `LINTEX_*` overrides read through `lookup`.
    ///
    /// Blank values are ignored, except for the backup suffix where an empty
    /// value disables backup removal.
    pub fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut non_blank = |name: &str| lookup(name).filter(|raw| !raw.trim().is_empty());

        for (name, slot) in [
            ("LINTEX_RECURSE", &mut self.clean.recurse),
            ("LINTEX_CONFIRM", &mut self.clean.confirm),
            ("LINTEX_PRETEND", &mut self.clean.pretend),
            ("LINTEX_KEEP", &mut self.clean.keep_final_products),
            ("LINTEX_OLDER", &mut self.clean.remove_older),
            ("LINTEX_FOLLOW_SYMLINKS", &mut self.clean.follow_symlinks),
        ] {
            if let Some(raw) = non_blank(name) {
                *slot = parse_env_bool(name, &raw)?;
            }
        }

        if let Some(raw) = non_blank("LINTEX_VERBOSITY") {
            self.clean.verbosity = raw.parse().map_err(|details| LintexError::ConfigParse {
                context: "env",
                details: format!("LINTEX_VERBOSITY={raw:?}: {details}"),
            })?;
        }

        if let Some(raw) = lookup("LINTEX_BACKUP_SUFFIX") {
            self.clean.backup_suffix = raw;
        }

        Ok(())
    }

    /// Check the whole model; the first problem found is returned.
    pub fn validate(&self) -> Result<()> {
        self.registry().map(|_| ())
    }

    /// Build the extension registry described by this config.
    pub fn registry(&self) -> Result<ExtensionRegistry> {
        ExtensionRegistry::new(
            &self.extensions.source,
            &self.extensions.artifacts,
            &self.extensions.final_products,
            &self.clean.backup_suffix,
        )
    }

    #[must_use]
    pub fn policy(&self) -> CleanPolicy {
        CleanPolicy {
            recurse: self.clean.recurse,
            confirm: self.clean.confirm,
            pretend: self.clean.pretend,
            keep_final_products: self.clean.keep_final_products,
            remove_older: self.clean.remove_older,
            follow_symlinks: self.clean.follow_symlinks,
        }
    }
}

fn default_path_from<F>(mut lookup: F) -> PathBuf
where
    F: FnMut(&str) -> Option<String>,
{
    let base = lookup("XDG_CONFIG_HOME")
        .filter(|raw| !raw.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            lookup("HOME")
                .filter(|raw| !raw.trim().is_empty())
                .map(|home| PathBuf::from(home).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("lintex").join("config.toml")
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(LintexError::ConfigParse {
            context: "env",
            details: format!("{name}={other:?}: expected a boolean"),
        }),
    }
}
