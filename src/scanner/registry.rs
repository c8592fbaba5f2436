//! Extension registry: the fixed table of tracked TeX extensions, final-product
//! exemptions, and the editor backup suffix.
//!
//! Position 0 of [`ExtensionRegistry::tracked_extensions`] is always the source
//! extension. The correlation engine relies on this: bucket 0 is the source set
//! and is never scanned as a match target.

#![allow(missing_docs)]

use std::ffi::OsStr;

use regex::Regex;

use crate::core::errors::{LintexError, Result};

/// Primary tracked extension.
pub const DEFAULT_SOURCE_EXTENSION: &str = ".tex";

/// Generated artifacts, in bucket order.
pub const DEFAULT_ARTIFACT_EXTENSIONS: &[&str] = &[
    ".aux",
    ".bbl",
    ".blg",
    ".dvi",
    ".idx",
    ".ilg",
    ".ind",
    ".lof",
    ".log",
    ".lot",
    ".nav",
    ".out",
    ".pdf",
    ".ps",
    ".snm",
    ".thm",
    ".toc",
    ".toc.old",
    ".synctex.gz",
];

/// Deliverables exempt from deletion when keep mode is on.
pub const DEFAULT_FINAL_PRODUCT_EXTENSIONS: &[&str] = &[".pdf", ".ps", ".dvi"];

/// Emacs convention.
pub const DEFAULT_BACKUP_SUFFIX: &str = "~";

/// Longest accepted backup suffix, in bytes.
pub const MAX_BACKUP_SUFFIX_LEN: usize = 7;

const EXTENSION_SYNTAX: &str = r"^(\.[A-Za-z0-9_+\-]+)+$";

/// How a file name relates to the registered extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameClass<'a> {
    /// No `.` anywhere in the name.
    NoExtension,
    /// The rightmost `.` is the final character (`paper.`).
    EmptyExtension,
    /// The name is only a suffix with nothing before it (`.aux`).
    BareSuffix,
    /// Has a suffix, but no registered extension matches it.
    Unregistered { suffix: &'a str },
    /// Matches the registered extension at `bucket`.
    Tracked { bucket: usize, basename: &'a str },
}

/// Static configuration consumed by the classifier and correlation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRegistry {
    tracked: Vec<String>,
    final_products: Vec<String>,
    backup_suffix: String,
    /// Indices into `tracked`, longest extension first.
    probe_order: Vec<usize>,
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        let tracked: Vec<String> = std::iter::once(DEFAULT_SOURCE_EXTENSION)
            .chain(DEFAULT_ARTIFACT_EXTENSIONS.iter().copied())
            .map(str::to_string)
            .collect();
        let probe_order = probe_order(&tracked);
        Self {
            tracked,
            final_products: DEFAULT_FINAL_PRODUCT_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
            probe_order,
        }
    }
}

impl ExtensionRegistry {
    /// Build and validate a registry.
    pub fn new(
        source: &str,
        artifacts: &[String],
        final_products: &[String],
        backup_suffix: &str,
    ) -> Result<Self> {
        let syntax = Regex::new(EXTENSION_SYNTAX).map_err(|err| LintexError::InvalidConfig {
            details: format!("extension syntax pattern failed to compile: {err}"),
        })?;

        for ext in std::iter::once(source).chain(artifacts.iter().map(String::as_str)) {
            if !syntax.is_match(ext) {
                return Err(LintexError::InvalidConfig {
                    details: format!(
                        "extension {ext:?} must start with '.' and contain only letters, digits, '_', '+', '-' and inner dots"
                    ),
                });
            }
        }

        if artifacts.iter().any(|ext| ext == source) {
            return Err(LintexError::InvalidConfig {
                details: format!("source extension {source:?} cannot also be an artifact"),
            });
        }

        for (i, ext) in artifacts.iter().enumerate() {
            if artifacts[..i].contains(ext) {
                return Err(LintexError::InvalidConfig {
                    details: format!("artifact extension {ext:?} is listed twice"),
                });
            }
        }

        for ext in final_products {
            if !artifacts.contains(ext) {
                return Err(LintexError::InvalidConfig {
                    details: format!(
                        "final product extension {ext:?} is not a registered artifact extension"
                    ),
                });
            }
        }

        validate_backup_suffix(backup_suffix)?;

        let tracked: Vec<String> = std::iter::once(source.to_string())
            .chain(artifacts.iter().cloned())
            .collect();
        let probe_order = probe_order(&tracked);
        Ok(Self {
            tracked,
            final_products: final_products.to_vec(),
            backup_suffix: backup_suffix.to_string(),
            probe_order,
        })
    }

    /// Replace the backup suffix, keeping the extension table.
    pub fn with_backup_suffix(mut self, suffix: &str) -> Result<Self> {
        validate_backup_suffix(suffix)?;
        self.backup_suffix = suffix.to_string();
        Ok(self)
    }

    /// All tracked extensions; index 0 is the source extension.
    #[must_use]
    pub fn tracked_extensions(&self) -> &[String] {
        &self.tracked
    }

    #[must_use]
    pub fn source_extension(&self) -> &str {
        &self.tracked[0]
    }

    #[must_use]
    pub fn artifact_extensions(&self) -> &[String] {
        &self.tracked[1..]
    }

    #[must_use]
    pub fn final_product_extensions(&self) -> &[String] {
        &self.final_products
    }

    #[must_use]
    pub fn is_final_product(&self, extension: &str) -> bool {
        self.final_products.iter().any(|ext| ext == extension)
    }

    /// Empty means backup detection is disabled.
    #[must_use]
    pub fn backup_suffix(&self) -> &str {
        &self.backup_suffix
    }

    /// Backup files must be strictly longer than the suffix itself.
    ///
    /// Compared on the raw name bytes; the name need not be valid UTF-8.
    #[must_use]
    pub fn is_backup(&self, name: impl AsRef<OsStr>) -> bool {
        let name = name.as_ref().as_encoded_bytes();
        let suffix = self.backup_suffix.as_bytes();
        !suffix.is_empty() && name.len() > suffix.len() && name.ends_with(suffix)
    }

    /// Classify a bare file name (no directory component).
    ///
    /// The rightmost `.` decides whether the name has an extension at all.
    /// When it does, registered extensions are probed longest first against
    /// the whole trailing run, so `paper.synctex.gz` lands in `.synctex.gz`
    /// even though the text after the last dot is only `gz`.
    #[must_use]
    pub fn classify_name<'a>(&self, name: &'a str) -> NameClass<'a> {
        let Some(dot) = memchr::memrchr(b'.', name.as_bytes()) else {
            return NameClass::NoExtension;
        };
        if dot + 1 == name.len() {
            return NameClass::EmptyExtension;
        }
        if dot == 0 {
            return NameClass::BareSuffix;
        }

        for &bucket in &self.probe_order {
            let ext = self.tracked[bucket].as_str();
            if name.len() > ext.len()
                && let Some(basename) = name.strip_suffix(ext)
            {
                return NameClass::Tracked { bucket, basename };
            }
        }

        NameClass::Unregistered {
            suffix: &name[dot..],
        }
    }
}

fn probe_order(tracked: &[String]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..tracked.len()).collect();
    // Stable sort keeps registry order among equal lengths.
    order.sort_by(|&a, &b| tracked[b].len().cmp(&tracked[a].len()));
    order
}

/// Reject suffixes that cannot name a file tail.
pub fn validate_backup_suffix(suffix: &str) -> Result<()> {
    if suffix.len() > MAX_BACKUP_SUFFIX_LEN {
        return Err(LintexError::InvalidConfig {
            details: format!(
                "backup suffix {suffix:?} is longer than {MAX_BACKUP_SUFFIX_LEN} bytes"
            ),
        });
    }
    if suffix.contains('/') || suffix.contains('\0') {
        return Err(LintexError::InvalidConfig {
            details: format!("backup suffix {suffix:?} cannot contain '/' or NUL"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn default_registry_starts_with_source() {
        let reg = ExtensionRegistry::default();
        assert_eq!(reg.tracked_extensions()[0], ".tex");
        assert_eq!(reg.source_extension(), ".tex");
        assert_eq!(reg.artifact_extensions().len(), DEFAULT_ARTIFACT_EXTENSIONS.len());
        assert!(!reg.artifact_extensions().iter().any(|e| e == ".tex"));
    }

    #[test]
    fn default_registry_passes_validation() {
        let reg = ExtensionRegistry::new(
            DEFAULT_SOURCE_EXTENSION,
            &strings(DEFAULT_ARTIFACT_EXTENSIONS),
            &strings(DEFAULT_FINAL_PRODUCT_EXTENSIONS),
            DEFAULT_BACKUP_SUFFIX,
        )
        .expect("defaults are valid");
        assert_eq!(reg, ExtensionRegistry::default());
    }

    #[test]
    fn final_products() {
        let reg = ExtensionRegistry::default();
        assert!(reg.is_final_product(".pdf"));
        assert!(reg.is_final_product(".ps"));
        assert!(reg.is_final_product(".dvi"));
        assert!(!reg.is_final_product(".aux"));
        assert!(!reg.is_final_product(".PDF"));
    }

    #[test]
    fn classify_simple_extension() {
        let reg = ExtensionRegistry::default();
        assert_eq!(
            reg.classify_name("paper.tex"),
            NameClass::Tracked {
                bucket: 0,
                basename: "paper"
            }
        );
        let aux = reg
            .tracked_extensions()
            .iter()
            .position(|e| e == ".aux")
            .unwrap();
        assert_eq!(
            reg.classify_name("paper.aux"),
            NameClass::Tracked {
                bucket: aux,
                basename: "paper"
            }
        );
    }

    #[test]
    fn classify_keeps_inner_dots_in_basename() {
        let reg = ExtensionRegistry::default();
        assert_eq!(
            reg.classify_name("v1.2.log"),
            NameClass::Tracked {
                bucket: reg
                    .tracked_extensions()
                    .iter()
                    .position(|e| e == ".log")
                    .unwrap(),
                basename: "v1.2"
            }
        );
    }

    #[test]
    fn classify_prefers_longest_multi_dot_extension() {
        let reg = ExtensionRegistry::default();
        let synctex = reg
            .tracked_extensions()
            .iter()
            .position(|e| e == ".synctex.gz")
            .unwrap();
        assert_eq!(
            reg.classify_name("paper.synctex.gz"),
            NameClass::Tracked {
                bucket: synctex,
                basename: "paper"
            }
        );

        let toc_old = reg
            .tracked_extensions()
            .iter()
            .position(|e| e == ".toc.old")
            .unwrap();
        assert_eq!(
            reg.classify_name("thesis.toc.old"),
            NameClass::Tracked {
                bucket: toc_old,
                basename: "thesis"
            }
        );
    }

    #[test]
    fn longest_match_wins_when_shorter_suffix_also_registered() {
        let reg = ExtensionRegistry::new(
            ".tex",
            &strings(&[".gz", ".synctex.gz"]),
            &[],
            "~",
        )
        .unwrap();
        assert_eq!(
            reg.classify_name("a.synctex.gz"),
            NameClass::Tracked {
                bucket: 2,
                basename: "a"
            }
        );
        assert_eq!(
            reg.classify_name("a.gz"),
            NameClass::Tracked {
                bucket: 1,
                basename: "a"
            }
        );
    }

    #[test]
    fn classify_unclassifiable_names() {
        let reg = ExtensionRegistry::default();
        assert_eq!(reg.classify_name("Makefile"), NameClass::NoExtension);
        assert_eq!(reg.classify_name("paper."), NameClass::EmptyExtension);
        assert_eq!(reg.classify_name(".aux"), NameClass::BareSuffix);
        assert_eq!(
            reg.classify_name("notes.txt"),
            NameClass::Unregistered { suffix: ".txt" }
        );
        assert_eq!(
            reg.classify_name("paper.TEX"),
            NameClass::Unregistered { suffix: ".TEX" }
        );
    }

    #[test]
    fn multi_dot_extension_alone_is_not_tracked() {
        let reg = ExtensionRegistry::default();
        // Rightmost dot is mid-name, but stripping the extension leaves nothing.
        assert_eq!(
            reg.classify_name(".synctex.gz"),
            NameClass::Unregistered { suffix: ".gz" }
        );
    }

    #[test]
    fn backup_detection() {
        let reg = ExtensionRegistry::default();
        assert!(reg.is_backup("paper.tex~"));
        assert!(!reg.is_backup("paper.tex"));
        assert!(!reg.is_backup("~"));

        let disabled = ExtensionRegistry::default().with_backup_suffix("").unwrap();
        assert!(!disabled.is_backup("paper.tex~"));

        let bak = ExtensionRegistry::default().with_backup_suffix(".bak").unwrap();
        assert!(bak.is_backup("paper.tex.bak"));
        assert!(!bak.is_backup("paper.tex~"));
        assert!(!bak.is_backup(".bak"));
    }

    #[cfg(unix)]
    #[test]
    fn backup_detection_on_non_utf8_names() {
        use std::os::unix::ffi::OsStrExt;

        let reg = ExtensionRegistry::default();
        assert!(reg.is_backup(OsStr::from_bytes(b"caf\xe9.tex~")));
        assert!(!reg.is_backup(OsStr::from_bytes(b"caf\xe9.tex")));
    }

    #[test]
    fn rejects_bad_backup_suffix() {
        assert!(validate_backup_suffix("~").is_ok());
        assert!(validate_backup_suffix("").is_ok());
        assert!(validate_backup_suffix(".backup1").is_err());
        assert!(validate_backup_suffix("a/b").is_err());
        assert!(validate_backup_suffix("a\0").is_err());
    }

    #[test]
    fn rejects_malformed_extensions() {
        for bad in ["aux", ".", ".a..b", ".a/b", ".a b", "a.aux.", ""] {
            let err = ExtensionRegistry::new(".tex", &strings(&[bad]), &[], "~")
                .expect_err("should reject");
            assert_eq!(err.code(), "LTX-1001", "for {bad:?}");
        }
    }

    #[test]
    fn rejects_inconsistent_tables() {
        let err = ExtensionRegistry::new(".tex", &strings(&[".aux", ".tex"]), &[], "~")
            .unwrap_err();
        assert!(err.to_string().contains("cannot also be an artifact"));

        let err = ExtensionRegistry::new(".tex", &strings(&[".aux", ".aux"]), &[], "~")
            .unwrap_err();
        assert!(err.to_string().contains("listed twice"));

        let err =
            ExtensionRegistry::new(".tex", &strings(&[".aux"]), &strings(&[".pdf"]), "~")
                .unwrap_err();
        assert!(err.to_string().contains("not a registered artifact"));
    }
}
