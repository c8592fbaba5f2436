#![forbid(unsafe_code)]

//! lintex: removes TeX auxiliary files that are newer than their `.tex`
//! source.
//!
//! Each directory pass runs four stages:
//! 1. **Classify** entries into buckets, one per registered extension
//! 2. **Correlate** every source file with same-basename artifacts
//! 3. **Delete** (or pretend to) what the keep rules allow
//! 4. **Report** artifacts that have no source at all
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use lintex::prelude::*;
//!
//! let config = Config::load(None)?;
//! let registry = config.registry()?;
//! let mut confirmer = ScriptedConfirmer::default();
//! let mut reporter = MemoryReporter::new();
//! let summary = Cleaner::new(&RealFs, &registry, config.policy(), &mut confirmer, &mut reporter)
//!     .run(&[]);
//! println!("{} removed", summary.removed);
//! # Ok::<(), LintexError>(())
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use lintex::core::config::Config;
//! use lintex::scanner::correlation::{DeletionDecision, decide};
//! ```

pub mod prelude;

pub mod core;
pub mod logger;
pub mod scanner;
