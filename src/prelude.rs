//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use lintex::prelude::*;
//! ```

// Core
pub use crate::core::config::{CleanPolicy, Config};
pub use crate::core::errors::{LintexError, Result};

// Logger
pub use crate::logger::events::{CleanEvent, Verbosity};
pub use crate::logger::reporter::{ConsoleReporter, JsonReporter, MemoryReporter, Reporter};

// Scanner
pub use crate::scanner::classifier::{DirectoryScan, classify_directory};
pub use crate::scanner::cleaner::{Cleaner, DirectoryReport, RunSummary};
pub use crate::scanner::correlation::{DeletionDecision, Pairing, correlate, decide};
pub use crate::scanner::deletion::{
    Confirmer, DeletionConfig, DeletionExecutor, DeletionReport, PromptConfirmer,
    ScriptedConfirmer,
};
pub use crate::scanner::fs::{Filesystem, RealFs};
pub use crate::scanner::registry::ExtensionRegistry;
