//! Leftover artifacts: tracked files with no same-basename source.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use crate::logger::events::CleanEvent;
use crate::logger::reporter::{Reporter, emit};
use crate::scanner::classifier::BucketSet;

/// Report every artifact record that correlation did not consume.
///
/// Purely informational; nothing is removed. Returns the full paths in
/// bucket order.
pub fn report_unmatched(
    dir: &Path,
    buckets: &BucketSet,
    reporter: &mut dyn Reporter,
) -> Vec<PathBuf> {
    let source_extension = buckets.source().extension.clone();
    buckets
        .unconsumed_artifacts()
        .map(|(extension, record)| {
            let path = dir.join(format!("{}{extension}", record.basename));
            emit(
                reporter,
                &CleanEvent::Unmatched {
                    path: path.display().to_string(),
                    source_extension: source_extension.clone(),
                },
            );
            path
        })
        .collect()
}
