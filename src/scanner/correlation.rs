//! Pairing of source files with same-basename artifacts, and the pure
//! keep-or-delete decision for each pair.
//!
//! Correlation never touches the filesystem. It marks matched records as
//! consumed and hands back an ordered plan; the deletion executor acts on it.

#![allow(missing_docs)]

use serde::Serialize;

use crate::core::config::CleanPolicy;
use crate::scanner::classifier::{BucketSet, FileRecord};
use crate::scanner::registry::ExtensionRegistry;

/// What to do with one matched artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionDecision {
    Delete,
    KeepFinalProduct,
    KeepReadOnly,
    KeepNewerSource,
}

impl DeletionDecision {
    #[must_use]
    pub const fn is_delete(self) -> bool {
        matches!(self, Self::Delete)
    }
}

/// An artifact matched to a source file, with its decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedArtifact {
    pub extension: String,
    pub decision: DeletionDecision,
}

/// One source file and every artifact paired with it, in bucket order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub basename: String,
    pub artifacts: Vec<PairedArtifact>,
}

/// Decide the fate of `artifact`, matched to `source` in the bucket for `extension`.
///
/// Checks run in a fixed order and the first hit wins:
/// 1. artifact not strictly newer than its source, and `remove_older` off
/// 2. artifact not writable
/// 3. keep mode on and `extension` is a final product
#[must_use]
pub fn decide(
    source: &FileRecord,
    artifact: &FileRecord,
    extension: &str,
    registry: &ExtensionRegistry,
    policy: &CleanPolicy,
) -> DeletionDecision {
    if artifact.modified <= source.modified && !policy.remove_older {
        DeletionDecision::KeepNewerSource
    } else if !artifact.writable {
        DeletionDecision::KeepReadOnly
    } else if policy.keep_final_products && registry.is_final_product(extension) {
        DeletionDecision::KeepFinalProduct
    } else {
        DeletionDecision::Delete
    }
}

/// Pair every source record with the first unconsumed same-basename record
/// of each artifact bucket.
///
/// Matched records are marked consumed whatever the decision, so a kept
/// artifact is never later reported as unmatched. When two source records
/// share a basename the first one claims the artifacts.
pub fn correlate(
    buckets: &mut BucketSet,
    registry: &ExtensionRegistry,
    policy: &CleanPolicy,
) -> Vec<Pairing> {
    let (sources, artifacts) = buckets.split_source_mut();
    let mut plan = Vec::with_capacity(sources.records.len());

    for source in &sources.records {
        let mut pairing = Pairing {
            basename: source.basename.clone(),
            artifacts: Vec::new(),
        };
        for bucket in artifacts.iter_mut() {
            let Some(artifact) = bucket
                .records
                .iter_mut()
                .find(|r| !r.consumed && r.basename == source.basename)
            else {
                continue;
            };
            artifact.consumed = true;
            pairing.artifacts.push(PairedArtifact {
                extension: bucket.extension.clone(),
                decision: decide(source, artifact, &bucket.extension, registry, policy),
            });
        }
        plan.push(pairing);
    }

    plan
}
