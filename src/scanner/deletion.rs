//! Deletion executor: removes (or pretends to remove) single files, applying
//! pretend and confirm modes, and tallies outcomes.
//!
//! Per candidate:
//! 1. Pretend mode: emit a simulated notice, never prompt, never touch disk
//! 2. Confirm mode: ask the confirmer; anything but a yes declines this file only
//! 3. Remove; failures are recorded and the run carries on

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::core::config::CleanPolicy;
use crate::core::errors::LintexError;
use crate::logger::events::CleanEvent;
use crate::logger::reporter::{Reporter, emit};
use crate::scanner::correlation::{DeletionDecision, Pairing};
use crate::scanner::fs::Filesystem;

// ──────────────────── configuration ────────────────────

/// Removal modes, lifted from the clean policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionConfig {
    /// Report what would be removed, remove nothing.
    pub pretend: bool,
    /// Ask before each removal.
    pub confirm: bool,
}

impl From<&CleanPolicy> for DeletionConfig {
    fn from(policy: &CleanPolicy) -> Self {
        Self {
            pretend: policy.pretend,
            confirm: policy.confirm,
        }
    }
}

// ──────────────────── confirmation ────────────────────

/// Yes/no oracle consulted before each real removal in confirm mode.
pub trait Confirmer {
    /// True only on an explicit yes.
    fn confirm(&mut self, path: &Path) -> bool;
}

/// Prompts on a writer and reads one line of answer.
///
/// An answer starting with `y` or `Y` accepts. Anything else, an empty line,
/// a read error or end of input declines.
pub struct PromptConfirmer<R: BufRead, W: Write> {
    input: R,
    prompt: W,
}

impl PromptConfirmer<io::StdinLock<'static>, io::Stdout> {
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptConfirmer<R, W> {
    pub fn new(input: R, prompt: W) -> Self {
        Self { input, prompt }
    }

    pub fn into_prompt(self) -> W {
        self.prompt
    }
}

impl<R: BufRead, W: Write> Confirmer for PromptConfirmer<R, W> {
    fn confirm(&mut self, path: &Path) -> bool {
        let asked = write!(self.prompt, "Remove {} (y|n) ? ", path.display())
            .and_then(|()| self.prompt.flush());
        if asked.is_err() {
            return false;
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => false,
            Ok(_) => line.starts_with(['y', 'Y']),
        }
    }
}

/// Answers from a fixed script, declining once the script runs out.
#[derive(Debug, Default, Clone)]
pub struct ScriptedConfirmer {
    answers: VecDeque<bool>,
    /// Every path asked about, in order.
    pub asked: Vec<PathBuf>,
}

impl ScriptedConfirmer {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&mut self, path: &Path) -> bool {
        self.asked.push(path.to_path_buf());
        self.answers.pop_front().unwrap_or(false)
    }
}

// ──────────────────── report types ────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    Removed,
    Simulated,
    Declined,
    Failed,
}

/// A single removal failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionError {
    pub path: PathBuf,
    pub error: String,
    pub error_code: String,
}

/// Tallies for one directory pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub removed: usize,
    pub simulated: usize,
    pub declined: usize,
    pub failed: usize,
    pub kept_final_product: usize,
    pub kept_read_only: usize,
    pub kept_newer_source: usize,
    pub errors: Vec<DeletionError>,
}

impl DeletionReport {
    #[must_use]
    pub fn kept(&self) -> usize {
        self.kept_final_product + self.kept_read_only + self.kept_newer_source
    }

    fn record(&mut self, outcome: DeletionOutcome) {
        match outcome {
            DeletionOutcome::Removed => self.removed += 1,
            DeletionOutcome::Simulated => self.simulated += 1,
            DeletionOutcome::Declined => self.declined += 1,
            DeletionOutcome::Failed => self.failed += 1,
        }
    }
}

// ──────────────────── executor ────────────────────

/// Acts on keep/delete decisions for one directory.
pub struct DeletionExecutor<'a> {
    config: DeletionConfig,
    fs: &'a dyn Filesystem,
    confirmer: &'a mut dyn Confirmer,
    report: DeletionReport,
}

impl<'a> DeletionExecutor<'a> {
    pub fn new(
        config: DeletionConfig,
        fs: &'a dyn Filesystem,
        confirmer: &'a mut dyn Confirmer,
    ) -> Self {
        Self {
            config,
            fs,
            confirmer,
            report: DeletionReport::default(),
        }
    }

    #[must_use]
    pub fn report(&self) -> &DeletionReport {
        &self.report
    }

    /// Finish the pass and hand back the tallies.
    #[must_use]
    pub fn into_report(self) -> DeletionReport {
        self.report
    }

    /// Remove one file under the current pretend and confirm modes.
    pub fn remove(&mut self, path: &Path, reporter: &mut dyn Reporter) -> DeletionOutcome {
        let outcome = self.remove_inner(path, reporter);
        self.report.record(outcome);
        outcome
    }

    fn remove_inner(&mut self, path: &Path, reporter: &mut dyn Reporter) -> DeletionOutcome {
        let shown = path.display().to_string();

        if self.config.pretend {
            emit(reporter, &CleanEvent::WouldRemove { path: shown });
            return DeletionOutcome::Simulated;
        }

        if self.config.confirm && !self.confirmer.confirm(path) {
            emit(reporter, &CleanEvent::RemovalDeclined { path: shown });
            return DeletionOutcome::Declined;
        }

        match self.fs.remove_file(path) {
            Ok(()) => {
                emit(reporter, &CleanEvent::Removed { path: shown });
                DeletionOutcome::Removed
            }
            Err(source) => {
                let err = LintexError::from_io(path, source);
                emit(reporter, &CleanEvent::removal_failed(path, &err));
                self.report.errors.push(DeletionError {
                    path: path.to_path_buf(),
                    error: err.to_string(),
                    error_code: err.code().to_string(),
                });
                DeletionOutcome::Failed
            }
        }
    }

    /// Carry out every decision of one pairing, in bucket order.
    ///
    /// `source_extension` names the source file in keep notices.
    pub fn execute(
        &mut self,
        dir: &Path,
        source_extension: &str,
        pairing: &Pairing,
        reporter: &mut dyn Reporter,
    ) {
        let source = dir.join(format!("{}{source_extension}", pairing.basename));
        emit(
            reporter,
            &CleanEvent::PairingStarted {
                source: source.display().to_string(),
            },
        );

        for artifact in &pairing.artifacts {
            let path = dir.join(format!("{}{}", pairing.basename, artifact.extension));
            match artifact.decision {
                DeletionDecision::Delete => {
                    self.remove(&path, reporter);
                }
                DeletionDecision::KeepFinalProduct => {
                    self.report.kept_final_product += 1;
                    emit(
                        reporter,
                        &CleanEvent::KeptFinalProduct {
                            path: path.display().to_string(),
                        },
                    );
                }
                DeletionDecision::KeepReadOnly => {
                    self.report.kept_read_only += 1;
                    emit(
                        reporter,
                        &CleanEvent::KeptReadOnly {
                            path: path.display().to_string(),
                        },
                    );
                }
                DeletionDecision::KeepNewerSource => {
                    self.report.kept_newer_source += 1;
                    emit(
                        reporter,
                        &CleanEvent::KeptNewerSource {
                            path: path.display().to_string(),
                            source: source.display().to_string(),
                        },
                    );
                }
            }
        }
    }
}

// ──────────────────── tests ────────────────────
