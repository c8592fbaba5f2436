//! Verbosity-gated reporters.
//!
//! Three sinks share the [`Reporter`] contract:
//! 1. [`ConsoleReporter`]: human lines, errors on the error stream
//! 2. [`JsonReporter`]: one JSON object per line
//! 3. [`MemoryReporter`]: keeps everything, for library consumers and tests
//!
//! Write failures are ignored; a closed stdout never stops a directory pass.

#![allow(missing_docs)]

use std::io::{self, Write};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::logger::events::{CleanEvent, Verbosity};

/// Sink for clean events.
pub trait Reporter {
    /// Offer an event at `tier`; the reporter decides whether to surface it.
    fn report(&mut self, tier: Verbosity, event: &CleanEvent);
}

/// Emit an event at its intrinsic tier.
pub fn emit(reporter: &mut dyn Reporter, event: &CleanEvent) {
    reporter.report(event.tier(), event);
}

// ──────────────────── console ────────────────────

/// Human-readable reporter.
pub struct ConsoleReporter<O: Write, E: Write> {
    verbosity: Verbosity,
    out: O,
    err: E,
    color: bool,
}

impl ConsoleReporter<io::Stdout, io::Stderr> {
    /// Report to the process's stdout and stderr.
    #[must_use]
    pub fn stdio(verbosity: Verbosity) -> Self {
        Self::new(verbosity, io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> ConsoleReporter<O, E> {
    pub fn new(verbosity: Verbosity, out: O, err: E) -> Self {
        Self {
            verbosity,
            out,
            err,
            color: cfg!(feature = "cli"),
        }
    }

    /// Disable ANSI styling regardless of terminal support.
    #[must_use]
    pub fn without_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write, E: Write> Reporter for ConsoleReporter<O, E> {
    fn report(&mut self, tier: Verbosity, event: &CleanEvent) {
        if tier > self.verbosity {
            return;
        }
        let line = if self.color {
            paint(event)
        } else {
            event.to_string()
        };
        let _ = if event.is_error() {
            writeln!(self.err, "{line}")
        } else {
            writeln!(self.out, "{line}").and_then(|()| self.out.flush())
        };
    }
}

#[cfg(feature = "cli")]
fn paint(event: &CleanEvent) -> String {
    use colored::Colorize;

    let text = event.to_string();
    match event {
        CleanEvent::DirectoryUnreadable { .. }
        | CleanEvent::EntrySkipped { .. }
        | CleanEvent::RemovalFailed { .. } => text.red().to_string(),
        CleanEvent::Removed { .. } => text.green().to_string(),
        CleanEvent::WouldRemove { .. } => text.yellow().to_string(),
        CleanEvent::KeptFinalProduct { .. }
        | CleanEvent::KeptReadOnly { .. }
        | CleanEvent::KeptNewerSource { .. }
        | CleanEvent::RemovalDeclined { .. } => text.cyan().to_string(),
        CleanEvent::Unmatched { .. } => text.magenta().to_string(),
        CleanEvent::RunFinished { .. } => text.bold().to_string(),
        _ => text.dimmed().to_string(),
    }
}

#[cfg(not(feature = "cli"))]
fn paint(event: &CleanEvent) -> String {
    event.to_string()
}

// ──────────────────── json lines ────────────────────

#[derive(Serialize)]
struct JsonLine<'a> {
    ts: String,
    tier: Verbosity,
    #[serde(flatten)]
    event: &'a CleanEvent,
}

/// JSON-lines reporter: one self-contained object per event.
///
/// Each line is assembled in memory and written with a single `write_all`
/// so a tailing consumer never sees a partial object.
pub struct JsonReporter<W: Write> {
    verbosity: Verbosity,
    out: W,
}

impl JsonReporter<io::Stdout> {
    #[must_use]
    pub fn stdout(verbosity: Verbosity) -> Self {
        Self::new(verbosity, io::stdout())
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(verbosity: Verbosity, out: W) -> Self {
        Self { verbosity, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn report(&mut self, tier: Verbosity, event: &CleanEvent) {
        if tier > self.verbosity {
            return;
        }
        let line = JsonLine {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            tier,
            event,
        };
        match serde_json::to_vec(&line) {
            Ok(mut buf) => {
                buf.push(b'\n');
                let _ = self.out.write_all(&buf).and_then(|()| self.out.flush());
            }
            Err(err) => {
                eprintln!("[LTX-2101] failed to serialize event: {err}");
            }
        }
    }
}

// ──────────────────── memory ────────────────────

/// Records every event with its tier, without gating.
#[derive(Debug, Default, Clone)]
pub struct MemoryReporter {
    pub events: Vec<(Verbosity, CleanEvent)>,
}

impl MemoryReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events a reporter configured at `verbosity` would surface.
    pub fn visible_at(&self, verbosity: Verbosity) -> impl Iterator<Item = &CleanEvent> {
        self.events
            .iter()
            .filter(move |(tier, _)| *tier <= verbosity)
            .map(|(_, event)| event)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CleanEvent> {
        self.events.iter().map(|(_, event)| event)
    }
}

impl Reporter for MemoryReporter {
    fn report(&mut self, tier: Verbosity, event: &CleanEvent) {
        self.events.push((tier, event.clone()));
    }
}
