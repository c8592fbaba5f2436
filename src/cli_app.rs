//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell as CompletionShell, generate};
use colored::control;
use thiserror::Error;

use lintex::core::config::Config;
use lintex::core::errors::LintexError;
use lintex::logger::events::Verbosity;
use lintex::logger::reporter::{ConsoleReporter, JsonReporter, Reporter};
use lintex::scanner::cleaner::Cleaner;
use lintex::scanner::deletion::{Confirmer, PromptConfirmer};
use lintex::scanner::fs::RealFs;

/// Removes TeX-related auxiliary files from the given directories (default:
/// the current directory). Files are removed only when they are more recent
/// than their TeX source and are not read only.
#[derive(Debug, Parser)]
#[command(
    name = "lintex",
    author,
    version,
    about = "Remove TeX auxiliary files newer than their .tex source",
    long_about = None
)]
pub struct Cli {
    /// Directories to clean.
    #[arg(value_name = "DIR")]
    dirs: Vec<PathBuf>,
    /// Ask before removing any file.
    #[arg(short = 'i', long, short_alias = 'I')]
    confirm: bool,
    /// Scan subdirectories recursively.
    #[arg(short = 'r', long, short_alias = 'R')]
    recurse: bool,
    /// Keep final documents (.pdf, .ps, .dvi).
    #[arg(short = 'k', long, short_alias = 'K')]
    keep: bool,
    /// Trailing string identifying editor backups; "" disables their cleanup.
    #[arg(short = 'b', long, short_alias = 'B', value_name = "EXT")]
    backup_suffix: Option<String>,
    /// Show what would be removed without removing anything.
    #[arg(short = 'p', long, short_alias = 'P')]
    pretend: bool,
    /// Permit removal of files older than their sources.
    #[arg(short = 'o', long, short_alias = 'O')]
    older: bool,
    /// Follow symlinked directories while recursing.
    #[arg(long)]
    follow_symlinks: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, short_alias = 'Q', overrides_with_all = ["verbose", "debug"])]
    quiet: bool,
    /// Report which files were removed and which were not.
    #[arg(short, long, overrides_with_all = ["quiet", "debug"])]
    verbose: bool,
    /// Trace every classification step.
    #[arg(short, long, short_alias = 'D', overrides_with_all = ["quiet", "verbose"])]
    debug: bool,
    /// Override config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long)]
    json: bool,
    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
    /// Print a shell completion script and exit.
    #[arg(long, value_name = "SHELL")]
    completions: Option<CompletionShell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input or configuration.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) => 2,
            Self::Internal(_) => 3,
        }
    }
}

impl From<LintexError> for CliError {
    fn from(err: LintexError) -> Self {
        if err.is_fatal() {
            Self::User(err.to_string())
        } else if matches!(err, LintexError::Serialization { .. }) {
            Self::Internal(err.to_string())
        } else {
            Self::Runtime(err.to_string())
        }
    }
}

/// Resolve configuration, then clean every requested directory.
///
/// Per-file and per-directory failures are reported as they happen and do
/// not change the exit status.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        let binary_name = command.get_name().to_string();
        generate(shell, &mut command, binary_name, &mut io::stdout());
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    apply_flags(&mut config, cli);
    // File, env and flags are all applied; this is the only validation.
    let registry = config.registry()?;
    let config_hash = config.stable_hash()?;
    let verbosity = config.clean.verbosity;

    let mode = output_mode(cli);
    let mut reporter = build_reporter(mode, verbosity, cli.no_color);
    let mut confirmer: Box<dyn Confirmer> = match mode {
        OutputMode::Human => Box::new(PromptConfirmer::stdio()),
        OutputMode::Json => Box::new(PromptConfirmer::new(io::stdin().lock(), io::stderr())),
    };

    Cleaner::new(
        &RealFs,
        &registry,
        config.policy(),
        confirmer.as_mut(),
        reporter.as_mut(),
    )
    .with_config_hash(config_hash)
    .run(&cli.dirs);

    Ok(())
}

/// Command-line flags take precedence over file and environment settings.
fn apply_flags(config: &mut Config, cli: &Cli) {
    let clean = &mut config.clean;
    clean.recurse |= cli.recurse;
    clean.confirm |= cli.confirm;
    clean.pretend |= cli.pretend;
    clean.keep_final_products |= cli.keep;
    clean.remove_older |= cli.older;
    clean.follow_symlinks |= cli.follow_symlinks;
    if let Some(suffix) = &cli.backup_suffix {
        clean.backup_suffix.clone_from(suffix);
    }
    if let Some(verbosity) = flag_verbosity(cli) {
        clean.verbosity = verbosity;
    }
}

fn flag_verbosity(cli: &Cli) -> Option<Verbosity> {
    if cli.debug {
        Some(Verbosity::Debug)
    } else if cli.verbose {
        Some(Verbosity::Verbose)
    } else if cli.quiet {
        Some(Verbosity::Silent)
    } else {
        None
    }
}

fn build_reporter(mode: OutputMode, verbosity: Verbosity, no_color: bool) -> Box<dyn Reporter> {
    match mode {
        OutputMode::Json => Box::new(JsonReporter::stdout(verbosity)),
        OutputMode::Human => {
            let console = ConsoleReporter::stdio(verbosity);
            if no_color || !io::stdout().is_terminal() {
                Box::new(console.without_color())
            } else {
                Box::new(console)
            }
        }
    }
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("LINTEX_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }
    match env_mode.map(|raw| raw.trim().to_ascii_lowercase()) {
        Some(mode) if mode == "json" => OutputMode::Json,
        _ => OutputMode::Human,
    }
}
