#![allow(dead_code)]

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{SystemTime, UNIX_EPOCH};

use filetime::{FileTime, set_file_mtime};
use lintex::scanner::fs::{DirEntryInfo, FileStat, Filesystem, RealFs};

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_lintex") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) { "lintex.exe" } else { "lintex" };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve lintex binary path for integration test"),
    }
}

const LINTEX_ENV: &[&str] = &[
    "LINTEX_RECURSE",
    "LINTEX_CONFIRM",
    "LINTEX_PRETEND",
    "LINTEX_KEEP",
    "LINTEX_OLDER",
    "LINTEX_FOLLOW_SYMLINKS",
    "LINTEX_BACKUP_SUFFIX",
    "LINTEX_VERBOSITY",
    "LINTEX_OUTPUT_FORMAT",
];

/// Run the binary with an isolated config home and no `LINTEX_*` overrides,
/// logging the whole exchange to a temp file.
pub fn run_cli_case(case_name: &str, args: &[&str]) -> CmdResult {
    run_cli_case_with_env(case_name, args, &[])
}

/// Like [`run_cli_case`], with `env` set after the `LINTEX_*` scrub.
pub fn run_cli_case_with_env(case_name: &str, args: &[&str], env: &[(&str, &str)]) -> CmdResult {
    let root = std::env::temp_dir().join("lintex-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let stamp = format!("{}-{}", sanitize(case_name), now_millis());
    let log_path = root.join(format!("{stamp}.log"));
    let config_home = root.join(format!("{stamp}-config"));
    let bin_path = resolve_bin_path();

    let mut command = Command::new(&bin_path);
    command
        .args(args)
        .env("XDG_CONFIG_HOME", &config_home)
        .env("NO_COLOR", "1")
        .env("RUST_BACKTRACE", "1");
    for name in LINTEX_ENV {
        command.env_remove(name);
    }
    for (name, value) in env {
        command.env(name, value);
    }
    let output = command.output().expect("execute lintex command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("env={env:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

/// Base modification time for fixtures.
pub const T: i64 = 1_600_000_000;

/// Create `name` under `dir` with its mtime pinned to `secs`.
pub fn file_at(dir: &Path, name: &str, secs: i64) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, name).expect("write fixture");
    set_file_mtime(&path, FileTime::from_unix_time(secs, 0)).expect("set fixture mtime");
    path
}

/// Real filesystem with scripted failures layered on top.
///
/// Covers cases the real filesystem cannot reproduce reliably, such as
/// read-only files when the tests run as root.
#[derive(Debug, Default)]
pub struct ScriptedFs {
    pub read_only: HashSet<PathBuf>,
    pub stat_failures: HashSet<PathBuf>,
    pub remove_denied: HashSet<PathBuf>,
    pub dead_entries: HashSet<OsString>,
}

impl Filesystem for ScriptedFs {
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = RealFs.list_dir(dir)?;
        for entry in &mut entries {
            if self.dead_entries.contains(&entry.name) {
                entry.live = false;
            }
        }
        Ok(entries)
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        if self.stat_failures.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "entry vanished during scan",
            ));
        }
        let mut stat = RealFs.stat(path)?;
        if self.read_only.contains(path) {
            stat.writable = false;
        }
        Ok(stat)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        if self.remove_denied.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "operation not permitted",
            ));
        }
        RealFs.remove_file(path)
    }
}
