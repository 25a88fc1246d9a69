//! Log retrieval
//!
//! A `LogSource` returns the most recent log text of a service, bounded by a
//! line count. Retrieval failures yield an empty string; the report treats
//! that as "no logs" instead of an error.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Stdio};

pub trait LogSource {
    /// Return up to `max_lines` of the most recent log text for `service`
    fn fetch(&self, service: &str, max_lines: usize) -> String;
}

/// Reads the systemd journal via `journalctl -u <service> -n <N> --no-pager`
#[derive(Debug, Clone, Default)]
pub struct JournalctlSource;

impl LogSource for JournalctlSource {
    fn fetch(&self, service: &str, max_lines: usize) -> String {
        tracing::debug!("journalctl -u {} -n {} --no-pager", service, max_lines);

        let output = Command::new("journalctl")
            .arg("-u")
            .arg(service)
            .arg("-n")
            .arg(max_lines.to_string())
            .arg("--no-pager")
            .stderr(Stdio::null())
            .output();

        match output {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).into_owned()
            }
            Ok(output) => {
                tracing::warn!("journalctl exited with {} for {}", output.status, service);
                String::new()
            }
            Err(e) => {
                tracing::warn!("Failed to run journalctl: {}", e);
                String::new()
            }
        }
    }
}

/// Reads a saved log file, keeping only its last `max_lines` lines
///
/// The service name is not used for filtering; the file is assumed to hold
/// that service's output already.
#[derive(Debug, Clone)]
pub struct FileLogSource {
    path: PathBuf,
}

impl FileLogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LogSource for FileLogSource {
    fn fetch(&self, _service: &str, max_lines: usize) -> String {
        match fs::read(&self.path) {
            Ok(bytes) => tail_lines(&String::from_utf8_lossy(&bytes), max_lines),
            Err(e) => {
                tracing::warn!("Failed to read log file {}: {}", self.path.display(), e);
                String::new()
            }
        }
    }
}

/// In-memory log text
#[derive(Debug, Clone, Default)]
pub struct TextLogSource {
    text: String,
}

impl TextLogSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl LogSource for TextLogSource {
    fn fetch(&self, _service: &str, max_lines: usize) -> String {
        tail_lines(&self.text, max_lines)
    }
}

/// Last `max_lines` lines of `text`, newline-terminated
pub fn tail_lines(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(max_lines);

    let mut tail = String::new();
    for line in &lines[start..] {
        tail.push_str(line);
        tail.push('\n');
    }
    tail
}
