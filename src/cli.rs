//! CLI argument parsing for ddscalc

use crate::config::AnalyzerConfig;
use crate::settings::DdsSettings;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for log analysis reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "ddscalc")]
#[command(version)]
#[command(
    about = "DDS cycle time calculator and receiver clock stability analyzer",
    long_about = None
)]
pub struct Cli {
    /// Detect and display MTU settings for all network interfaces
    #[arg(long = "detect-mtu", help_heading = "MTU Detection")]
    pub detect_mtu: bool,

    /// Network interface (default: auto-detect highest MTU)
    #[arg(long, value_name = "IFACE", help_heading = "MTU Detection")]
    pub interface: Option<String>,

    /// MTU size in bytes (default: auto-detect from interface)
    #[arg(long, value_name = "BYTES", help_heading = "DDS Configuration")]
    pub mtu: Option<u32>,

    /// Calculate for PCM instead of DSD
    #[arg(long, help_heading = "DDS Configuration")]
    pub pcm: bool,

    /// periodMin: minimum network buffer depth
    #[arg(long = "period-min", default_value = "4", help_heading = "DDS Configuration")]
    pub period_min: usize,

    /// periodMax: maximum network buffer depth
    #[arg(long = "period-max", default_value = "8", help_heading = "DDS Configuration")]
    pub period_max: usize,

    /// syncBufferCount: clock sync buffer
    #[arg(long = "sync-buffer", default_value = "6", help_heading = "DDS Configuration")]
    pub sync_buffer: usize,

    /// LatencyBuffer: additional latency
    #[arg(long = "latency-buffer", default_value = "0", help_heading = "DDS Configuration")]
    pub latency_buffer: usize,

    /// periodSizeMin: ALSA buffer minimum
    #[arg(long = "period-size-min", default_value = "2048", help_heading = "DDS Configuration")]
    pub period_size_min: usize,

    /// periodSizeMax: ALSA buffer maximum
    #[arg(long = "period-size-max", default_value = "8192", help_heading = "DDS Configuration")]
    pub period_size_max: usize,

    /// ThredMode value
    #[arg(long = "thred-mode", default_value = "257", help_heading = "DDS Configuration")]
    pub thred_mode: u32,

    /// CPU core for send thread
    #[arg(long = "cpu-send", default_value = "1", help_heading = "DDS Configuration")]
    pub cpu_send: usize,

    /// CPU core for other threads
    #[arg(long = "cpu-other", default_value = "2", help_heading = "DDS Configuration")]
    pub cpu_other: usize,

    /// Analyze the last N log entries of the sync host service (default: 1000)
    #[arg(
        long = "analyze-sync",
        value_name = "N",
        num_args = 0..=1,
        value_parser = parse_line_count,
        conflicts_with = "analyze_memory",
        help_heading = "Log Analysis"
    )]
    pub analyze_sync: Option<Option<usize>>,

    /// Analyze the last N log entries of the memory-play host service (default: 1000)
    #[arg(
        long = "analyze-memory",
        value_name = "N",
        num_args = 0..=1,
        value_parser = parse_line_count,
        help_heading = "Log Analysis"
    )]
    pub analyze_memory: Option<Option<usize>>,

    /// Expected cycle time in microseconds (default: settings file, then measured mean)
    #[arg(
        long = "cycle-time",
        value_name = "MICROS",
        allow_negative_numbers = true,
        help_heading = "Log Analysis"
    )]
    pub cycle_time: Option<f64>,

    /// Analyze a saved log file instead of the systemd journal
    #[arg(long = "log-file", value_name = "PATH", help_heading = "Log Analysis")]
    pub log_file: Option<PathBuf>,

    /// Analyzer configuration file (TOML)
    #[arg(long, value_name = "PATH", help_heading = "Log Analysis")]
    pub config: Option<PathBuf>,

    /// Report format (text or json)
    #[arg(long = "format", value_enum, default_value = "text", help_heading = "Output Control")]
    pub format: OutputFormat,

    /// Only generate and show the settings file text
    #[arg(long = "config-only", help_heading = "Output Control")]
    pub config_only: bool,

    /// Enable debug tracing output to stderr
    #[arg(long, help_heading = "Output Control")]
    pub debug: bool,
}

/// Log line count for `--analyze-*`; must be at least 1
fn parse_line_count(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("line count must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl Cli {
    /// Buffering parameters from the command line, written for `interface`
    pub fn settings(&self, interface: &str) -> DdsSettings {
        DdsSettings {
            interface: interface.to_string(),
            period_min: self.period_min,
            period_max: self.period_max,
            period_size_min: self.period_size_min,
            period_size_max: self.period_size_max,
            sync_buffer: self.sync_buffer,
            latency_buffer: self.latency_buffer,
            thred_mode: self.thred_mode,
            cpu_send: self.cpu_send,
            cpu_other: self.cpu_other,
        }
    }

    /// Whether a log analysis mode was requested
    pub fn analysis_requested(&self) -> bool {
        self.analyze_sync.is_some() || self.analyze_memory.is_some()
    }

    /// Reject an explicit `--cycle-time` that is not a positive number
    pub fn validate_cycle_time(&self) -> Result<(), String> {
        match self.cycle_time {
            Some(value) if !(value.is_finite() && value > 0.0) => Err(format!(
                "{} μs (must be a positive number of microseconds)",
                value
            )),
            _ => Ok(()),
        }
    }

    /// Service and line count of the requested analysis, if any
    ///
    /// A bare `--analyze-*` flag takes its line count from `config`.
    pub fn analysis_target(&self, config: &AnalyzerConfig) -> Option<(String, usize)> {
        let (service, lines) = match (self.analyze_sync, self.analyze_memory) {
            (Some(lines), _) => (&config.sync_service, lines),
            (None, Some(lines)) => (&config.memory_service, lines),
            (None, None) => return None,
        };
        Some((service.clone(), lines.unwrap_or(config.default_log_lines)))
    }
}
