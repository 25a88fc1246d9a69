//! Reference cycle time resolution
//!
//! The expected steady-state cycle time comes from the first source that has
//! one, in this order:
//!
//! 1. an explicit value supplied by the caller
//! 2. the `CycleTime=` entry of a persisted DDS settings file
//! 3. the mean of the cycle times measured in the logs
//!
//! Each step is consulted only when every earlier step had nothing to offer.

use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Where a reference cycle time came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSource {
    Explicit,
    Configuration,
    Inferred,
}

impl ReferenceSource {
    pub fn describe(self) -> &'static str {
        match self {
            ReferenceSource::Explicit => "from command line",
            ReferenceSource::Configuration => "from configuration",
            ReferenceSource::Inferred => "from log data",
        }
    }
}

/// Expected cycle time in microseconds; always finite and positive
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceCycleTime {
    micros: f64,
    source: ReferenceSource,
}

impl ReferenceCycleTime {
    fn new(micros: f64, source: ReferenceSource) -> Option<Self> {
        (micros.is_finite() && micros > 0.0).then_some(Self { micros, source })
    }

    pub fn explicit(micros: f64) -> Option<Self> {
        Self::new(micros, ReferenceSource::Explicit)
    }

    pub fn from_configuration(micros: f64) -> Option<Self> {
        Self::new(micros, ReferenceSource::Configuration)
    }

    /// Infer the reference as the mean of measured cycle times
    pub fn infer(cycle_times_us: &[f64]) -> Option<Self> {
        if cycle_times_us.is_empty() {
            return None;
        }
        let mean = cycle_times_us.iter().sum::<f64>() / cycle_times_us.len() as f64;
        Self::new(mean, ReferenceSource::Inferred)
    }

    pub fn micros(&self) -> f64 {
        self.micros
    }

    pub fn source(&self) -> ReferenceSource {
        self.source
    }
}

/// Source of a persisted reference cycle time
pub trait CycleTimeLocator {
    fn find_reference_cycle_time(&self) -> Option<f64>;
}

/// Looks for `CycleTime=<integer>` in DDS settings files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsFileLocator {
    paths: Vec<PathBuf>,
}

impl SettingsFileLocator {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl CycleTimeLocator for SettingsFileLocator {
    fn find_reference_cycle_time(&self) -> Option<f64> {
        find_reference_cycle_time(&self.paths)
    }
}

/// Never finds anything; used when the settings lookup is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocator;

impl CycleTimeLocator for NoLocator {
    fn find_reference_cycle_time(&self) -> Option<f64> {
        None
    }
}

fn cycle_time_entry() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bCycleTime\s*=\s*(\d+)").expect("CycleTime pattern is valid"))
}

/// Scan candidate settings files in order
///
/// The first readable file containing a `CycleTime=` entry wins. Missing or
/// unreadable files are skipped.
pub fn find_reference_cycle_time<P: AsRef<Path>>(paths: &[P]) -> Option<f64> {
    for path in paths {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!("Skipping settings file {}: {}", path.display(), e);
                continue;
            }
        };

        if let Some(value) = parse_cycle_time(&contents) {
            tracing::info!("Found CycleTime={} in {}", value, path.display());
            return Some(value);
        }
    }
    None
}

/// Extract the `CycleTime=` value from settings file text
pub fn parse_cycle_time(contents: &str) -> Option<f64> {
    cycle_time_entry()
        .captures(contents)
        .and_then(|caps| caps[1].parse::<u64>().ok())
        .map(|value| value as f64)
}

/// Resolve the reference from sources available before any logs are read
///
/// The locator is only consulted when no explicit value was given. An
/// explicit value that is not a positive number resolves to nothing; callers
/// reject such values before they get here.
pub fn resolve_external(
    explicit: Option<f64>,
    locator: &dyn CycleTimeLocator,
) -> Option<ReferenceCycleTime> {
    match explicit {
        Some(value) => ReferenceCycleTime::explicit(value),
        None => locator
            .find_reference_cycle_time()
            .and_then(ReferenceCycleTime::from_configuration),
    }
}

/// Complete the chain with the measured cycle times
pub fn resolve_with_samples(
    external: Option<ReferenceCycleTime>,
    cycle_times_us: &[f64],
) -> Option<ReferenceCycleTime> {
    external.or_else(|| ReferenceCycleTime::infer(cycle_times_us))
}
