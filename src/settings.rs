//! DDS host settings file generation and validation
//!
//! Renders the `setting.inf` consumed by the DDS host service from a computed
//! cycle time and the buffering parameters, and flags buffering combinations
//! that are known to behave poorly.

use serde::Serialize;
use std::fmt;

/// Minimum cycle time is this fraction of the cycle time
const CYCLE_MIN_FACTOR: f64 = 0.995;

/// Approximate latency contributed by one buffered period (ms)
const MS_PER_PERIOD: usize = 3;

/// Buffering and threading parameters written to the settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DdsSettings {
    pub interface: String,
    /// Minimum network buffer depth
    pub period_min: usize,
    /// Maximum network buffer depth
    pub period_max: usize,
    /// ALSA period size bounds
    pub period_size_min: usize,
    pub period_size_max: usize,
    /// Clock sync buffer depth
    pub sync_buffer: usize,
    pub latency_buffer: usize,
    pub thred_mode: u32,
    pub cpu_send: usize,
    pub cpu_other: usize,
}

impl Default for DdsSettings {
    fn default() -> Self {
        Self {
            interface: "enp5s0".to_string(),
            period_min: 4,
            period_max: 8,
            period_size_min: 2048,
            period_size_max: 8192,
            sync_buffer: 6,
            latency_buffer: 0,
            thred_mode: 257,
            cpu_send: 1,
            cpu_other: 2,
        }
    }
}

/// Severity of a settings note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteLevel {
    Warning,
    Info,
    Ok,
}

impl NoteLevel {
    pub fn marker(self) -> &'static str {
        match self {
            NoteLevel::Warning => "⚠",
            NoteLevel::Info => "ℹ",
            NoteLevel::Ok => "✓",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsNote {
    pub level: NoteLevel,
    pub message: String,
}

impl SettingsNote {
    fn new(level: NoteLevel, message: String) -> Self {
        Self { level, message }
    }
}

impl fmt::Display for SettingsNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.level.marker(), self.message)
    }
}

/// `CycleMinTime` for a given `CycleTime`
pub fn cycle_min_time(cycle_time_us: u32) -> u32 {
    (cycle_time_us as f64 * CYCLE_MIN_FACTOR) as u32
}

impl DdsSettings {
    /// Total buffered periods (network + clock sync)
    pub fn total_periods(&self) -> usize {
        self.period_max + self.sync_buffer
    }

    /// Advisory notes about the buffering parameters
    pub fn validate(&self) -> Vec<SettingsNote> {
        let mut notes = Vec::new();

        if self.period_min > 0 {
            let ratio = self.period_max as f64 / self.period_min as f64;
            if ratio > 3.0 {
                notes.push(SettingsNote::new(
                    NoteLevel::Warning,
                    format!(
                        "Large periodMin/Max ratio ({}:{} = {:.1}:1) may cause inefficient buffering. Recommended: ≤2.5:1",
                        self.period_min, self.period_max, ratio
                    ),
                ));
            }
        }

        if self.sync_buffer < self.period_min {
            notes.push(SettingsNote::new(
                NoteLevel::Warning,
                format!(
                    "syncBufferCount ({}) < periodMin ({}) may cause sync issues. Recommended: syncBuffer ≥ periodMin",
                    self.sync_buffer, self.period_min
                ),
            ));
        }

        if self.sync_buffer as f64 > self.period_max as f64 * 1.5 {
            notes.push(SettingsNote::new(
                NoteLevel::Info,
                format!(
                    "syncBufferCount ({}) >> periodMax ({}) adds extra latency. Consider reducing if stability is good.",
                    self.sync_buffer, self.period_max
                ),
            ));
        }

        if self.period_size_min == self.period_size_max {
            notes.push(SettingsNote::new(
                NoteLevel::Info,
                format!(
                    "periodSizeMin = periodSizeMax ({}) forces fixed ALSA buffer. Usually auto-selection works better.",
                    self.period_size_min
                ),
            ));
        }

        if self.period_size_min > 4096 {
            notes.push(SettingsNote::new(
                NoteLevel::Warning,
                format!(
                    "periodSizeMin ({}) is high. May cause compatibility issues with some applications.",
                    self.period_size_min
                ),
            ));
        }

        if self.period_size_max < 2048 {
            notes.push(SettingsNote::new(
                NoteLevel::Warning,
                format!(
                    "periodSizeMax ({}) is low. May limit buffer flexibility.",
                    self.period_size_max
                ),
            ));
        }

        let total = self.total_periods();
        if total < 10 {
            notes.push(SettingsNote::new(
                NoteLevel::Warning,
                format!(
                    "Total buffering ({} periods) is aggressive. Monitor closely for underruns on loaded systems.",
                    total
                ),
            ));
        } else if total > 20 {
            notes.push(SettingsNote::new(
                NoteLevel::Info,
                format!(
                    "Total buffering ({} periods) is very conservative. Higher latency (~{}ms) but maximum stability.",
                    total,
                    total * MS_PER_PERIOD
                ),
            ));
        }

        if self.period_min == 4 && self.period_max == 8 && self.sync_buffer == 6 {
            notes.push(SettingsNote::new(
                NoteLevel::Ok,
                "Using recommended optimized settings (4/8/6)".to_string(),
            ));
        }

        notes
    }

    /// Render the settings file for `cycle_time_us`
    pub fn render(&self, cycle_time_us: u32) -> String {
        let mut out = String::new();
        out.push_str("[global]\n");
        out.push_str(&format!("Interface={}\n", self.interface));
        out.push_str("TargetProfileLimitTime=0\n");
        out.push_str(&format!("ThredMode={}\n", self.thred_mode));
        out.push_str("InfoCycle=100000\n");
        out.push_str("FlexCycle=max\n");
        out.push_str(&format!("CycleTime={}\n", cycle_time_us));
        out.push_str(&format!("CycleMinTime={}\n", cycle_min_time(cycle_time_us)));
        out.push_str("Debug=stdout\n");
        out.push_str(&format!("periodMax={}\n", self.period_max));
        out.push_str(&format!("periodMin={}\n", self.period_min));
        out.push_str(&format!("periodSizeMax={}\n", self.period_size_max));
        out.push_str(&format!("periodSizeMin={}\n", self.period_size_min));
        out.push_str(&format!("syncBufferCount={}\n", self.sync_buffer));
        out.push_str("alsaUnderrun=enable\n");
        out.push_str("unInitMemDet=disable\n");
        out.push_str(&format!("CpuSend={}\n", self.cpu_send));
        out.push_str(&format!("CpuOther={}\n", self.cpu_other));
        out.push_str(&format!("LatencyBuffer={}\n", self.latency_buffer));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::parse_cycle_time;

    #[test]
    fn test_cycle_min_time() {
        assert_eq!(cycle_min_time(2930), 2915);
        assert_eq!(cycle_min_time(3905), 3885);
        assert_eq!(cycle_min_time(480), 477);
    }

    #[test]
    fn test_defaults_are_recommended() {
        let notes = DdsSettings::default().validate();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NoteLevel::Ok);
        assert!(notes[0].to_string().starts_with("✓ Using recommended"));
    }

    #[test]
    fn test_aggressive_buffering() {
        let settings = DdsSettings {
            period_min: 2,
            period_max: 4,
            sync_buffer: 1,
            ..DdsSettings::default()
        };
        let notes = settings.validate();
        assert!(notes.iter().any(|n| n.message.contains("syncBufferCount (1) < periodMin (2)")));
        assert!(notes.iter().any(|n| n.message.contains("Total buffering (5 periods) is aggressive")));
    }

    #[test]
    fn test_conservative_buffering() {
        let settings = DdsSettings {
            period_min: 4,
            period_max: 16,
            sync_buffer: 30,
            period_size_min: 8192,
            period_size_max: 8192,
            ..DdsSettings::default()
        };
        let notes = settings.validate();
        let messages: Vec<&str> = notes.iter().map(|n| n.message.as_str()).collect();

        assert!(messages.iter().any(|m| m.contains("4:16 = 4.0:1")));
        assert!(messages.iter().any(|m| m.contains("adds extra latency")));
        assert!(messages.iter().any(|m| m.contains("forces fixed ALSA buffer")));
        assert!(messages.iter().any(|m| m.contains("periodSizeMin (8192) is high")));
        assert!(messages.iter().any(|m| m.contains("(~138ms)")));
        assert!(!messages.iter().any(|m| m.contains("recommended optimized")));
    }

    #[test]
    fn test_small_alsa_period() {
        let settings = DdsSettings {
            period_size_min: 512,
            period_size_max: 1024,
            ..DdsSettings::default()
        };
        let notes = settings.validate();
        assert!(notes.iter().any(|n| n.message.contains("periodSizeMax (1024) is low")));
    }

    #[test]
    fn test_render_contains_cycle_times() {
        let text = DdsSettings::default().render(2930);
        assert!(text.starts_with("[global]\nInterface=enp5s0\n"));
        assert!(text.contains("CycleTime=2930\n"));
        assert!(text.contains("CycleMinTime=2915\n"));
        assert!(text.contains("syncBufferCount=6\n"));
        assert!(text.ends_with("LatencyBuffer=0\n"));
    }

    #[test]
    fn test_rendered_file_feeds_reference_lookup() {
        let text = DdsSettings::default().render(3905);
        assert_eq!(parse_cycle_time(&text), Some(3905.0));
    }
}
