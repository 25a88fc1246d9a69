//! Receiver log sample extraction
//!
//! The DDS receiver periodically logs its buffer controller state:
//!
//! ```text
//! info rcv 2 -0.0110 -0.0110  0.0019 cy=3185960450
//!          |  |       |        |         |
//!          |  diff    avg      correct   cycle time (ps)
//!          calc type (ignored)
//! ```
//!
//! Lines are matched in two steps. The outer shape (marker, tag, three
//! whitespace-separated fields, `cy=` field) decides whether a line is a
//! receiver line at all; each captured field is then converted on its own.
//! A receiver line with an unconvertible field is skipped rather than
//! aborting the parse.

use crate::error::AnalysisError;
use regex::Regex;
use std::sync::OnceLock;

/// Picoseconds per microsecond
const PS_PER_US: f64 = 1_000_000.0;

fn receiver_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"info\s+rcv\s+\d+\s+(\S+)\s+(\S+)\s+(\S+)\s+cy=(\S+)")
            .expect("receiver line pattern is valid")
    })
}

fn signed_decimal() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?\d+\.\d+$").expect("decimal pattern is valid"))
}

/// Index-aligned samples extracted from receiver log lines
///
/// Sample `i` of every sequence comes from the same log line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogSampleSet {
    buffer_diff: Vec<f64>,
    buffer_avg: Vec<f64>,
    correction: Vec<f64>,
    cycle_times_us: Vec<f64>,
    malformed_lines: usize,
}

impl LogSampleSet {
    pub fn len(&self) -> usize {
        self.cycle_times_us.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycle_times_us.is_empty()
    }

    /// Difference from the target buffer level
    pub fn buffer_diff(&self) -> &[f64] {
        &self.buffer_diff
    }

    /// Moving average of the buffer difference
    pub fn buffer_avg(&self) -> &[f64] {
        &self.buffer_avg
    }

    /// Correction applied by the receiver
    pub fn correction(&self) -> &[f64] {
        &self.correction
    }

    /// Measured cycle times in microseconds
    pub fn cycle_times_us(&self) -> &[f64] {
        &self.cycle_times_us
    }

    /// Receiver lines skipped because a field failed conversion
    pub fn malformed_lines(&self) -> usize {
        self.malformed_lines
    }

    fn push(&mut self, sample: ReceiverSample) {
        self.buffer_diff.push(sample.diff);
        self.buffer_avg.push(sample.avg);
        self.correction.push(sample.correction);
        self.cycle_times_us.push(sample.cycle_time_us);
    }
}

#[derive(Debug, Clone, Copy)]
struct ReceiverSample {
    diff: f64,
    avg: f64,
    correction: f64,
    cycle_time_us: f64,
}

/// Extract receiver samples from raw log text
///
/// Unrelated lines are ignored. The result preserves log line order.
///
/// # Example
/// ```
/// use ddscalc::log_parser::parse_log_samples;
///
/// let logs = "boot ok\ninfo rcv 2 -0.0110 -0.0110  0.0019 cy=3185960450\n";
/// let samples = parse_log_samples(logs);
/// assert_eq!(samples.len(), 1);
/// assert_eq!(samples.correction(), &[0.0019]);
/// assert!((samples.cycle_times_us()[0] - 3185.96045).abs() < 1e-9);
/// ```
pub fn parse_log_samples(logs: &str) -> LogSampleSet {
    let mut samples = LogSampleSet::default();

    for (idx, line) in logs.lines().enumerate() {
        match parse_receiver_line(idx + 1, line) {
            Some(Ok(sample)) => samples.push(sample),
            Some(Err(err)) => {
                tracing::debug!("Skipping log line: {}", err);
                samples.malformed_lines += 1;
            }
            None => {}
        }
    }

    tracing::debug!(
        "Extracted {} receiver samples ({} malformed lines skipped)",
        samples.len(),
        samples.malformed_lines
    );

    samples
}

fn parse_receiver_line(
    line_no: usize,
    line: &str,
) -> Option<Result<ReceiverSample, AnalysisError>> {
    let caps = receiver_line().captures(line)?;

    let parse = || -> Result<ReceiverSample, AnalysisError> {
        let diff = parse_decimal(line_no, "difference", &caps[1])?;
        let avg = parse_decimal(line_no, "average", &caps[2])?;
        let correction = parse_decimal(line_no, "correction", &caps[3])?;
        let cycle_ps = parse_picoseconds(line_no, &caps[4])?;

        Ok(ReceiverSample {
            diff,
            avg,
            correction,
            cycle_time_us: cycle_ps as f64 / PS_PER_US,
        })
    };

    Some(parse())
}

fn parse_decimal(line: usize, field: &'static str, raw: &str) -> Result<f64, AnalysisError> {
    let malformed = || AnalysisError::MalformedLogLine {
        line,
        field,
        value: raw.to_string(),
    };

    if !signed_decimal().is_match(raw) {
        return Err(malformed());
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(malformed)
}

fn parse_picoseconds(line: usize, raw: &str) -> Result<u64, AnalysisError> {
    raw.parse::<u64>()
        .map_err(|_| AnalysisError::MalformedLogLine {
            line,
            field: "cycle time",
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_LINE: &str = "info rcv 2 -0.0110 -0.0110  0.0019 cy=3185960450";

    #[test]
    fn test_parses_single_line() {
        let samples = parse_log_samples(GOOD_LINE);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples.buffer_diff(), &[-0.0110]);
        assert_eq!(samples.buffer_avg(), &[-0.0110]);
        assert_eq!(samples.correction(), &[0.0019]);
        assert!((samples.cycle_times_us()[0] - 3185.96045).abs() < 1e-9);
        assert_eq!(samples.malformed_lines(), 0);
    }

    #[test]
    fn test_journal_prefix_is_ignored() {
        let line = "Oct 16 12:00:01 host diretta[812]: info rcv 0 +0.0020 0.0015 -0.0001 cy=1920000000";
        let samples = parse_log_samples(line);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples.buffer_diff(), &[0.0020]);
        assert_eq!(samples.correction(), &[-0.0001]);
        assert_eq!(samples.cycle_times_us(), &[1920.0]);
    }

    #[test]
    fn test_unrelated_lines_are_skipped_silently() {
        let logs = "Started diretta_sync_host.service\n\
                    info snd 2 0.1 0.1 0.1 cy=1\n\
                    info rcv 3 0.0001 0.0002 0.0003 cy=2930000000\n\
                    random noise";
        let samples = parse_log_samples(logs);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples.malformed_lines(), 0);
    }

    #[test]
    fn test_malformed_correction_is_skipped() {
        let logs = format!("{}\ninfo rcv 2 -0.0110 -0.0110 abc cy=3185960450", GOOD_LINE);
        let samples = parse_log_samples(&logs);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples.malformed_lines(), 1);
    }

    #[test]
    fn test_overflowing_cycle_time_is_skipped() {
        let logs = "info rcv 2 0.0 0.0 0.0 cy=99999999999999999999999";
        let samples = parse_log_samples(logs);
        assert!(samples.is_empty());
        assert_eq!(samples.malformed_lines(), 1);
    }

    #[test]
    fn test_oversized_decimal_is_skipped() {
        let huge = format!("{}.0", "9".repeat(400));
        let logs = format!("{}\ninfo rcv 2 {} -0.0110 0.0019 cy=3185960450", GOOD_LINE, huge);
        let samples = parse_log_samples(&logs);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples.malformed_lines(), 1);
        assert!(samples.buffer_diff().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_integer_fields_are_rejected() {
        // Buffer fields are always logged with a fractional part
        let samples = parse_log_samples("info rcv 2 1 0.0 0.0 cy=1000");
        assert!(samples.is_empty());
        assert_eq!(samples.malformed_lines(), 1);
    }

    #[test]
    fn test_sequences_stay_aligned_and_ordered() {
        let logs = "info rcv 1 0.1000 0.2000 0.3000 cy=1000000\n\
                    info rcv 1 bad 0.2000 0.3000 cy=1000000\n\
                    info rcv 1 0.4000 0.5000 0.6000 cy=2000000\n";
        let samples = parse_log_samples(logs);
        assert_eq!(samples.buffer_diff(), &[0.1, 0.4]);
        assert_eq!(samples.buffer_avg(), &[0.2, 0.5]);
        assert_eq!(samples.correction(), &[0.3, 0.6]);
        assert_eq!(samples.cycle_times_us(), &[1.0, 2.0]);
    }

    #[test]
    fn test_empty_input() {
        let samples = parse_log_samples("");
        assert!(samples.is_empty());
        assert_eq!(samples.len(), 0);
    }
}
