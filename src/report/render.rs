// Human-readable report text
//
// Layout is informational only. What must hold: the jitter section comes
// before the buffer section, times are in μs, corrections are unitless.

use super::{Section, StabilityReport, StabilitySections};
use crate::quality::{CorrectionAssessment, JitterAssessment, MIN_CORRECTION_SAMPLES};
use crate::stats::SampleSummary;

const WIDTH: usize = 100;

fn rule(ch: char) -> String {
    ch.to_string().repeat(WIDTH)
}

/// Format an integer with `,` thousands separators
pub fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Threshold tables and what the metrics mean
pub fn interpretation_guide() -> String {
    let mut guide = String::new();
    guide.push_str(&format!("{}\n", rule('=')));
    guide.push_str("INTERPRETATION GUIDE:\n");
    guide.push_str(&format!("{}\n", rule('-')));
    guide.push_str("NETWORK JITTER (Percentage of Cycle Time):\n");
    guide.push_str("  IQR < 0.1%  : Exceptional - Reference-grade network timing\n");
    guide.push_str("  IQR < 0.5%  : Excellent - Very high quality network\n");
    guide.push_str("  IQR < 1.0%  : Very Good - Good network stability\n");
    guide.push_str("  IQR < 2.0%  : Good - Acceptable for audio streaming\n");
    guide.push_str("  IQR < 5.0%  : Fair - May benefit from network optimization\n");
    guide.push_str("  IQR ≥ 5.0%  : Poor - Investigate network issues (switch config, cables)\n");
    guide.push('\n');
    guide.push_str("BUFFER CORRECTION STABILITY:\n");
    guide.push_str("  IQR < 0.005 : Exceptional - Clocks very well matched\n");
    guide.push_str("  IQR < 0.010 : Excellent - Good clock matching or PTP working well\n");
    guide.push_str("  IQR < 0.020 : Good - Acceptable clock stability\n");
    guide.push_str("  IQR ≥ 0.020 : Poor - Significant clock mismatch, consider PTP\n");
    guide.push('\n');
    guide.push_str("WHAT THESE METRICS TELL YOU:\n");
    guide.push_str("  • Low network jitter: Network path is stable (good switches, cables)\n");
    guide.push_str("  • Low buffer corrections: Clocks are well matched (good crystal OR PTP active)\n");
    guide.push_str("  • High buffer corrections: Clock drift present - the receiver is compensating\n");
    guide.push('\n');
    guide.push_str("RECOMMENDATION:\n");
    guide.push_str("  If correction IQR > 0.020:\n");
    guide.push_str("    → Enable PTP synchronization between server and DAC\n");
    guide.push_str("    → This reduces the receiver's correction workload\n");
    guide.push_str(&format!("{}\n", rule('=')));
    guide
}

impl StabilityReport {
    /// Generate the full text report, interpretation guide first
    pub fn to_report_string(&self) -> String {
        let mut report = interpretation_guide();

        report.push_str(&format!(
            "DDS STABILITY ANALYSIS (LAST {} LOG ENTRIES)\n",
            group_thousands(self.max_lines)
        ));
        report.push_str(&format!("{}\n", rule('=')));
        report.push_str(&format!("Service: {}\n", self.service));
        report.push_str(&format!("Generated: {}\n", self.generated_at));

        match &self.configured_reference {
            Some(reference) => report.push_str(&format!(
                "Expected CycleTime: {:.1} μs ({})\n",
                reference.micros(),
                reference.source().describe()
            )),
            None => report.push_str("Expected CycleTime: Will be detected from logs\n"),
        }

        let sections = match self.sections() {
            Some(sections) => sections,
            None => {
                if let Some(err) = self.truncation() {
                    report.push_str(&format!("✗ {}\n", err));
                }
                return report;
            }
        };

        report.push_str("✓ Logs captured. Performing analysis.\n\n");
        report.push_str(&format!(
            "✓ Parsed {} log entries\n",
            group_thousands(sections.sample_count)
        ));
        if sections.malformed_lines > 0 {
            report.push_str(&format!(
                "○ Skipped {} malformed receiver lines\n",
                group_thousands(sections.malformed_lines)
            ));
        }
        report.push('\n');

        if self.configured_reference.is_none() {
            if let Some(reference) = &sections.reference {
                report.push_str(&format!(
                    "✓ Detected CycleTime: {:.1} μs ({})\n\n",
                    reference.micros(),
                    reference.source().describe()
                ));
            }
        }

        render_jitter(&mut report, &sections.jitter);
        report.push('\n');
        render_buffer(&mut report, sections);
        report.push_str(&format!("\n{}\n", rule('=')));

        report
    }
}

fn render_jitter(report: &mut String, section: &Section<JitterAssessment>) {
    let jitter = match section {
        Section::Graded(jitter) => jitter,
        Section::InsufficientData(err) => {
            report.push_str(&format!("1. NETWORK TIMING JITTER: {}\n", err));
            return;
        }
        Section::NoReference => {
            report.push_str(
                "1. NETWORK TIMING JITTER: No positive reference cycle time available\n",
            );
            return;
        }
    };

    let stats = &jitter.statistics;
    let pct = &jitter.percentages;

    report.push_str("1. NETWORK TIMING JITTER (from 'cy=...' values)\n");
    report.push_str(&format!("{}\n", rule('-')));
    report.push_str(&format!(
        "   Assessment:            {} {} ({})\n",
        jitter.grade().marker(),
        jitter.grade(),
        jitter.grading.rationale
    ));
    report.push_str(&format!(
        "   Samples found:         {}\n",
        group_thousands(stats.count)
    ));
    report.push_str(&format!(
        "   Expected Cycle Time:   {:.1} μs\n",
        jitter.reference.micros()
    ));
    report.push_str(&format!(
        "   Measured Average:      {:.3} μs (offset: {:+.3} μs)\n",
        stats.mean,
        jitter.offset_us()
    ));
    report.push('\n');
    report.push_str("   PERCENTAGE-BASED METRICS (% of cycle time):\n");
    report.push_str(&format!(
        "   Standard Deviation:    {:.3} μs ({:.3}%)\n",
        stats.stdev, pct.stdev_pct
    ));
    report.push_str(&format!(
        "   Interquartile Range:   {:.3} μs ({:.3}%) ← primary jitter metric\n",
        stats.iqr, pct.iqr_pct
    ));
    report.push_str(&format!(
        "   Peak-to-Peak Range:    {:.3} μs ({:.3}%)\n",
        stats.range, pct.range_pct
    ));
    report.push('\n');
    report.push_str("   ABSOLUTE VALUES:\n");
    report.push_str(&format!(
        "   Min / Max Cycle:       {:.3} μs / {:.3} μs\n",
        stats.min, stats.max
    ));
    report.push_str(&format!("{}\n", rule('-')));
}

fn render_buffer(report: &mut String, sections: &StabilitySections) {
    let correction = match &sections.correction {
        Section::Graded(correction) => correction,
        Section::InsufficientData(_) | Section::NoReference => {
            report.push_str(&format!(
                "2. BUFFER STABILITY: Insufficient data (need ≥{} samples, found {})\n",
                MIN_CORRECTION_SAMPLES,
                group_thousands(sections.sample_count)
            ));
            return;
        }
    };

    render_correction(report, correction);

    if let SampleSummary::Computed(diff) = sections.buffer_level.difference {
        report.push('\n');
        report.push_str("   BUFFER DIFFERENCE FROM TARGET:\n");
        report.push_str(&format!("   Mean:               {:+.4}\n", diff.mean));
        report.push_str(&format!("   Std deviation:      {:.4}\n", diff.stdev));
        report.push_str(&format!("   Range:              {:.4}\n", diff.range));
    }
    if let SampleSummary::Computed(avg) = sections.buffer_level.average {
        report.push('\n');
        report.push_str("   BUFFER MOVING AVERAGE:\n");
        report.push_str(&format!("   Mean:               {:+.4}\n", avg.mean));
        report.push_str(&format!("   Std deviation:      {:.4}\n", avg.stdev));
    }
}

fn render_correction(report: &mut String, correction: &CorrectionAssessment) {
    let stats = &correction.statistics;

    report.push_str("2. BUFFER MANAGEMENT STABILITY (from correction values)\n");
    report.push_str(&format!("{}\n", rule('-')));
    report.push_str(&format!(
        "   Assessment:         {} {} - {}\n",
        correction.grade().marker(),
        correction.grade(),
        correction.grading.rationale
    ));
    report.push_str(&format!(
        "   Samples analyzed:   {}\n",
        group_thousands(stats.count)
    ));
    report.push('\n');
    report.push_str("   CORRECTION VALUE STATISTICS:\n");
    report.push_str(&format!("   Mean correction:    {:+.4}\n", stats.mean));
    report.push_str(&format!("   Std deviation:      {:.4}\n", stats.stdev));
    report.push_str(&format!(
        "   Interquartile Range:{:.4} ← primary stability metric\n",
        stats.iqr
    ));
    report.push_str(&format!(
        "   Min / Max:          {:+.4} / {:+.4}\n",
        stats.min, stats.max
    ));
    report.push_str(&format!("   Total range:        {:.4}\n", stats.range));
    report.push('\n');
    report.push_str("   INTERPRETATION:\n");

    let spread_notes = correction.spread.map(|note| note.notes()).unwrap_or(&[]);
    for note in correction.bias.notes().iter().chain(spread_notes) {
        report.push_str(&format!("   • {}\n", note));
    }
}
