// Stability report assembly
//
// Stages run in a fixed order and never loop back:
//   resolve reference (explicit, then settings file)
//   -> fetch logs        (empty: stop with NoLogData)
//   -> extract samples   (none: stop with UnparseableLogData)
//   -> infer reference from the measured cycle times if still unresolved
//   -> summarize cycle times and corrections independently
//   -> grade each summary
//   -> assemble sections
//
// A section that cannot be graded reports why; it never hides the others.

mod render;

pub use render::{group_thousands, interpretation_guide};

use crate::error::AnalysisError;
use crate::log_parser::parse_log_samples;
use crate::log_source::LogSource;
use crate::quality::{assess_correction, assess_jitter, CorrectionAssessment, JitterAssessment};
use crate::reference::{resolve_external, resolve_with_samples, CycleTimeLocator, ReferenceCycleTime};
use crate::stats::{summarize, SampleSummary, MIN_STATISTICS_SAMPLES};
use serde::Serialize;

/// One graded report section
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Section<T> {
    Graded(T),
    InsufficientData(AnalysisError),
    /// Statistics exist but there is no positive reference to compare with
    NoReference,
}

impl<T> Section<T> {
    pub fn graded(&self) -> Option<&T> {
        match self {
            Section::Graded(value) => Some(value),
            _ => None,
        }
    }
}

/// Statistics of the raw buffer level columns
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BufferLevelSummary {
    /// Difference from the target buffer level
    pub difference: SampleSummary,
    /// Moving average of the difference
    pub average: SampleSummary,
}

/// Everything derived from a successfully parsed log batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StabilitySections {
    pub sample_count: usize,
    pub malformed_lines: usize,
    pub reference: Option<ReferenceCycleTime>,
    pub jitter: Section<JitterAssessment>,
    pub correction: Section<CorrectionAssessment>,
    pub buffer_level: BufferLevelSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ReportOutcome {
    /// Analysis stopped early; no sections available
    Truncated(AnalysisError),
    Complete(Box<StabilitySections>),
}

/// Result of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StabilityReport {
    pub service: String,
    pub max_lines: usize,
    pub generated_at: String,
    /// Reference known before reading logs (explicit or from settings)
    pub configured_reference: Option<ReferenceCycleTime>,
    pub outcome: ReportOutcome,
}

impl StabilityReport {
    pub fn sections(&self) -> Option<&StabilitySections> {
        match &self.outcome {
            ReportOutcome::Complete(sections) => Some(sections),
            ReportOutcome::Truncated(_) => None,
        }
    }

    pub fn truncation(&self) -> Option<&AnalysisError> {
        match &self.outcome {
            ReportOutcome::Truncated(err) => Some(err),
            ReportOutcome::Complete(_) => None,
        }
    }
}

/// Runs stability analysis for one service
pub struct StabilityAnalyzer {
    service: String,
    explicit_reference: Option<f64>,
    source: Box<dyn LogSource>,
    locator: Box<dyn CycleTimeLocator>,
}

impl StabilityAnalyzer {
    pub fn new(
        service: impl Into<String>,
        source: Box<dyn LogSource>,
        locator: Box<dyn CycleTimeLocator>,
    ) -> Self {
        Self {
            service: service.into(),
            explicit_reference: None,
            source,
            locator,
        }
    }

    /// Use `cycle_time_us` as the reference instead of looking it up
    pub fn with_reference(mut self, cycle_time_us: Option<f64>) -> Self {
        self.explicit_reference = cycle_time_us;
        self
    }

    /// Analyze the most recent `max_lines` log lines
    pub fn analyze(&self, max_lines: usize) -> StabilityReport {
        let configured_reference = resolve_external(self.explicit_reference, self.locator.as_ref());
        if let Some(reference) = configured_reference {
            tracing::info!(
                "Reference cycle time {:.1} μs ({})",
                reference.micros(),
                reference.source().describe()
            );
        }

        let outcome = match self.analyze_logs(max_lines, configured_reference) {
            Ok(sections) => ReportOutcome::Complete(Box::new(sections)),
            Err(err) => {
                tracing::warn!("{}", err);
                ReportOutcome::Truncated(err)
            }
        };

        StabilityReport {
            service: self.service.clone(),
            max_lines,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            configured_reference,
            outcome,
        }
    }

    fn analyze_logs(
        &self,
        max_lines: usize,
        configured_reference: Option<ReferenceCycleTime>,
    ) -> Result<StabilitySections, AnalysisError> {
        let logs = self.source.fetch(&self.service, max_lines);
        if logs.trim().is_empty() {
            return Err(AnalysisError::NoLogData {
                service: self.service.clone(),
            });
        }

        let samples = parse_log_samples(&logs);
        if samples.is_empty() {
            return Err(AnalysisError::UnparseableLogData {
                lines: logs.lines().count(),
            });
        }

        let reference = resolve_with_samples(configured_reference, samples.cycle_times_us());
        tracing::info!("Parsed {} receiver samples", samples.len());

        Ok(StabilitySections {
            sample_count: samples.len(),
            malformed_lines: samples.malformed_lines(),
            reference,
            jitter: jitter_section(&summarize(samples.cycle_times_us()), reference),
            correction: correction_section(&summarize(samples.correction())),
            buffer_level: BufferLevelSummary {
                difference: summarize(samples.buffer_diff()),
                average: summarize(samples.buffer_avg()),
            },
        })
    }
}

fn jitter_section(
    summary: &SampleSummary,
    reference: Option<ReferenceCycleTime>,
) -> Section<JitterAssessment> {
    let Some(stats) = summary.statistics() else {
        return Section::InsufficientData(AnalysisError::insufficient(
            "cycle time",
            MIN_STATISTICS_SAMPLES,
            summary.count(),
        ));
    };

    match reference {
        Some(reference) => Section::Graded(assess_jitter(stats, reference)),
        None => Section::NoReference,
    }
}

fn correction_section(summary: &SampleSummary) -> Section<CorrectionAssessment> {
    match assess_correction(summary) {
        Ok(assessment) => Section::Graded(assessment),
        Err(err) => Section::InsufficientData(err),
    }
}
