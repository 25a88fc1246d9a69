// Buffer correction stability grading
//
// Correction values are how hard the receiver works to keep its buffer at
// the target level. Their spread (IQR) and bias (mean) are graded jointly;
// separate notes interpret the sign of the bias and the size of the spread.

use crate::error::AnalysisError;
use crate::quality::grade::{GradeRule, Grading, QualityGrade, ThresholdTable};
use crate::stats::{SampleSummary, StabilityStatistics};
use serde::Serialize;

/// Minimum number of correction samples before grading
pub const MIN_CORRECTION_SAMPLES: usize = 10;

/// Mean correction magnitude above which the bias note fires
pub const BIAS_THRESHOLD: f64 = 0.015;

/// IQR below which correction activity is considered well synchronized
pub const LOW_SPREAD_IQR: f64 = 0.005;

/// IQR above which drift is reported and PTP recommended
pub const HIGH_SPREAD_IQR: f64 = 0.020;

/// Inputs to the correction threshold table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionMetrics {
    pub iqr: f64,
    pub abs_mean: f64,
}

impl From<&StabilityStatistics> for CorrectionMetrics {
    fn from(stats: &StabilityStatistics) -> Self {
        Self {
            iqr: stats.iqr,
            abs_mean: stats.mean.abs(),
        }
    }
}

static CORRECTION_RULES: [GradeRule<CorrectionMetrics>; 4] = [
    GradeRule {
        predicate: |m| m.iqr < 0.001 && m.abs_mean < 0.005,
        grade: QualityGrade::Exceptional,
        rationale: "Minimal buffer adjustments needed",
    },
    GradeRule {
        predicate: |m| m.iqr < 0.005 && m.abs_mean < 0.010,
        grade: QualityGrade::Excellent,
        rationale: "Very stable buffer management",
    },
    GradeRule {
        predicate: |m| m.iqr < 0.010 && m.abs_mean < 0.020,
        grade: QualityGrade::Good,
        rationale: "Stable buffer management",
    },
    GradeRule {
        predicate: |m| m.iqr < 0.020,
        grade: QualityGrade::Fair,
        rationale: "Moderate buffer adjustments",
    },
];

/// Correction threshold table (raw correction units)
pub static CORRECTION_TABLE: ThresholdTable<CorrectionMetrics> = ThresholdTable {
    rules: &CORRECTION_RULES,
    fallback: Grading {
        grade: QualityGrade::Poor,
        rationale: "Frequent large buffer corrections (possible clock mismatch)",
    },
};

/// Direction the receiver keeps correcting in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionBias {
    /// Positive mean: buffer tends to need filling, receiver clock faster
    Filling,
    /// Negative mean: buffer tends to need draining, receiver clock slower
    Draining,
    Balanced,
}

impl CorrectionBias {
    pub fn from_mean(mean: f64) -> Self {
        if mean.abs() > BIAS_THRESHOLD {
            if mean > 0.0 {
                CorrectionBias::Filling
            } else {
                CorrectionBias::Draining
            }
        } else {
            CorrectionBias::Balanced
        }
    }

    pub fn notes(self) -> &'static [&'static str] {
        match self {
            CorrectionBias::Filling => &[
                "Positive mean correction: Buffer tends to need filling",
                "Possible causes: Receiver clock slightly faster than sender",
            ],
            CorrectionBias::Draining => &[
                "Negative mean correction: Buffer tends to need draining",
                "Possible causes: Receiver clock slightly slower than sender",
            ],
            CorrectionBias::Balanced => &["Mean correction near zero: Well-balanced clocks"],
        }
    }
}

/// What the correction spread says about clock synchronization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadNote {
    /// Low IQR: clocks well matched or PTP effective
    EffectiveSync,
    /// High IQR: drift present, external time sync recommended
    DriftDetected,
}

impl SpreadNote {
    pub fn from_iqr(iqr: f64) -> Option<Self> {
        if iqr < LOW_SPREAD_IQR {
            Some(SpreadNote::EffectiveSync)
        } else if iqr > HIGH_SPREAD_IQR {
            Some(SpreadNote::DriftDetected)
        } else {
            None
        }
    }

    pub fn notes(self) -> &'static [&'static str] {
        match self {
            SpreadNote::EffectiveSync => &[
                "Low IQR: Very stable - minimal active correction needed",
                "This suggests: Excellent clock matching OR effective PTP sync",
            ],
            SpreadNote::DriftDetected => &[
                "High IQR: Unstable - frequent buffer adjustments",
                "This suggests: Clock drift present, the receiver is actively compensating",
                "Recommendation: Consider enabling PTP synchronization",
            ],
        }
    }

    pub fn recommends_ptp(self) -> bool {
        matches!(self, SpreadNote::DriftDetected)
    }
}

/// Graded correction stability
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrectionAssessment {
    pub grading: Grading,
    pub statistics: StabilityStatistics,
    pub bias: CorrectionBias,
    pub spread: Option<SpreadNote>,
}

impl CorrectionAssessment {
    pub fn grade(&self) -> QualityGrade {
        self.grading.grade
    }
}

/// Grade correction statistics
///
/// Fails with `InsufficientSamples` below [`MIN_CORRECTION_SAMPLES`] so the
/// caller reports "insufficient data" instead of a grade.
pub fn assess_correction(summary: &SampleSummary) -> Result<CorrectionAssessment, AnalysisError> {
    let found = summary.count();
    let statistics = match summary.statistics() {
        Some(stats) if found >= MIN_CORRECTION_SAMPLES => *stats,
        _ => {
            return Err(AnalysisError::insufficient(
                "buffer correction",
                MIN_CORRECTION_SAMPLES,
                found,
            ))
        }
    };

    Ok(CorrectionAssessment {
        grading: CORRECTION_TABLE.evaluate(&CorrectionMetrics::from(&statistics)),
        statistics,
        bias: CorrectionBias::from_mean(statistics.mean),
        spread: SpreadNote::from_iqr(statistics.iqr),
    })
}
