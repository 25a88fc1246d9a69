// Network timing jitter grading
//
// Cycle-time spread is judged relative to the expected cycle time, so a
// 5 μs IQR means something different at 480 μs than at 3905 μs.

use crate::quality::grade::{GradeRule, Grading, QualityGrade, ThresholdTable};
use crate::reference::ReferenceCycleTime;
use crate::stats::StabilityStatistics;
use serde::Serialize;

/// Cycle-time spread expressed as percent of the reference cycle time
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JitterPercentages {
    pub stdev_pct: f64,
    /// Primary jitter metric
    pub iqr_pct: f64,
    pub range_pct: f64,
}

impl JitterPercentages {
    pub fn new(stats: &StabilityStatistics, reference_us: f64) -> Self {
        let pct = |value: f64| value / reference_us * 100.0;
        Self {
            stdev_pct: pct(stats.stdev),
            iqr_pct: pct(stats.iqr),
            range_pct: pct(stats.range),
        }
    }
}

static JITTER_RULES: [GradeRule<JitterPercentages>; 5] = [
    GradeRule {
        predicate: |m| m.iqr_pct < 0.1,
        grade: QualityGrade::Exceptional,
        rationale: "IQR < 0.1% of cycle",
    },
    GradeRule {
        predicate: |m| m.iqr_pct < 0.5,
        grade: QualityGrade::Excellent,
        rationale: "IQR < 0.5% of cycle",
    },
    GradeRule {
        predicate: |m| m.iqr_pct < 1.0,
        grade: QualityGrade::VeryGood,
        rationale: "IQR < 1.0% of cycle",
    },
    GradeRule {
        predicate: |m| m.iqr_pct < 2.0,
        grade: QualityGrade::Good,
        rationale: "IQR < 2.0% of cycle",
    },
    GradeRule {
        predicate: |m| m.iqr_pct < 5.0,
        grade: QualityGrade::Fair,
        rationale: "IQR < 5.0% of cycle",
    },
];

/// Jitter threshold table (percent of reference cycle time)
pub static JITTER_TABLE: ThresholdTable<JitterPercentages> = ThresholdTable {
    rules: &JITTER_RULES,
    fallback: Grading {
        grade: QualityGrade::Poor,
        rationale: "IQR ≥ 5.0% of cycle",
    },
};

/// Graded cycle-time stability
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JitterAssessment {
    pub grading: Grading,
    pub reference: ReferenceCycleTime,
    pub statistics: StabilityStatistics,
    pub percentages: JitterPercentages,
}

impl JitterAssessment {
    pub fn grade(&self) -> QualityGrade {
        self.grading.grade
    }

    /// Measured mean minus the reference cycle time (μs)
    pub fn offset_us(&self) -> f64 {
        self.statistics.mean - self.reference.micros()
    }
}

/// Grade cycle-time statistics against the reference cycle time
///
/// Only the IQR percentage decides the grade; the standard deviation and
/// peak-to-peak percentages are carried along for the report.
pub fn assess_jitter(
    statistics: &StabilityStatistics,
    reference: ReferenceCycleTime,
) -> JitterAssessment {
    let percentages = JitterPercentages::new(statistics, reference.micros());
    JitterAssessment {
        grading: JITTER_TABLE.evaluate(&percentages),
        reference,
        statistics: *statistics,
        percentages,
    }
}

/// Grade a bare IQR percentage
pub fn grade_iqr_pct(iqr_pct: f64) -> QualityGrade {
    JITTER_TABLE
        .evaluate(&JitterPercentages {
            stdev_pct: 0.0,
            iqr_pct,
            range_pct: 0.0,
        })
        .grade
}
