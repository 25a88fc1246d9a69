// Stability grading against fixed domain thresholds
//
// Two independent policies:
// - Network timing jitter: cycle-time IQR as a percentage of the reference
//   cycle time, six grades from Exceptional to Poor.
// - Buffer correction stability: correction IQR and mean magnitude in raw
//   correction units, graded only with at least 10 samples.
//
// Both are expressed as ordered threshold tables (see `grade`), so the policy
// can be read and tested without going through report formatting.

mod correction;
mod grade;
mod jitter;

pub use correction::{
    assess_correction, CorrectionAssessment, CorrectionBias, CorrectionMetrics, SpreadNote,
    CORRECTION_TABLE, MIN_CORRECTION_SAMPLES,
};
pub use grade::{GradeRule, Grading, QualityGrade, ThresholdTable};
pub use jitter::{assess_jitter, grade_iqr_pct, JitterAssessment, JitterPercentages, JITTER_TABLE};
