// Quality grades and declarative threshold tables
//
// Each grading policy is an ordered list of (predicate, grade) rules that is
// evaluated top to bottom; the first matching rule wins and the table's
// fallback applies when none match.

use serde::Serialize;
use std::fmt;

/// Qualitative stability grade
///
/// Variants are declared worst to best so the derived ordering reads
/// naturally: `Exceptional > Excellent > ... > Poor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityGrade {
    Poor,
    Fair,
    Good,
    VeryGood,
    Excellent,
    Exceptional,
}

impl QualityGrade {
    pub fn label(self) -> &'static str {
        match self {
            QualityGrade::Exceptional => "Exceptional",
            QualityGrade::Excellent => "Excellent",
            QualityGrade::VeryGood => "Very Good",
            QualityGrade::Good => "Good",
            QualityGrade::Fair => "Fair",
            QualityGrade::Poor => "Poor",
        }
    }

    /// Report marker: check for good grades, circle for fair, cross for poor
    pub fn marker(self) -> &'static str {
        match self {
            QualityGrade::Poor => "✗",
            QualityGrade::Fair => "○",
            _ => "✓",
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of a threshold table
#[derive(Debug, Clone, Copy)]
pub struct GradeRule<M> {
    pub predicate: fn(&M) -> bool,
    pub grade: QualityGrade,
    pub rationale: &'static str,
}

/// Ordered rules plus the grade used when no rule matches
#[derive(Debug, Clone, Copy)]
pub struct ThresholdTable<M: 'static> {
    pub rules: &'static [GradeRule<M>],
    pub fallback: Grading,
}

impl<M: 'static> ThresholdTable<M> {
    /// First matching rule, or the fallback
    pub fn evaluate(&self, metric: &M) -> Grading {
        self.rules
            .iter()
            .find(|rule| (rule.predicate)(metric))
            .map(|rule| Grading {
                grade: rule.grade,
                rationale: rule.rationale,
            })
            .unwrap_or(self.fallback)
    }
}

/// A grade together with the reason it was assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grading {
    pub grade: QualityGrade,
    pub rationale: &'static str,
}
