//! Descriptive statistics for stability analysis
//!
//! The interquartile range is the primary spread metric: timing logs contain
//! occasional scheduling spikes unrelated to clock or network behaviour, and
//! the IQR ignores a handful of those where the standard deviation does not.

use serde::Serialize;

/// Fewer samples than this and statistics are undefined
pub const MIN_STATISTICS_SAMPLES: usize = 2;

/// Statistics for one sample sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StabilityStatistics {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation
    pub stdev: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
}

/// Outcome of summarizing a sample sequence
///
/// `Insufficient` is not a computed summary with zero spread. A zero IQR is a
/// real measurement; a missing one is not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SampleSummary {
    Insufficient { count: usize },
    Computed(StabilityStatistics),
}

impl SampleSummary {
    pub fn count(&self) -> usize {
        match self {
            SampleSummary::Insufficient { count } => *count,
            SampleSummary::Computed(stats) => stats.count,
        }
    }

    pub fn statistics(&self) -> Option<&StabilityStatistics> {
        match self {
            SampleSummary::Insufficient { .. } => None,
            SampleSummary::Computed(stats) => Some(stats),
        }
    }
}

/// Summarize `values`
///
/// # Example
/// ```
/// use ddscalc::stats::summarize;
///
/// let summary = summarize(&[1.0, 2.0, 3.0, 4.0]);
/// let stats = summary.statistics().unwrap();
/// assert_eq!(stats.q1, 1.75);
/// assert_eq!(stats.q3, 3.25);
/// assert_eq!(stats.iqr, 1.5);
///
/// assert!(summarize(&[42.0]).statistics().is_none());
/// ```
pub fn summarize(values: &[f64]) -> SampleSummary {
    let count = values.len();
    if count < MIN_STATISTICS_SAMPLES {
        return SampleSummary::Insufficient { count };
    }

    let mean = values.iter().sum::<f64>() / count as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let min = sorted[0];
    let max = sorted[count - 1];
    let q1 = percentile(&sorted, 25.0);
    let q3 = percentile(&sorted, 75.0);

    SampleSummary::Computed(StabilityStatistics {
        count,
        mean,
        stdev: variance.sqrt(),
        min,
        max,
        range: max - min,
        q1,
        q3,
        // Interpolation can leave q3 a hair below q1 on constant input
        iqr: (q3 - q1).max(0.0),
    })
}

/// Percentile of already sorted data by linear interpolation
///
/// Uses the index `p / 100 * (n - 1)` and interpolates between the two
/// bracketing order statistics. This is Hyndman & Fan definition 7, the
/// default of R's `quantile` and NumPy's `percentile`.
pub fn percentile(sorted: &[f64], percentile: f64) -> f64 {
    match sorted.len() {
        0 => return 0.0,
        1 => return sorted[0],
        _ => {}
    }

    let index = (percentile / 100.0) * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let weight = index - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn computed(values: &[f64]) -> StabilityStatistics {
        *summarize(values).statistics().unwrap()
    }

    #[test]
    fn test_empty_is_insufficient() {
        let summary = summarize(&[]);
        assert_eq!(summary, SampleSummary::Insufficient { count: 0 });
        assert_eq!(summary.count(), 0);
    }

    #[test]
    fn test_single_sample_is_insufficient() {
        let summary = summarize(&[1920.0]);
        assert_eq!(summary, SampleSummary::Insufficient { count: 1 });
        assert!(summary.statistics().is_none());
    }

    #[test]
    fn test_basic_statistics() {
        let stats = computed(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.count, 8);
        assert_eq!(stats.mean, 5.0);
        // Population stdev (divide by n)
        assert_eq!(stats.stdev, 2.0);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert_eq!(stats.range, 7.0);
    }

    #[test]
    fn test_quartiles_interpolate() {
        let stats = computed(&[1918.0, 1920.0, 1921.0, 1919.5, 1920.5]);
        // sorted: 1918, 1919.5, 1920, 1920.5, 1921 -> index 1 and 3
        assert_eq!(stats.q1, 1919.5);
        assert_eq!(stats.q3, 1920.5);
        assert_eq!(stats.iqr, 1.0);
    }

    #[test]
    fn test_quartiles_unsorted_input() {
        let stats = computed(&[1800.0, 2000.0, 1850.0, 1950.0, 1900.0]);
        assert_eq!(stats.q1, 1850.0);
        assert_eq!(stats.q3, 1950.0);
        assert_eq!(stats.iqr, 100.0);
        assert_eq!(stats.range, 200.0);
    }

    #[test]
    fn test_iqr_ignores_single_spike() {
        let mut values = vec![100.0; 20];
        values[7] = 10_000.0;
        let stats = computed(&values);
        assert_eq!(stats.iqr, 0.0);
        assert!(stats.stdev > 1000.0);
    }

    #[test]
    fn test_constant_input_has_zero_spread() {
        let stats = computed(&[0.1, 0.1, 0.1]);
        assert_eq!(stats.iqr, 0.0);
        assert_eq!(stats.range, 0.0);
        assert!(stats.stdev.abs() < 1e-12);
    }

    #[test]
    fn test_percentile_edges() {
        assert_eq!(percentile(&[], 25.0), 0.0);
        assert_eq!(percentile(&[3.0], 75.0), 3.0);
        assert_eq!(percentile(&[1.0, 2.0], 0.0), 1.0);
        assert_eq!(percentile(&[1.0, 2.0], 100.0), 2.0);
        assert_eq!(percentile(&[1.0, 2.0], 50.0), 1.5);
    }
}
