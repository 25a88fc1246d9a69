//! Error taxonomy for log analysis
//!
//! None of these are fatal. `NoLogData` and `UnparseableLogData` end a report
//! early, `InsufficientSamples` degrades a single report section, and
//! `MalformedLogLine` is absorbed by the extractor.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisError {
    #[error("No logs found for service '{service}'")]
    NoLogData { service: String },

    #[error("Could not parse log data: none of {lines} lines matched the expected format")]
    UnparseableLogData { lines: usize },

    #[error("Insufficient data for {metric}: need at least {required} samples, found {found}")]
    InsufficientSamples {
        metric: String,
        required: usize,
        found: usize,
    },

    #[error("Malformed log line {line}: invalid {field} value '{value}'")]
    MalformedLogLine {
        line: usize,
        field: &'static str,
        value: String,
    },
}

impl AnalysisError {
    pub fn insufficient(metric: &str, required: usize, found: usize) -> Self {
        AnalysisError::InsufficientSamples {
            metric: metric.to_string(),
            required,
            found,
        }
    }
}
