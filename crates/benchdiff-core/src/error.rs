//! Error types for benchmark extraction, metric resolution and configuration.

use std::path::PathBuf;

/// BenchDiff errors.
#[derive(Debug, thiserror::Error)]
pub enum BenchdiffError {
    /// No recognized metric field in a benchmark record.
    #[error("could not find a known metric in benchmark {name}")]
    MetricNotFound { name: String },

    /// Input document is neither `{"benchmarks": [...]}` nor a bare list.
    #[error(
        "input JSON doesn't contain a 'benchmarks' list; provide the JSON produced by Google Benchmark"
    )]
    MissingBenchmarks,

    /// Input file could not be read.
    #[error("cannot read {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    /// Input file is not valid JSON/YAML.
    #[error("cannot parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Invalid thresholds, gate settings or config file contents.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Benchmark name filter failed to compile.
    #[error("invalid benchmark filter '{pattern}': {message}")]
    InvalidFilter { pattern: String, message: String },
}

impl BenchdiffError {
    /// Exit code for CLI.
    ///
    /// Every variant is an input or configuration problem; gate failures are
    /// not errors and carry their own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MetricNotFound { .. }
            | Self::MissingBenchmarks
            | Self::Read { .. }
            | Self::Parse { .. }
            | Self::Config { .. }
            | Self::InvalidFilter { .. } => 2,
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result type for BenchDiff operations.
pub type BenchdiffResult<T> = Result<T, BenchdiffError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_not_found_names_the_record() {
        let err = BenchdiffError::MetricNotFound {
            name: "BM_Sort/64".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "could not find a known metric in benchmark BM_Sort/64"
        );
    }

    #[test]
    fn test_missing_benchmarks_names_the_expectation() {
        let msg = BenchdiffError::MissingBenchmarks.to_string();
        assert!(msg.contains("'benchmarks' list"));
        assert_eq!(BenchdiffError::MissingBenchmarks.exit_code(), 2);
    }
}
