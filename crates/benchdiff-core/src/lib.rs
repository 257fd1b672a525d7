//! Benchmark comparison, per-kernel aggregation and CI gating.
//!
//! This crate is pure logic (no printing, no ANSI). It takes two runs of
//! Google Benchmark style measurements (a reference and a current run),
//! compares them name by name and produces:
//!
//! - a deterministic, regression-first list of [`Comparison`]s
//! - per-kernel [`AggregateEntry`]s folding `BM_X/32`, `BM_X/64`, ... into `BM_X`
//! - a [`GateVerdict`] deciding whether a CI job should fail
//!
//! # Quick Start
//!
//! ```no_run
//! use benchdiff_core::{aggregate, compare, evaluate, load_benchmarks, GatePolicy, Thresholds};
//!
//! # fn example() -> benchdiff_core::BenchdiffResult<()> {
//! let reference = load_benchmarks("ref.json")?;
//! let current = load_benchmarks("cur.json")?;
//!
//! let thresholds = Thresholds::default();
//! let comparisons = compare(&reference, &current, None, &thresholds);
//! let kernels = aggregate(&comparisons, &thresholds);
//! let verdict = evaluate(&comparisons, &GatePolicy::default());
//!
//! println!("{} comparisons, {} kernels, failed={}", comparisons.len(), kernels.len(), verdict.failed);
//! # Ok(())
//! # }
//! ```
//!
//! # Polarity
//!
//! Time-like metrics (`real_time`, `cpu_time`) regress when they grow.
//! Throughput-like metrics (`bytes_per_second`, `items_per_second`) regress
//! when they shrink.

pub mod aggregate;
pub mod compare;
pub mod config;
pub mod error;
pub mod gate;
pub mod metric;
pub mod record;
pub mod severity;
pub mod thresholds;

pub use aggregate::{aggregate, split_kernel_and_size, AggregateEntry};
pub use compare::{
    compare, improvement_magnitude_pct, regression_magnitude_pct, top_improvements,
    top_regressions, Comparison, ComparisonSummary, Direction,
};
pub use config::{BenchdiffConfig, GateConfig, CONFIG_FILE_NAME};
pub use error::{BenchdiffError, BenchdiffResult};
pub use gate::{evaluate, GatePolicy, GateVerdict};
pub use metric::{is_throughput, select, MetricSample, RECOGNIZED_METRICS, THROUGHPUT_METRICS};
pub use record::{
    compile_filter, extract_benchmarks, filter_by_name, load_benchmarks, BenchmarkMap,
    BenchmarkRecord,
};
pub use severity::{classify, Severity};
pub use thresholds::Thresholds;
