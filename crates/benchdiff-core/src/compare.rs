//! Name-by-name comparison of a reference run against a current run.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::metric::{is_throughput, select};
use crate::record::BenchmarkMap;
use crate::severity::{classify, Severity};
use crate::thresholds::Thresholds;

/// Note attached when the reference value makes a percentage undefined.
pub const ZERO_REF_NOTE: &str = "ref value is zero (cannot compute pct change)";

/// Outcome of comparing one benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Regression,
    Improvement,
    Unchanged,
    /// Metric could not be resolved or the change is undefined.
    Unknown,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regression => "regression",
            Self::Improvement => "improvement",
            Self::Unchanged => "unchanged",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison of one benchmark name present in both runs.
///
/// `severity` is `None` unless `direction` is `Regression`. An `Unknown`
/// direction means `pct_change` is absent; when the metric could not be
/// resolved both values are NaN (serialized as `null`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub name: String,
    /// Field used for the comparison, e.g. `real_time`.
    pub metric: String,
    pub ref_value: f64,
    pub cur_value: f64,
    /// `(cur - ref) / |ref| * 100`, rounded to 4 decimals.
    pub pct_change: Option<f64>,
    pub direction: Direction,
    pub severity: Severity,
    pub time_unit: Option<String>,
    pub notes: Option<String>,
    /// Unit-less fraction (`+0.5` == `+50%`), rounded to 6 decimals.
    pub relative_change: Option<f64>,
}

impl Comparison {
    pub fn is_regression(&self) -> bool {
        self.direction == Direction::Regression
    }

    pub fn is_improvement(&self) -> bool {
        self.direction == Direction::Improvement
    }

    fn unresolved(name: &str, preferred: Option<&str>, note: String) -> Self {
        Self {
            name: name.to_string(),
            metric: preferred
                .filter(|p| !p.is_empty())
                .unwrap_or("unknown")
                .to_string(),
            ref_value: f64::NAN,
            cur_value: f64::NAN,
            pct_change: None,
            direction: Direction::Unknown,
            severity: Severity::None,
            time_unit: None,
            notes: Some(note),
            relative_change: None,
        }
    }
}

/// Compare every benchmark present in both runs.
///
/// Names are processed in lexicographic order. A name whose metric cannot be
/// resolved on either side yields an `Unknown` comparison instead of failing
/// the batch. The result is sorted regressions first, then by decreasing
/// `|pct_change|` (absent counts as zero); ties keep name order.
pub fn compare(
    reference: &BenchmarkMap,
    current: &BenchmarkMap,
    preferred_metric: Option<&str>,
    thresholds: &Thresholds,
) -> Vec<Comparison> {
    let mut out: Vec<Comparison> = reference
        .iter()
        .filter_map(|(name, ref_record)| {
            current
                .get(name)
                .map(|cur_record| (name, ref_record, cur_record))
        })
        .map(|(name, ref_record, cur_record)| {
            let samples = select(ref_record, preferred_metric)
                .and_then(|r| select(cur_record, preferred_metric).map(|c| (r, c)));
            let (ref_sample, cur_sample) = match samples {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(benchmark = %name, error = %e, "metric resolution failed");
                    return Comparison::unresolved(
                        name,
                        preferred_metric,
                        format!("metric error: {e}"),
                    );
                }
            };

            if ref_sample.field != cur_sample.field {
                debug!(
                    benchmark = %name,
                    reference = %ref_sample.field,
                    current = %cur_sample.field,
                    "metric field differs between runs; using reference field"
                );
            }

            let (pct, notes) = if ref_sample.value == 0.0 {
                debug!(benchmark = %name, "reference value is zero");
                (None, Some(ZERO_REF_NOTE.to_string()))
            } else {
                let pct = (cur_sample.value - ref_sample.value) / ref_sample.value.abs() * 100.0;
                (Some(pct), None)
            };

            let (direction, severity) = classify_change(&ref_sample.field, pct, thresholds);

            Comparison {
                name: name.clone(),
                pct_change: pct.map(|p| round_to(p, 4)),
                relative_change: pct.map(|p| round_to(p / 100.0, 6)),
                direction,
                severity,
                time_unit: ref_sample.unit.or(cur_sample.unit),
                notes,
                metric: ref_sample.field,
                ref_value: ref_sample.value,
                cur_value: cur_sample.value,
            }
        })
        .collect();

    // Stable: equal keys keep the lexicographic order from above.
    out.sort_by(ranking);
    debug!(count = out.len(), "compared benchmarks");
    out
}

/// Direction and severity of a signed percent change for `metric`.
fn classify_change(metric: &str, pct: Option<f64>, thresholds: &Thresholds) -> (Direction, Severity) {
    let Some(pct) = pct else {
        return (Direction::Unknown, Severity::None);
    };
    let signed_pct = if is_throughput(metric) { -pct } else { pct };
    if signed_pct > thresholds.minor_pct {
        (Direction::Regression, classify(signed_pct, thresholds))
    } else if signed_pct < -thresholds.minor_pct {
        (Direction::Improvement, Severity::None)
    } else {
        (Direction::Unchanged, Severity::None)
    }
}

/// Sort order of the comparison list.
///
/// 1. regressions before everything else
/// 2. larger `|pct_change|` first (absent counts as 0)
fn ranking(a: &Comparison, b: &Comparison) -> Ordering {
    b.is_regression()
        .cmp(&a.is_regression())
        .then_with(|| sort_magnitude(b).total_cmp(&sort_magnitude(a)))
}

fn sort_magnitude(c: &Comparison) -> f64 {
    c.pct_change.map_or(0.0, f64::abs)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Positive magnitude of a regression percentage (0 if not a regression or NA).
pub fn regression_magnitude_pct(c: &Comparison) -> f64 {
    match c.pct_change {
        Some(pct) if c.is_regression() => {
            if is_throughput(&c.metric) {
                (-pct).max(0.0)
            } else {
                pct.max(0.0)
            }
        }
        _ => 0.0,
    }
}

/// Positive magnitude of an improvement percentage (0 if not an improvement or NA).
pub fn improvement_magnitude_pct(c: &Comparison) -> f64 {
    match c.pct_change {
        Some(pct) if c.is_improvement() => {
            if is_throughput(&c.metric) {
                pct.max(0.0)
            } else {
                (-pct).max(0.0)
            }
        }
        _ => 0.0,
    }
}

/// Worst regressions first. `limit = None` keeps all of them.
pub fn top_regressions(comparisons: &[Comparison], limit: Option<usize>) -> Vec<&Comparison> {
    let mut regs: Vec<&Comparison> = comparisons.iter().filter(|c| c.is_regression()).collect();
    regs.sort_by(|a, b| regression_magnitude_pct(b).total_cmp(&regression_magnitude_pct(a)));
    if let Some(n) = limit {
        regs.truncate(n);
    }
    regs
}

/// The `limit` best improvements, listed by ascending relative change.
pub fn top_improvements(comparisons: &[Comparison], limit: Option<usize>) -> Vec<&Comparison> {
    let mut imps: Vec<&Comparison> = comparisons.iter().filter(|c| c.is_improvement()).collect();
    imps.sort_by(|a, b| improvement_magnitude_pct(b).total_cmp(&improvement_magnitude_pct(a)));
    if let Some(n) = limit {
        imps.truncate(n);
    }
    imps.sort_by(|a, b| {
        a.relative_change
            .unwrap_or(0.0)
            .total_cmp(&b.relative_change.unwrap_or(0.0))
    });
    imps
}

/// Counts per direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonSummary {
    pub total: usize,
    pub regressions: usize,
    pub improvements: usize,
    pub unchanged: usize,
    pub unknown: usize,
}

impl ComparisonSummary {
    pub fn from_comparisons(comparisons: &[Comparison]) -> Self {
        comparisons.iter().fold(
            Self {
                total: comparisons.len(),
                ..Self::default()
            },
            |mut acc, c| {
                match c.direction {
                    Direction::Regression => acc.regressions += 1,
                    Direction::Improvement => acc.improvements += 1,
                    Direction::Unchanged => acc.unchanged += 1,
                    Direction::Unknown => acc.unknown += 1,
                }
                acc
            },
        )
    }
}
