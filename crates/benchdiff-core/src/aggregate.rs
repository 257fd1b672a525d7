//! Per-kernel aggregation of size-parameterized benchmark series.
//!
//! `BM_AddVectors<float>/32`, `BM_AddVectors<float>/1024`, ... share the
//! kernel `BM_AddVectors<float>` and are folded into one [`AggregateEntry`].

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::compare::{round_to, Comparison, Direction};
use crate::severity::{classify, Severity};
use crate::thresholds::Thresholds;

/// One kernel (size-stripped benchmark family).
///
/// Relative changes are fractions (`+0.02` == `+2%`) rounded to 6 decimals.
/// The mean is signed as-is: positive means the measured value grew.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateEntry {
    pub kernel: String,
    /// Comparisons grouped under this kernel.
    pub count: usize,
    pub mean_relative_change: f64,
    pub min_relative_change: f64,
    pub max_relative_change: f64,
    pub aggregated_direction: Direction,
    pub aggregated_severity: Severity,
}

/// Split `name` into its kernel and numeric size suffix.
///
/// Only a purely numeric suffix after the last `/` is stripped; any other
/// name is its own kernel.
pub fn split_kernel_and_size(name: &str) -> (&str, Option<u64>) {
    match name.rsplit_once('/') {
        Some((base, size)) if !size.is_empty() && size.bytes().all(|b| b.is_ascii_digit()) => {
            (base, size.parse().ok())
        }
        _ => (name, None),
    }
}

/// Fold comparisons into per-kernel entries, least favorable mean first.
///
/// Members without a `relative_change` do not contribute to mean/min/max;
/// kernels with no contributing member are dropped.
pub fn aggregate(comparisons: &[Comparison], thresholds: &Thresholds) -> Vec<AggregateEntry> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&Comparison>> = HashMap::new();
    for c in comparisons {
        let (kernel, _) = split_kernel_and_size(&c.name);
        groups
            .entry(kernel)
            .or_insert_with(|| {
                order.push(kernel);
                Vec::new()
            })
            .push(c);
    }

    let mut entries: Vec<AggregateEntry> = order
        .into_iter()
        .filter_map(|kernel| {
            let members = &groups[kernel];
            let entry = reduce(kernel, members, thresholds);
            if entry.is_none() {
                debug!(kernel, members = members.len(), "kernel has no comparable members");
            }
            entry
        })
        .collect();

    entries.sort_by(|a, b| b.mean_relative_change.total_cmp(&a.mean_relative_change));
    entries
}

fn reduce(kernel: &str, members: &[&Comparison], thresholds: &Thresholds) -> Option<AggregateEntry> {
    let rels: Vec<f64> = members.iter().filter_map(|c| c.relative_change).collect();
    if rels.is_empty() {
        return None;
    }

    let mean = rels.iter().sum::<f64>() / rels.len() as f64;
    let min = rels.iter().copied().fold(f64::INFINITY, f64::min);
    let max = rels.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let magnitude_pct = mean.abs() * 100.0;
    let direction = if magnitude_pct < thresholds.minor_pct {
        Direction::Unchanged
    } else if mean > 0.0 {
        Direction::Regression
    } else {
        Direction::Improvement
    };
    let severity = match direction {
        Direction::Regression => classify(magnitude_pct, thresholds),
        _ => Severity::None,
    };

    Some(AggregateEntry {
        kernel: kernel.to_string(),
        count: members.len(),
        mean_relative_change: round_to(mean, 6),
        min_relative_change: round_to(min, 6),
        max_relative_change: round_to(max, 6),
        aggregated_direction: direction,
        aggregated_severity: severity,
    })
}
