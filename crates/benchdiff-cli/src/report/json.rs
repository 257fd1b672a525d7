//! `--format json` output.

use benchdiff_core::{AggregateEntry, Comparison, ComparisonSummary, GateVerdict, Thresholds};
use serde::Serialize;

/// Current schema version of the JSON report.
pub const SCHEMA_VERSION: u32 = 1;

/// Machine-readable report.
///
/// `gate` is present only in CI mode. Values that cannot be computed
/// (NaN measurements, absent percentages) are `null`.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub schema_version: u32,
    pub thresholds: &'a Thresholds,
    pub summary: ComparisonSummary,
    pub comparisons: &'a [Comparison],
    pub aggregates: &'a [AggregateEntry],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<&'a GateVerdict>,
}

impl<'a> JsonReport<'a> {
    pub fn new(
        thresholds: &'a Thresholds,
        summary: ComparisonSummary,
        comparisons: &'a [Comparison],
        aggregates: &'a [AggregateEntry],
        gate: Option<&'a GateVerdict>,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            thresholds,
            summary,
            comparisons,
            aggregates,
            gate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchdiff_core::{aggregate, compare, evaluate, extract_benchmarks, GatePolicy};
    use serde_json::json;

    #[test]
    fn test_report_shape() {
        let reference = extract_benchmarks(&json!([
            {"name": "BM_A/1", "real_time": 100.0},
            {"name": "BM_B", "real_time": 0.0}
        ]))
        .unwrap();
        let current = extract_benchmarks(&json!([
            {"name": "BM_A/1", "real_time": 130.0},
            {"name": "BM_B", "real_time": 2.0}
        ]))
        .unwrap();
        let thresholds = Thresholds::default();
        let comparisons = compare(&reference, &current, None, &thresholds);
        let aggregates = aggregate(&comparisons, &thresholds);
        let verdict = evaluate(&comparisons, &GatePolicy::default());

        let report = JsonReport::new(
            &thresholds,
            ComparisonSummary::from_comparisons(&comparisons),
            &comparisons,
            &aggregates,
            Some(&verdict),
        );
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["schema_version"], json!(1));
        assert_eq!(v["summary"]["total"], json!(2));
        assert_eq!(v["summary"]["unknown"], json!(1));
        assert_eq!(v["comparisons"][0]["name"], json!("BM_A/1"));
        assert_eq!(v["comparisons"][1]["pct_change"], json!(null));
        assert_eq!(v["aggregates"][0]["kernel"], json!("BM_A"));
        assert_eq!(v["gate"]["failed"], json!(true));

        let without_gate = JsonReport::new(
            &thresholds,
            ComparisonSummary::from_comparisons(&comparisons),
            &comparisons,
            &aggregates,
            None,
        );
        let v = serde_json::to_value(&without_gate).unwrap();
        assert!(v.get("gate").is_none());
    }
}
