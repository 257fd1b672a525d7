//! Benchmark records and extraction from Google Benchmark JSON.
//!
//! Accepted shapes:
//!
//! ```json
//! {"context": {...}, "benchmarks": [{"name": "BM_Sort/64", "real_time": 12.5, "time_unit": "ns"}]}
//! ```
//!
//! or a bare list of the same records.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{BenchdiffError, BenchdiffResult};

/// Field names a record's name may be stored under, in priority order.
const NAME_FIELDS: [&str; 3] = ["name", "benchmark", "bench"];

/// Field names the nested primary-metric object may be stored under.
const PRIMARY_FIELDS: [&str; 2] = ["primary_metric", "primary"];

/// Benchmarks of one run keyed by name. Ordered so iteration is deterministic.
pub type BenchmarkMap = BTreeMap<String, BenchmarkRecord>;

/// One benchmark entry as produced by the benchmark runner.
///
/// The record is kept as the raw JSON object; accessors give typed views of
/// the fields the comparison cares about.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BenchmarkRecord {
    fields: Map<String, Value>,
}

impl BenchmarkRecord {
    /// Wrap a JSON value; `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Record name from `name`, `benchmark` or `bench` (first non-empty string).
    pub fn name(&self) -> Option<&str> {
        NAME_FIELDS
            .iter()
            .filter_map(|key| self.fields.get(*key).and_then(Value::as_str))
            .find(|s| !s.is_empty())
    }

    pub fn time_unit(&self) -> Option<&str> {
        self.fields.get("time_unit").and_then(Value::as_str)
    }

    /// Numeric value of a direct field. Numeric strings are accepted.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(as_number)
    }

    /// Nested primary-metric object (`primary_metric`, then `primary`).
    pub fn primary_metric(&self) -> Option<&Map<String, Value>> {
        PRIMARY_FIELDS
            .iter()
            .filter_map(|key| self.fields.get(*key).and_then(Value::as_object))
            .find(|obj| !obj.is_empty())
    }
}

/// Finite number from a JSON number or numeric string. `"nan"`/`"inf"` do not count.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Build the name → record mapping for one run.
///
/// Records without a name (or that are not objects) are skipped. When a name
/// repeats, the last record wins.
pub fn extract_benchmarks(doc: &Value) -> BenchdiffResult<BenchmarkMap> {
    let list = match doc {
        Value::Object(obj) => obj.get("benchmarks").and_then(Value::as_array),
        Value::Array(arr) => Some(arr),
        _ => None,
    }
    .ok_or(BenchdiffError::MissingBenchmarks)?;

    let mut out = BenchmarkMap::new();
    for (idx, entry) in list.iter().enumerate() {
        let Some(record) = BenchmarkRecord::from_value(entry.clone()) else {
            debug!(index = idx, "skipping non-object benchmark entry");
            continue;
        };
        let Some(name) = record.name().map(ToString::to_string) else {
            debug!(index = idx, "skipping benchmark entry without a name");
            continue;
        };
        out.insert(name, record);
    }
    Ok(out)
}

/// Read a benchmark JSON file and extract its records.
pub fn load_benchmarks(path: impl AsRef<Path>) -> BenchdiffResult<BenchmarkMap> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| BenchdiffError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let doc: Value = serde_json::from_str(&content).map_err(|e| BenchdiffError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let map = extract_benchmarks(&doc)?;
    debug!(path = %path.display(), count = map.len(), "loaded benchmarks");
    Ok(map)
}

/// Compile a benchmark name filter (unanchored search semantics).
pub fn compile_filter(pattern: &str) -> BenchdiffResult<Regex> {
    Regex::new(pattern).map_err(|e| BenchdiffError::InvalidFilter {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Keep only the records whose name matches `filter` anywhere.
pub fn filter_by_name(map: BenchmarkMap, filter: &Regex) -> BenchmarkMap {
    map.into_iter()
        .filter(|(name, _)| filter.is_match(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_extract_from_benchmarks_object() {
        let doc = json!({
            "context": {"host_name": "ci"},
            "benchmarks": [
                {"name": "BM_A/8", "real_time": 1.0},
                {"name": "BM_B", "cpu_time": 2.0}
            ]
        });
        let map = extract_benchmarks(&doc).unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["BM_A/8", "BM_B"]);
    }

    #[test]
    fn test_extract_from_bare_list_with_aliases() {
        let doc = json!([
            {"benchmark": "BM_Alias", "real_time": 1.0},
            {"bench": "BM_Short", "real_time": 1.0},
            {"name": "", "bench": "BM_EmptyName", "real_time": 1.0},
            {"real_time": 3.0},
            "not-an-object"
        ]);
        let map = extract_benchmarks(&doc).unwrap();
        assert_eq!(map.len(), 3);
        assert!(map.contains_key("BM_Alias"));
        assert!(map.contains_key("BM_Short"));
        assert!(map.contains_key("BM_EmptyName"));
    }

    #[test]
    fn test_extract_last_duplicate_wins() {
        let doc = json!([
            {"name": "BM_Dup", "real_time": 1.0},
            {"name": "BM_Dup", "real_time": 2.0}
        ]);
        let map = extract_benchmarks(&doc).unwrap();
        assert_eq!(map["BM_Dup"].number("real_time"), Some(2.0));
    }

    #[test]
    fn test_extract_rejects_missing_list() {
        let err = extract_benchmarks(&json!({"results": []})).unwrap_err();
        assert!(matches!(err, BenchdiffError::MissingBenchmarks));
        let err = extract_benchmarks(&json!({"benchmarks": {"name": "x"}})).unwrap_err();
        assert!(matches!(err, BenchdiffError::MissingBenchmarks));
        assert!(extract_benchmarks(&json!(42)).is_err());
    }

    #[test]
    fn test_number_accepts_numeric_strings_only() {
        let record = BenchmarkRecord::from_value(json!({
            "name": "BM_X",
            "real_time": "12.5",
            "cpu_time": "fast",
            "iterations": 1000
        }))
        .unwrap();
        assert_eq!(record.number("real_time"), Some(12.5));
        assert_eq!(record.number("cpu_time"), None);
        assert_eq!(record.number("iterations"), Some(1000.0));
        assert_eq!(record.number("bytes_per_second"), None);
    }

    #[test]
    fn test_number_rejects_non_finite_strings() {
        let record = BenchmarkRecord::from_value(json!({
            "name": "BM_N/1",
            "real_time": "NaN",
            "cpu_time": "inf",
            "bytes_per_second": "-inf",
            "items_per_second": " nan "
        }))
        .unwrap();
        assert_eq!(record.number("real_time"), None);
        assert_eq!(record.number("cpu_time"), None);
        assert_eq!(record.number("bytes_per_second"), None);
        assert_eq!(record.number("items_per_second"), None);
    }

    #[test]
    fn test_primary_metric_falls_back_to_primary() {
        let record = BenchmarkRecord::from_value(json!({
            "name": "BM_X",
            "primary_metric": {},
            "primary": {"value": 3.0}
        }))
        .unwrap();
        assert_eq!(record.primary_metric().unwrap()["value"], json!(3.0));
    }

    #[test]
    fn test_load_benchmarks_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, r#"{{"benchmarks": [{{"name": "BM_File", "real_time": 5}}]}}"#).unwrap();

        let map = load_benchmarks(&path).unwrap();
        assert_eq!(map["BM_File"].number("real_time"), Some(5.0));
    }

    #[test]
    fn test_load_benchmarks_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = load_benchmarks(&missing).unwrap_err();
        assert!(matches!(err, BenchdiffError::Read { .. }));
        assert!(err.to_string().contains("missing.json"));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ nope").unwrap();
        assert!(matches!(
            load_benchmarks(&bad).unwrap_err(),
            BenchdiffError::Parse { .. }
        ));
    }

    #[test]
    fn test_filter_by_name_is_unanchored() {
        let doc = json!([
            {"name": "BM_Sort/64", "real_time": 1.0},
            {"name": "BM_Hash/64", "real_time": 1.0},
            {"name": "BM_SortStable/8", "real_time": 1.0}
        ]);
        let map = extract_benchmarks(&doc).unwrap();
        let filter = compile_filter("Sort").unwrap();
        let kept = filter_by_name(map, &filter);
        assert_eq!(
            kept.keys().collect::<Vec<_>>(),
            vec!["BM_Sort/64", "BM_SortStable/8"]
        );
    }

    #[test]
    fn test_compile_filter_rejects_bad_regex() {
        let err = compile_filter("BM_(").unwrap_err();
        assert!(matches!(err, BenchdiffError::InvalidFilter { .. }));
    }
}
