//! Metric selection for a single benchmark record.

use serde::Serialize;

use crate::error::{BenchdiffError, BenchdiffResult};
use crate::record::{as_number, BenchmarkRecord};

/// Direct metric fields in fallback priority order: time-like first, then throughput-like.
pub const RECOGNIZED_METRICS: [&str; 4] =
    ["real_time", "cpu_time", "bytes_per_second", "items_per_second"];

/// Metrics where larger is better (a decrease is a regression).
pub const THROUGHPUT_METRICS: [&str; 2] = ["bytes_per_second", "items_per_second"];

/// Sub-fields of the nested primary-metric object, in priority order.
const PRIMARY_SUBFIELDS: [&str; 3] = ["value", "real_time", "cpu_time"];

/// Whether `metric` is throughput-like. Everything else is time-like.
pub fn is_throughput(metric: &str) -> bool {
    THROUGHPUT_METRICS.contains(&metric)
}

/// The measurement chosen to represent a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    /// Field the value was read from, e.g. `real_time`.
    pub field: String,
    pub unit: Option<String>,
    pub value: f64,
}

/// Resolve which field of `record` is "the" measurement.
///
/// Tries `preferred` (when given and present), then [`RECOGNIZED_METRICS`],
/// then the nested primary-metric object. A field that is present but not
/// numeric does not count.
pub fn select(record: &BenchmarkRecord, preferred: Option<&str>) -> BenchdiffResult<MetricSample> {
    let unit = record.time_unit().map(ToString::to_string);

    let direct = preferred
        .filter(|p| !p.is_empty())
        .into_iter()
        .chain(RECOGNIZED_METRICS.iter().copied())
        .find_map(|field| record.number(field).map(|value| (field, value)));
    if let Some((field, value)) = direct {
        return Ok(MetricSample {
            field: field.to_string(),
            unit,
            value,
        });
    }

    if let Some(primary) = record.primary_metric() {
        let nested = PRIMARY_SUBFIELDS
            .iter()
            .find_map(|field| primary.get(*field).and_then(as_number).map(|v| (*field, v)));
        if let Some((field, value)) = nested {
            return Ok(MetricSample {
                field: field.to_string(),
                unit,
                value,
            });
        }
    }

    Err(BenchdiffError::MetricNotFound {
        name: record.name().unwrap_or("<unnamed>").to_string(),
    })
}
