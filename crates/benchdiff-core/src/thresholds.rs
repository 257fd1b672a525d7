//! Severity thresholds shared by the comparator, the aggregator and the report.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{BenchdiffError, BenchdiffResult};

/// Default minor threshold (percent).
pub const DEFAULT_MINOR_PCT: f64 = 2.0;
/// Default moderate threshold (percent).
pub const DEFAULT_MODERATE_PCT: f64 = 5.0;
/// Default major threshold (percent).
pub const DEFAULT_MAJOR_PCT: f64 = 10.0;

/// Three ascending percentages used to classify changes.
///
/// For time-like metrics a percent increase is bad; for throughput-like
/// metrics a percent decrease is bad. The ordering
/// `minor_pct < moderate_pct < major_pct` is expected but not enforced.
/// Each value must be a finite, positive number; numeric strings are
/// accepted in both JSON overrides and YAML.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    #[serde(deserialize_with = "deserialize_pct")]
    pub minor_pct: f64,
    #[serde(deserialize_with = "deserialize_pct")]
    pub moderate_pct: f64,
    #[serde(deserialize_with = "deserialize_pct")]
    pub major_pct: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            minor_pct: DEFAULT_MINOR_PCT,
            moderate_pct: DEFAULT_MODERATE_PCT,
            major_pct: DEFAULT_MAJOR_PCT,
        }
    }
}

impl Thresholds {
    /// Apply a partial JSON object of overrides, e.g. `{"major_pct": 15}`.
    ///
    /// Values may be numbers or numeric strings. Unknown keys are rejected.
    pub fn with_overrides_json(self, overrides: &str) -> BenchdiffResult<Self> {
        let value: serde_json::Value = serde_json::from_str(overrides)
            .map_err(|e| BenchdiffError::config(format!("invalid thresholds JSON: {e}")))?;
        let obj = value.as_object().ok_or_else(|| {
            BenchdiffError::config("invalid thresholds JSON: expected an object")
        })?;

        let mut out = self;
        for (key, raw) in obj {
            let pct = pct_from_value(raw).map_err(|why| {
                BenchdiffError::config(format!("invalid thresholds JSON: '{key}' {why}"))
            })?;
            match key.as_str() {
                "minor_pct" => out.minor_pct = pct,
                "moderate_pct" => out.moderate_pct = pct,
                "major_pct" => out.major_pct = pct,
                other => {
                    return Err(BenchdiffError::config(format!(
                        "invalid thresholds JSON: unknown key '{other}' (expected minor_pct, moderate_pct, major_pct)"
                    )))
                }
            }
        }
        Ok(out)
    }
}

/// A threshold as written in JSON or YAML.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPct {
    Number(f64),
    Text(String),
}

fn pct_from_value(raw: &serde_json::Value) -> Result<f64, String> {
    match raw {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| "is not a number".to_string())
            .and_then(validate_pct),
        serde_json::Value::String(s) => parse_pct(s),
        _ => Err("is not a number".to_string()),
    }
}

fn parse_pct(text: &str) -> Result<f64, String> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| "is not a number".to_string())
        .and_then(validate_pct)
}

fn validate_pct(pct: f64) -> Result<f64, String> {
    if !pct.is_finite() {
        Err(format!("must be finite (got {pct})"))
    } else if pct <= 0.0 {
        Err(format!("must be positive (got {pct})"))
    } else {
        Ok(pct)
    }
}

fn deserialize_pct<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let checked = match RawPct::deserialize(deserializer)? {
        RawPct::Number(n) => validate_pct(n),
        RawPct::Text(s) => parse_pct(&s),
    };
    checked.map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = Thresholds::default();
        assert_eq!(t.minor_pct, 2.0);
        assert_eq!(t.moderate_pct, 5.0);
        assert_eq!(t.major_pct, 10.0);
    }

    #[test]
    fn test_partial_override_keeps_other_values() {
        let t = Thresholds::default()
            .with_overrides_json(r#"{"major_pct": 15, "minor_pct": "1.5"}"#)
            .unwrap();
        assert_eq!(t.minor_pct, 1.5);
        assert_eq!(t.moderate_pct, 5.0);
        assert_eq!(t.major_pct, 15.0);
    }

    #[test]
    fn test_override_rejects_garbage() {
        assert!(Thresholds::default().with_overrides_json("{not json").is_err());
        assert!(Thresholds::default().with_overrides_json("[1, 2]").is_err());
        assert!(Thresholds::default()
            .with_overrides_json(r#"{"major_pct": "big"}"#)
            .is_err());
        let err = Thresholds::default()
            .with_overrides_json(r#"{"huge_pct": 50}"#)
            .unwrap_err();
        assert!(err.to_string().contains("huge_pct"));
    }

    #[test]
    fn test_yaml_section_fills_missing_fields_with_defaults() {
        let t: Thresholds = serde_yaml::from_str("moderate_pct: 7.5\n").unwrap();
        assert_eq!(t.minor_pct, 2.0);
        assert_eq!(t.moderate_pct, 7.5);
        assert_eq!(t.major_pct, 10.0);
    }

    #[test]
    fn test_override_rejects_non_finite_and_non_positive() {
        for overrides in [
            r#"{"minor_pct": "nan"}"#,
            r#"{"minor_pct": "NaN"}"#,
            r#"{"moderate_pct": "inf"}"#,
            r#"{"major_pct": "-inf"}"#,
            r#"{"minor_pct": 0}"#,
            r#"{"major_pct": -5}"#,
            r#"{"major_pct": "-1.5"}"#,
        ] {
            let err = Thresholds::default()
                .with_overrides_json(overrides)
                .unwrap_err();
            assert!(matches!(err, BenchdiffError::Config { .. }), "{overrides}");
        }
        let err = Thresholds::default()
            .with_overrides_json(r#"{"minor_pct": "nan"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("minor_pct"));
        assert!(err.to_string().contains("finite"));
    }

    #[test]
    fn test_yaml_section_accepts_numeric_strings() {
        let t: Thresholds = serde_yaml::from_str("minor_pct: \"3.0\"\nmajor_pct: 20\n").unwrap();
        assert_eq!(t.minor_pct, 3.0);
        assert_eq!(t.moderate_pct, 5.0);
        assert_eq!(t.major_pct, 20.0);
    }

    #[test]
    fn test_yaml_section_rejects_non_finite_and_non_positive() {
        for yaml in [
            "minor_pct: .nan\n",
            "minor_pct: \"nan\"\n",
            "major_pct: .inf\n",
            "major_pct: \"inf\"\n",
            "moderate_pct: 0\n",
            "moderate_pct: -2.5\n",
            "major_pct: big\n",
        ] {
            assert!(serde_yaml::from_str::<Thresholds>(yaml).is_err(), "{yaml}");
        }
    }
}
