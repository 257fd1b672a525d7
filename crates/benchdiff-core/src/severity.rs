//! Regression severity levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::thresholds::Thresholds;

/// Severity of a regression. Always `None` for anything that is not a regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    None,
    Minor,
    Moderate,
    Major,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Major => "major",
        }
    }

    /// Gate rank: none=0, minor=1, moderate=2, major=3.
    pub fn rank(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Minor => 1,
            Self::Moderate => 2,
            Self::Major => 3,
        }
    }

    /// Resolve a configured `fail_on_severity` name. Unrecognized names
    /// fall back to `Major`.
    pub fn from_name_or_major(name: &str) -> Self {
        name.parse().unwrap_or(Self::Major)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "minor" => Ok(Self::Minor),
            "moderate" => Ok(Self::Moderate),
            "major" => Ok(Self::Major),
            other => Err(format!(
                "unknown severity '{other}' (expected minor, moderate or major)"
            )),
        }
    }
}

/// Classify a non-negative magnitude percentage.
///
/// Never returns [`Severity::None`]: callers decide when `none` applies.
/// Negative input falls through to `Minor`.
#[must_use]
pub fn classify(magnitude_pct: f64, thresholds: &Thresholds) -> Severity {
    if magnitude_pct >= thresholds.major_pct {
        Severity::Major
    } else if magnitude_pct >= thresholds.moderate_pct {
        Severity::Moderate
    } else {
        Severity::Minor
    }
}
