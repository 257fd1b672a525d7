//! Optional `benchdiff.yaml` configuration file.
//!
//! ```yaml
//! metric: cpu_time
//! filter: "^BM_Sort"
//! thresholds:
//!   minor_pct: 3.0
//!   major_pct: 15.0
//! gate:
//!   fail_on_severity: moderate
//!   max_top_regression_pct: 20.0
//! ```
//!
//! Every section is optional. Command-line flags take precedence over the
//! file, and the file over built-in defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BenchdiffError, BenchdiffResult};
use crate::gate::GatePolicy;
use crate::thresholds::Thresholds;

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "benchdiff.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchdiffConfig {
    /// Preferred metric field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,

    /// Benchmark name filter (regex, unanchored).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<GateConfig>,
}

/// Gate section. Kept as plain names so unknown severities resolve like the CLI does.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on_severity: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_top_regression_pct: Option<f64>,
}

impl GateConfig {
    pub fn to_policy(&self) -> GatePolicy {
        GatePolicy::from_names(
            self.fail_on_severity.as_deref().unwrap_or("major"),
            self.max_top_regression_pct,
        )
    }
}

impl BenchdiffConfig {
    pub fn from_yaml_str(content: &str) -> BenchdiffResult<Self> {
        // An empty file is a valid, empty config.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| BenchdiffError::config(format!("invalid config: {e}")))
    }

    pub fn from_file(path: impl AsRef<Path>) -> BenchdiffResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| BenchdiffError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Self = serde_yaml::from_str(&content).map_err(|e| BenchdiffError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    /// Thresholds from the file, or defaults.
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds.unwrap_or_default()
    }

    /// Gate policy from the file, or defaults.
    pub fn gate_policy(&self) -> GatePolicy {
        self.gate
            .as_ref()
            .map(GateConfig::to_policy)
            .unwrap_or_default()
    }
}
