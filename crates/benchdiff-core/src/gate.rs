//! CI gate: decide pass/fail from a list of comparisons.

use serde::Serialize;
use tracing::{debug, info};

use crate::compare::{regression_magnitude_pct, Comparison};
use crate::severity::Severity;

/// Gate policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatePolicy {
    /// Any regression at or above this severity fails the gate.
    pub fail_on_severity: Severity,
    /// Fail when the worst regression magnitude (percent) reaches this ceiling.
    pub max_top_regression_pct: Option<f64>,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            fail_on_severity: Severity::Major,
            max_top_regression_pct: None,
        }
    }
}

impl GatePolicy {
    /// Build a policy from a severity name; unrecognized names mean `major`.
    pub fn from_names(fail_on_severity: &str, max_top_regression_pct: Option<f64>) -> Self {
        Self {
            fail_on_severity: Severity::from_name_or_major(fail_on_severity),
            max_top_regression_pct,
        }
    }
}

/// Machine-readable gate outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateVerdict {
    pub failed: bool,
    pub reasons: Vec<String>,
    /// Regression with the largest magnitude; on ties the last one scanned.
    pub worst_regression: Option<Comparison>,
}

/// Evaluate the gate. Never fails; empty input passes.
///
/// Every regression is scanned regardless of input order.
pub fn evaluate(comparisons: &[Comparison], policy: &GatePolicy) -> GateVerdict {
    let threshold_rank = policy.fail_on_severity.rank();

    let mut worst: Option<&Comparison> = None;
    let mut worst_mag = 0.0_f64;
    let mut reasons = Vec::new();

    for c in comparisons.iter().filter(|c| c.is_regression()) {
        let mag = regression_magnitude_pct(c);
        if mag >= worst_mag {
            worst_mag = mag;
            worst = Some(c);
        }
        if c.severity.rank() >= threshold_rank {
            reasons.push(format!(
                "severity>={}: {} ({}) {:+.2}%",
                policy.fail_on_severity,
                c.name,
                c.metric,
                c.pct_change.unwrap_or(f64::NAN)
            ));
        }
    }

    if let Some(ceiling) = policy.max_top_regression_pct {
        if worst_mag >= ceiling {
            reasons.push(match worst {
                Some(w) => format!(
                    "top_regression {} ({}) magnitude {:.2}% >= {:.2}%",
                    w.name, w.metric, worst_mag, ceiling
                ),
                None => format!("top_regression magnitude {worst_mag:.2}% >= {ceiling:.2}%"),
            });
        }
    }

    let failed = !reasons.is_empty();
    if failed {
        info!(breaches = reasons.len(), "regression gate failed");
    } else {
        debug!("regression gate passed");
    }

    GateVerdict {
        failed,
        reasons,
        worst_regression: worst.cloned(),
    }
}
