use anyhow::{Context, Result};
use benchdiff_core::{
    aggregate, compare, compile_filter, evaluate, filter_by_name, load_benchmarks,
    BenchdiffConfig, ComparisonSummary, GatePolicy, Thresholds,
};
use tracing::{info, warn};

use crate::cli::args::{CompareArgs, OutputFormat};
use crate::exit_codes::{EXIT_GATE_FAILED, EXIT_SUCCESS};
use crate::report::text::{should_enable_color, TextReportOptions};
use crate::report::{json, text};

pub fn run(args: CompareArgs) -> Result<i32> {
    let config = match &args.config {
        Some(path) => BenchdiffConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => BenchdiffConfig::default(),
    };

    let thresholds = resolve_thresholds(&args, &config)?;
    let policy = resolve_gate_policy(&args, &config);
    let metric = args.metric.clone().or_else(|| config.metric.clone());

    let mut reference = load_benchmarks(&args.reference).context("failed to load reference run")?;
    let mut current = load_benchmarks(&args.current).context("failed to load current run")?;

    if let Some(pattern) = args.benchmark_filter.as_deref().or(config.filter.as_deref()) {
        let filter = compile_filter(pattern)?;
        reference = filter_by_name(reference, &filter);
        current = filter_by_name(current, &filter);
    }

    let comparisons = compare(&reference, &current, metric.as_deref(), &thresholds);
    if comparisons.is_empty() {
        warn!(
            reference = reference.len(),
            current = current.len(),
            "no benchmark names in common between the two runs"
        );
    }
    let aggregates = aggregate(&comparisons, &thresholds);
    let summary = ComparisonSummary::from_comparisons(&comparisons);
    info!(
        total = summary.total,
        regressions = summary.regressions,
        improvements = summary.improvements,
        "comparison complete"
    );

    let verdict = args.ci.then(|| evaluate(&comparisons, &policy));

    match args.format {
        OutputFormat::Json => {
            let report = json::JsonReport::new(
                &thresholds,
                summary,
                &comparisons,
                &aggregates,
                verdict.as_ref(),
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            let opts = TextReportOptions {
                color: should_enable_color(args.no_color),
                aggregate_top: args.aggregate_top,
                aggregate_only: args.aggregate_only,
                top_imp: args.top_imp,
                show_all: args.show_all,
            };
            let rendered =
                text::render(&comparisons, &aggregates, &thresholds, verdict.as_ref(), &opts)?;
            println!("{rendered}");
        }
    }

    match verdict {
        Some(v) if v.failed => {
            eprintln!("CI gating: regression rules failed.");
            Ok(EXIT_GATE_FAILED)
        }
        _ => Ok(EXIT_SUCCESS),
    }
}

/// Defaults < config file < `--thresholds`.
fn resolve_thresholds(args: &CompareArgs, config: &BenchdiffConfig) -> Result<Thresholds> {
    let base = config.thresholds();
    match &args.thresholds {
        Some(overrides) => Ok(base.with_overrides_json(overrides)?),
        None => Ok(base),
    }
}

/// Defaults < config file < `--ci-fail-on` / `--ci-max-top-reg-pct`.
fn resolve_gate_policy(args: &CompareArgs, config: &BenchdiffConfig) -> GatePolicy {
    let mut policy = config.gate_policy();
    if let Some(fail_on) = args.ci_fail_on {
        policy.fail_on_severity = fail_on.into();
    }
    if let Some(pct) = args.ci_max_top_reg_pct {
        policy.max_top_regression_pct = Some(pct);
    }
    policy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::FailOn;
    use benchdiff_core::Severity;
    use std::path::PathBuf;

    fn args() -> CompareArgs {
        CompareArgs {
            reference: PathBuf::from("ref.json"),
            current: PathBuf::from("cur.json"),
            metric: None,
            benchmark_filter: None,
            thresholds: None,
            config: None,
            ci: false,
            ci_fail_on: None,
            ci_max_top_reg_pct: None,
            aggregate_only: false,
            aggregate_top: false,
            no_color: true,
            top_imp: None,
            show_all: false,
            format: OutputFormat::Text,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let config = BenchdiffConfig::from_yaml_str(
            "thresholds:\n  major_pct: 20\ngate:\n  fail_on_severity: minor\n  max_top_regression_pct: 30\n",
        )
        .unwrap();

        let mut a = args();
        assert_eq!(resolve_thresholds(&a, &config).unwrap().major_pct, 20.0);
        assert_eq!(resolve_gate_policy(&a, &config).fail_on_severity, Severity::Minor);

        a.thresholds = Some(r#"{"major_pct": 12}"#.to_string());
        a.ci_fail_on = Some(FailOn::Moderate);
        a.ci_max_top_reg_pct = Some(7.5);
        assert_eq!(resolve_thresholds(&a, &config).unwrap().major_pct, 12.0);
        let policy = resolve_gate_policy(&a, &config);
        assert_eq!(policy.fail_on_severity, Severity::Moderate);
        assert_eq!(policy.max_top_regression_pct, Some(7.5));
    }

    #[test]
    fn test_bad_thresholds_is_error() {
        let mut a = args();
        a.thresholds = Some("{major".to_string());
        assert!(resolve_thresholds(&a, &BenchdiffConfig::default()).is_err());
    }
}
