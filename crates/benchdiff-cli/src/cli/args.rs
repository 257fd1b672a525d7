use benchdiff_core::Severity;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "benchdiff",
    version,
    about = "Compare Google Benchmark JSON outputs and gate performance regressions in CI"
)]
pub struct Cli {
    /// Increase log verbosity on stderr (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare a reference run against a current run
    Compare(CompareArgs),
    Version,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailOn {
    Minor,
    Moderate,
    Major,
}

impl From<FailOn> for Severity {
    fn from(value: FailOn) -> Self {
        match value {
            FailOn::Minor => Severity::Minor,
            FailOn::Moderate => Severity::Moderate,
            FailOn::Major => Severity::Major,
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct CompareArgs {
    /// Reference JSON (baseline)
    #[arg(long = "ref", value_name = "REF_JSON")]
    pub reference: PathBuf,

    /// Current JSON (to compare)
    #[arg(long = "cur", value_name = "CUR_JSON")]
    pub current: PathBuf,

    /// Preferred metric (real_time, cpu_time, bytes_per_second, items_per_second)
    #[arg(long, env = "BENCHDIFF_METRIC")]
    pub metric: Option<String>,

    /// Regex to select benchmark names (same semantics as Google Benchmark --benchmark_filter)
    #[arg(long = "benchmark-filter")]
    pub benchmark_filter: Option<String>,

    /// JSON object overriding thresholds (minor_pct, moderate_pct, major_pct)
    #[arg(long, env = "BENCHDIFF_THRESHOLDS")]
    pub thresholds: Option<String>,

    /// YAML config file (thresholds, gate, metric, filter); flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable CI mode (non-zero exit code on gating failure)
    #[arg(long)]
    pub ci: bool,

    /// Severity threshold that triggers failure [default: major]
    #[arg(long = "ci-fail-on", value_enum, env = "BENCHDIFF_CI_FAIL_ON")]
    pub ci_fail_on: Option<FailOn>,

    /// Fail if the worst regression magnitude reaches this percentage (e.g. 10.0)
    #[arg(long = "ci-max-top-reg-pct", env = "BENCHDIFF_CI_MAX_TOP_REG_PCT")]
    pub ci_max_top_reg_pct: Option<f64>,

    /// Show only the aggregated per-kernel view (no per-entry top lists)
    #[arg(long)]
    pub aggregate_only: bool,

    /// Display an aggregated per-kernel top section at the start of the summary
    #[arg(long)]
    pub aggregate_top: bool,

    /// Disable ANSI colors (or set NO_COLOR)
    #[arg(long)]
    pub no_color: bool,

    /// Number of best improvements to show in Top entries [default: 6]
    #[arg(long = "top-imp")]
    pub top_imp: Option<usize>,

    /// Show all entries, no truncation
    #[arg(long)]
    pub show_all: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}
