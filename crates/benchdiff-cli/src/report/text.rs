//! Terminal report.
//!
//! Every row is built as a string first and the whole report is returned as
//! one block, so tests can assert on the layout without a terminal.

use benchdiff_core::{
    classify, is_throughput, top_improvements, top_regressions, AggregateEntry, Comparison,
    ComparisonSummary, Direction, GateVerdict, Severity, Thresholds,
};
use console::{pad_str, Alignment, Style, Term};

pub const NAME_COL_WIDTH: usize = 48;
pub const METRIC_COL_WIDTH: usize = 16;
pub const KERNEL_COL_WIDTH: usize = 48;
pub const DIR_COL_WIDTH: usize = 12;
pub const NUM_COL_WIDTH: usize = 8;

pub const TOP_REG_COUNT: usize = 6;
pub const TOP_IMP_COUNT: usize = 6;
pub const AGGREGATE_TOP_ROWS: usize = 10;
pub const AGGREGATE_FULL_ROWS: usize = 30;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextReportOptions {
    pub color: bool,
    pub aggregate_top: bool,
    pub aggregate_only: bool,
    /// Improvements shown in "Top entries"; `None` means [`TOP_IMP_COUNT`].
    pub top_imp: Option<usize>,
    pub show_all: bool,
}

/// Colors are off with `--no-color`, when `NO_COLOR` is set, or when stdout is not a terminal.
pub fn should_enable_color(no_color_flag: bool) -> bool {
    if no_color_flag || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    Term::stdout().is_term()
}

/// Render the full text report.
pub fn render(
    comparisons: &[Comparison],
    aggregates: &[AggregateEntry],
    thresholds: &Thresholds,
    verdict: Option<&GateVerdict>,
    opts: &TextReportOptions,
) -> serde_json::Result<String> {
    let palette = Palette::new(opts.color);
    let mut lines = Vec::new();

    quick_summary(&mut lines, &palette, &ComparisonSummary::from_comparisons(comparisons));

    if opts.aggregate_only {
        aggregated_table(
            &mut lines,
            &palette,
            thresholds,
            "Aggregated per-kernel view (mean/min/max relative change)",
            aggregates,
            AGGREGATE_FULL_ROWS,
        );
    } else {
        if opts.aggregate_top {
            aggregated_table(
                &mut lines,
                &palette,
                thresholds,
                "Aggregated per-kernel (top by mean rel change)",
                aggregates,
                AGGREGATE_TOP_ROWS,
            );
        }
        top_entries(&mut lines, &palette, thresholds, comparisons, opts);
        aggregated_table(
            &mut lines,
            &palette,
            thresholds,
            "Aggregated per-kernel view (mean/min/max relative change)",
            aggregates,
            AGGREGATE_FULL_ROWS,
        );
        unresolved(&mut lines, &palette, comparisons);
    }

    if let Some(v) = verdict {
        section(&mut lines, &palette, "CI Gate");
        lines.push(serde_json::to_string_pretty(v)?);
    }

    Ok(lines.join("\n"))
}

fn section(lines: &mut Vec<String>, palette: &Palette, title: &str) {
    lines.push(String::new());
    lines.push(palette.header.apply_to(title).to_string());
    lines.push("-".repeat(title.len()));
}

fn quick_summary(lines: &mut Vec<String>, palette: &Palette, summary: &ComparisonSummary) {
    section(lines, palette, "Quick Summary");

    let label_width = "Total compared".len();
    let value_width = 8;
    let rule = "-".repeat(label_width + 3 + value_width);

    let count = |n: usize, style: &Style| {
        if n > 0 {
            style.apply_to(n).to_string()
        } else {
            palette.bold.apply_to(0).to_string()
        }
    };
    let rows = [
        ("Total compared", palette.bold.apply_to(summary.total).to_string()),
        ("Regressions", count(summary.regressions, &palette.count_regressions)),
        ("Improvements", count(summary.improvements, &palette.count_improvements)),
    ];

    lines.push(rule.clone());
    for (label, value) in rows {
        lines.push(format!(
            "{} | {}",
            pad_str(label, label_width, Alignment::Left, None),
            pad_str(&value, value_width, Alignment::Right, None)
        ));
    }
    lines.push(rule);
}

fn aggregated_table(
    lines: &mut Vec<String>,
    palette: &Palette,
    thresholds: &Thresholds,
    title: &str,
    aggregates: &[AggregateEntry],
    rows: usize,
) {
    section(lines, palette, title);
    let header = format!(
        "{:<kw$} | {:>3} | {:>nw$} | {:>nw$} | {:>nw$} | {:>dw$} | {:>nw$}",
        "kernel",
        "n",
        "mean",
        "min",
        "max",
        "direction",
        "severity",
        kw = KERNEL_COL_WIDTH,
        nw = NUM_COL_WIDTH,
        dw = DIR_COL_WIDTH,
    );
    lines.push(header.clone());
    lines.push("-".repeat(header.len()));

    for a in aggregates.iter().take(rows) {
        let mean = palette.rel_change(Some(a.mean_relative_change), false, thresholds);
        let (min, max) = if a.count > 1 {
            (
                palette.rel_change(Some(a.min_relative_change), false, thresholds),
                palette.rel_change(Some(a.max_relative_change), false, thresholds),
            )
        } else {
            let na = palette.neutral.apply_to("NA").to_string();
            (na.clone(), na)
        };

        let label_severity = match a.aggregated_direction {
            Direction::Regression => a.aggregated_severity,
            Direction::Improvement => {
                display_severity(a.mean_relative_change.abs() * 100.0, thresholds)
            }
            _ => Severity::None,
        };

        lines.push(format!(
            "{} | {:>3} | {} | {} | {} | {} | {}",
            pad_str(&a.kernel, KERNEL_COL_WIDTH, Alignment::Left, Some("...")),
            a.count,
            cell(&mean, NUM_COL_WIDTH),
            cell(&min, NUM_COL_WIDTH),
            cell(&max, NUM_COL_WIDTH),
            cell(&palette.direction(a.aggregated_direction, label_severity), DIR_COL_WIDTH),
            cell(
                &palette.severity_label(a.aggregated_severity, a.aggregated_direction),
                NUM_COL_WIDTH
            ),
        ));
    }
}

fn top_entries(
    lines: &mut Vec<String>,
    palette: &Palette,
    thresholds: &Thresholds,
    comparisons: &[Comparison],
    opts: &TextReportOptions,
) {
    section(lines, palette, "Top entries");
    let header = format!(
        "{:<nw$} | {:<mw$} | {:>cw$} | {:>dw$} | {:>cw$}",
        "name",
        "metric",
        "rel_chg",
        "direction",
        "severity",
        nw = NAME_COL_WIDTH,
        mw = METRIC_COL_WIDTH,
        cw = NUM_COL_WIDTH,
        dw = DIR_COL_WIDTH,
    );
    lines.push(header.clone());
    lines.push("-".repeat(header.len()));

    let (reg_limit, imp_limit) = if opts.show_all {
        (None, None)
    } else {
        (Some(TOP_REG_COUNT), Some(opts.top_imp.unwrap_or(TOP_IMP_COUNT)))
    };

    for c in top_regressions(comparisons, reg_limit) {
        lines.push(entry_row(palette, thresholds, c));
    }
    lines.push("-".repeat(header.len()));
    for c in top_improvements(comparisons, imp_limit) {
        lines.push(entry_row(palette, thresholds, c));
    }
}

fn entry_row(palette: &Palette, thresholds: &Thresholds, c: &Comparison) -> String {
    let magnitude = c.relative_change.map_or(0.0, |r| r.abs() * 100.0);
    format!(
        "{} | {} | {} | {} | {}",
        pad_str(&c.name, NAME_COL_WIDTH, Alignment::Left, Some("...")),
        pad_str(&c.metric, METRIC_COL_WIDTH, Alignment::Left, Some("...")),
        cell(
            &palette.rel_change(c.relative_change, is_throughput(&c.metric), thresholds),
            NUM_COL_WIDTH
        ),
        cell(
            &palette.direction(c.direction, display_severity(magnitude, thresholds)),
            DIR_COL_WIDTH
        ),
        cell(&palette.severity_label(c.severity, c.direction), NUM_COL_WIDTH),
    )
}

fn unresolved(lines: &mut Vec<String>, palette: &Palette, comparisons: &[Comparison]) {
    let unknown: Vec<&Comparison> = comparisons
        .iter()
        .filter(|c| c.direction == Direction::Unknown)
        .collect();
    if unknown.is_empty() {
        return;
    }
    section(lines, palette, "Unresolved");
    for c in unknown {
        lines.push(format!(
            "{} | {}",
            pad_str(&c.name, NAME_COL_WIDTH, Alignment::Left, Some("...")),
            palette
                .neutral
                .apply_to(c.notes.as_deref().unwrap_or("unknown"))
        ));
    }
}

/// Severity used only to pick a color; sub-threshold changes read as minor.
fn display_severity(magnitude_pct: f64, thresholds: &Thresholds) -> Severity {
    if magnitude_pct >= thresholds.minor_pct {
        classify(magnitude_pct, thresholds)
    } else {
        Severity::Minor
    }
}

fn cell(text: &str, width: usize) -> String {
    pad_str(text, width, Alignment::Right, None).into_owned()
}

struct Palette {
    header: Style,
    bold: Style,
    count_regressions: Style,
    count_improvements: Style,
    neutral: Style,
    sub_threshold: Style,
    regression: [Style; 3],
    improvement: [Style; 3],
}

impl Palette {
    fn new(enabled: bool) -> Self {
        let base = Style::new().force_styling(enabled);
        Self {
            header: base.clone().magenta().bold(),
            bold: base.clone().bold(),
            count_regressions: base.clone().red().bold(),
            count_improvements: base.clone().green().bold(),
            neutral: base.clone().black().bright(),
            sub_threshold: base.clone().cyan(),
            regression: [
                base.clone().yellow(),
                base.clone().red(),
                base.clone().red().bright().bold(),
            ],
            improvement: [
                base.clone().green(),
                base.clone().green().bright(),
                base.green().bright().bold(),
            ],
        }
    }

    fn by_severity(&self, direction: Direction, severity: Severity) -> &Style {
        let idx = match severity {
            Severity::None => return &self.neutral,
            Severity::Minor => 0,
            Severity::Moderate => 1,
            Severity::Major => 2,
        };
        match direction {
            Direction::Regression => &self.regression[idx],
            Direction::Improvement => &self.improvement[idx],
            _ => &self.neutral,
        }
    }

    /// `+12.34%` style cell. Throughput changes are colored with flipped polarity.
    fn rel_change(&self, value: Option<f64>, throughput: bool, thresholds: &Thresholds) -> String {
        let Some(value) = value else {
            return "NA".to_string();
        };
        let text = format!("{:+.2}%", value * 100.0);
        let magnitude = value.abs() * 100.0;
        if magnitude < thresholds.minor_pct || value == 0.0 {
            return self.sub_threshold.apply_to(text).to_string();
        }
        let worse = (value > 0.0) != throughput;
        let direction = if worse {
            Direction::Regression
        } else {
            Direction::Improvement
        };
        self.by_severity(direction, classify(magnitude, thresholds))
            .apply_to(text)
            .to_string()
    }

    fn direction(&self, direction: Direction, severity: Severity) -> String {
        self.by_severity(direction, severity)
            .apply_to(direction.as_str())
            .to_string()
    }

    fn severity_label(&self, severity: Severity, direction: Direction) -> String {
        self.by_severity(direction, severity)
            .apply_to(severity.as_str())
            .to_string()
    }
}
