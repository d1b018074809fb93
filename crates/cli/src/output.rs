//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use combidoe_common::{coverage_report, CoverageReport, Design, Experiment, Solution};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One bracketed row per line, then the seed
    #[default]
    Plain,
    /// Human-readable table format
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Everything reported about a solved run
#[derive(Debug, Clone, Serialize)]
pub struct SolutionReport {
    pub specification: Vec<u32>,
    pub n_way: usize,
    pub experiments: usize,
    pub run_seed: u64,
    pub attempt: u64,
    pub attempt_seed: u64,
    /// Deduplicated rows
    pub rows: Vec<Experiment>,
    pub coverage: CoverageReport,
}

impl SolutionReport {
    pub fn new(design: &Design, solution: &Solution) -> Self {
        let unique = solution.unique_rows();
        let coverage = coverage_report(design.n_way(), design.depths(), &unique);
        Self {
            specification: design.depths().to_vec(),
            n_way: design.n_way(),
            experiments: design.experiments(),
            run_seed: solution.run_seed,
            attempt: solution.attempt,
            attempt_seed: solution.seed,
            rows: unique.rows().to_vec(),
            coverage,
        }
    }
}

/// Render a solved run in the requested format
pub fn render_solution(report: &SolutionReport, format: OutputFormat) -> anyhow::Result<String> {
    let rendered = match format {
        OutputFormat::Plain => {
            let mut out = String::from("Solution Found:\n");
            for row in &report.rows {
                writeln!(out, "{}", row)?;
            }
            writeln!(out, "Random seed for this solution is {}", report.run_seed)?;
            write!(
                out,
                "Solved on attempt #{} (attempt seed {})",
                report.attempt, report.attempt_seed
            )?;
            out
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            let mut headers = vec!["#".to_string()];
            headers.extend(
                report
                    .specification
                    .iter()
                    .enumerate()
                    .map(|(i, depth)| format!("F{} ({})", i, depth)),
            );
            table.set_header(headers);
            for (i, row) in report.rows.iter().enumerate() {
                let mut cells = vec![(i + 1).to_string()];
                cells.extend(row.values().iter().map(|v| v.to_string()));
                table.add_row(cells);
            }

            format!(
                "{table}\nRun seed: {}  Attempt: #{}  Attempt seed: {}\n\
                 Coverage: {}/{} factor subsets at strength {}",
                report.run_seed,
                report.attempt,
                report.attempt_seed,
                report.coverage.subsets_covered,
                report.coverage.subsets_total,
                report.n_way,
            )
        }
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Yaml => serde_yaml::to_string(report)?,
    };
    Ok(rendered)
}

/// Print a solved run
pub fn print_solution(report: &SolutionReport, format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", render_solution(report, format)?);
    Ok(())
}

/// Print success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}
