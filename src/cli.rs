//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::ScorePolicy;
use crate::models::Locale;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// kpidash - employee KPI dashboard from a spreadsheet
///
/// Reads the first sheet of a KPI workbook, rates every employee
/// (Unsatisfactory / Satisfactory / Good / Excellent) and renders a
/// Markdown, JSON or HTML dashboard.
///
/// Examples:
///   kpidash --input kpi.xlsx
///   kpidash --input kpi.xlsx --rating excellent --format html -o dashboard.html
///   kpidash --input kpi.xlsx --employee "Aliyev Anvar"
///   kpidash --input kpi.xlsx --list-employees
///   kpidash --input kpi.xlsx --watch -o dashboard.html --format html
///   kpidash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Spreadsheet to analyze (xlsx, xlsm, xlsb, xls or ods)
    ///
    /// Only the first sheet is read. Without an input nothing is computed.
    #[arg(short, long, value_name = "FILE", env = "KPIDASH_INPUT")]
    pub input: Option<PathBuf>,

    /// Employee shown in the table view, or "all"
    #[arg(short, long, default_value = "all", value_name = "NAME")]
    pub employee: String,

    /// Rating band shown in the leaderboard, or "all"
    ///
    /// Accepts English or Uzbek labels: unsatisfactory/qoniqarsiz,
    /// satisfactory/qoniqarli, good/yaxshi, excellent/a'lo.
    #[arg(short, long, default_value = "all", value_name = "BAND")]
    pub rating: String,

    /// Output file path for the report (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json, html)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .kpidash.toml in the current directory
    #[arg(short, long, value_name = "FILE", env = "KPIDASH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of employees in the leaderboard
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Language of rating labels in the report
    #[arg(long, value_name = "LOCALE")]
    pub locale: Option<Locale>,

    /// Treatment of non-numeric or out-of-range scores
    #[arg(long, value_name = "POLICY")]
    pub score_policy: Option<ScorePolicy>,

    /// Print the employee names available for --employee and exit
    #[arg(long)]
    pub list_employees: bool,

    /// Re-render the report whenever the input file changes
    #[arg(short, long)]
    pub watch: bool,

    /// Polling interval for --watch, in milliseconds
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .kpidash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// Self-contained HTML page with SVG charts
    Html,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.top == Some(0) {
            return Err("--top must be at least 1".to_string());
        }

        if self.interval_ms == Some(0) {
            return Err("--interval-ms must be at least 1".to_string());
        }

        if self.watch && self.list_employees {
            return Err("Cannot use --watch with --list-employees".to_string());
        }

        if self.watch && self.input.is_none() {
            return Err("--watch requires --input".to_string());
        }

        // A watched file may not exist yet
        if let Some(ref input) = self.input {
            if !self.watch && !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: None,
            employee: "all".to_string(),
            rating: "all".to_string(),
            output: None,
            format: None,
            config: None,
            top: None,
            locale: None,
            score_policy: None,
            list_employees: false,
            watch: false,
            interval_ms: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "kpidash",
            "--input",
            "kpi.xlsx",
            "--rating",
            "excellent",
            "--format",
            "html",
            "--score-policy",
            "clamp",
            "--locale",
            "uz",
            "--top",
            "5",
        ])
        .unwrap();

        assert_eq!(args.input, Some(PathBuf::from("kpi.xlsx")));
        assert_eq!(args.employee, "all");
        assert_eq!(args.rating, "excellent");
        assert_eq!(args.format, Some(OutputFormat::Html));
        assert_eq!(args.score_policy, Some(ScorePolicy::Clamp));
        assert_eq!(args.locale, Some(Locale::Uz));
        assert_eq!(args.top, Some(5));
    }

    #[test]
    fn test_no_input_is_valid() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_missing_input_file() {
        let mut args = make_args();
        args.input = Some(PathBuf::from("/definitely/not/here.xlsx"));
        assert!(args.validate().is_err());

        args.watch = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_top() {
        let mut args = make_args();
        args.top = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_watch_requires_input() {
        let mut args = make_args();
        args.watch = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
