//! Markdown and JSON report generation.
//!
//! This module renders a [`Dashboard`] as a Markdown document with text
//! bar charts, or as pretty-printed JSON.

use super::ReportOptions;
use crate::models::{BandCount, Dashboard, DashboardMetadata, EmployeeRecord, SkippedRow, Summary};
use anyhow::Result;

/// Width of a full (100%) text bar, in characters.
const BAR_WIDTH: usize = 20;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(dashboard: &Dashboard, options: &ReportOptions) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!("# {}\n\n", options.title));

    output.push_str(&generate_metadata_section(&dashboard.metadata, options));
    output.push_str(&generate_summary_section(&dashboard.summary));
    output.push_str(&generate_table_section(dashboard, options));
    output.push_str(&generate_leaderboard_section(dashboard, options));
    output.push_str(&generate_distribution_section(&dashboard.distribution, options));
    output.push_str(&generate_skipped_section(&dashboard.skipped));

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Make text safe for a Markdown table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Render a percentage as a fixed-width text bar. Values above 100 fill the bar.
fn text_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &DashboardMetadata, options: &ReportOptions) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!("- **Sheet:** {}\n", metadata.sheet));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Employee Filter:** {}\n", metadata.employee_filter));
    section.push_str(&format!(
        "- **Rating Filter:** {}\n",
        metadata.rating_filter.label(options.locale)
    ));
    section.push('\n');

    section
}

/// Generate the headline metrics.
fn generate_summary_section(summary: &Summary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Employees | Mean KPI % | Excellent Share |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} |\n\n",
        summary.employee_count,
        summary.mean_display(),
        summary.excellent_share_display()
    ));

    section
}

/// Generate the employee table with every column.
fn generate_table_section(dashboard: &Dashboard, options: &ReportOptions) -> String {
    let mut section = String::new();

    section.push_str("## Employees\n\n");

    if dashboard.table.is_empty() {
        section.push_str("No employees to show.\n\n");
        return section;
    }

    let mut headers = vec![
        "Full Name".to_string(),
        "Role".to_string(),
        "Raw Score".to_string(),
        "KPI %".to_string(),
        "Rating".to_string(),
    ];
    headers.extend(dashboard.extra_columns.iter().map(|h| escape_cell(h)));

    section.push_str(&format!("| {} |\n", headers.join(" | ")));
    section.push_str(&format!("|{}\n", ":---|".repeat(headers.len())));

    for record in &dashboard.table {
        section.push_str(&generate_table_row(record, options));
    }
    section.push('\n');

    section
}

fn generate_table_row(record: &EmployeeRecord, options: &ReportOptions) -> String {
    let mut cells = vec![
        escape_cell(&record.full_name),
        escape_cell(&record.role),
        record.raw_score.to_string(),
        format!("{:.2}", record.percent_score),
        format!(
            "{} {}",
            record.rating.emoji(),
            record.rating.label(options.locale)
        ),
    ];
    cells.extend(record.extra.iter().map(|value| escape_cell(value)));

    format!("| {} |\n", cells.join(" | "))
}

/// Generate the ranked bar view.
fn generate_leaderboard_section(dashboard: &Dashboard, options: &ReportOptions) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Top {} by KPI\n\n", dashboard.metadata.top_n));
    section.push_str(&format!(
        "*Rating filter: {}*\n\n",
        dashboard.metadata.rating_filter.label(options.locale)
    ));

    if dashboard.leaderboard.is_empty() {
        section.push_str("No employees match this rating.\n\n");
        return section;
    }

    section.push_str("| # | Employee | KPI % | Rating | Chart |\n");
    section.push_str("|:---:|:---|:---:|:---|:---|\n");

    for (i, record) in dashboard.leaderboard.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {:.2} | {} {} | `{}` |\n",
            i + 1,
            escape_cell(&record.full_name),
            record.percent_score,
            record.rating.emoji(),
            record.rating.label(options.locale),
            text_bar(record.percent_score)
        ));
    }
    section.push('\n');

    section
}

/// Generate the rating distribution breakdown.
fn generate_distribution_section(distribution: &[BandCount], options: &ReportOptions) -> String {
    let mut section = String::new();

    section.push_str("## Rating Distribution\n\n");

    if distribution.is_empty() {
        section.push_str("No employees to classify.\n\n");
        return section;
    }

    section.push_str("| Rating | Employees | Share | Chart |\n");
    section.push_str("|:---|:---:|:---:|:---|\n");

    for band in distribution {
        section.push_str(&format!(
            "| {} {} | {} | {:.1}% | `{}` |\n",
            band.rating.emoji(),
            band.rating.label(options.locale),
            band.count,
            band.share * 100.0,
            text_bar(band.share * 100.0)
        ));
    }
    section.push('\n');

    section
}

/// Generate the skipped rows list, if any rows were dropped.
fn generate_skipped_section(skipped: &[SkippedRow]) -> String {
    if skipped.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Skipped Rows\n\n");
    section.push_str("| Row | Reason |\n");
    section.push_str("|:---:|:---|\n");

    for row in skipped {
        section.push_str(&format!("| {} | {} |\n", row.row, escape_cell(&row.reason)));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    format!(
        "---\n\n*Report generated by kpidash v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Generate a JSON report.
pub fn generate_json_report(dashboard: &Dashboard) -> Result<String> {
    serde_json::to_string_pretty(dashboard).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Locale, Rating, RatingFilter};
    use chrono::Utc;

    fn create_test_record(name: &str, percent: f64) -> EmployeeRecord {
        EmployeeRecord {
            row: 2,
            full_name: name.to_string(),
            role: "Auditor".to_string(),
            raw_score: percent / 100.0,
            percent_score: percent,
            rating: Rating::from_percent(percent),
            extra: vec!["Tashkent".to_string()],
        }
    }

    fn create_test_dashboard() -> Dashboard {
        let ann = create_test_record("Ann", 90.0);
        let bob = create_test_record("Bob | Jr", 60.0);

        Dashboard {
            metadata: DashboardMetadata {
                source: "kpi.xlsx".to_string(),
                sheet: "Sheet1".to_string(),
                generated_at: Utc::now(),
                employee_filter: "all".to_string(),
                rating_filter: RatingFilter::All,
                top_n: 10,
            },
            extra_columns: vec!["Region".to_string()],
            table: vec![ann.clone(), bob.clone()],
            leaderboard: vec![ann, bob],
            distribution: vec![
                BandCount {
                    rating: Rating::Excellent,
                    count: 1,
                    share: 0.5,
                },
                BandCount {
                    rating: Rating::Satisfactory,
                    count: 1,
                    share: 0.5,
                },
            ],
            summary: Summary {
                employee_count: 2,
                mean_percent: 75.0,
                excellent_share: 50.0,
            },
            skipped: vec![SkippedRow {
                row: 9,
                reason: "score 'x' is not a number".to_string(),
            }],
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = generate_markdown_report(&create_test_dashboard(), &ReportOptions::default());

        assert!(report.starts_with("# KPI Dashboard"));
        assert!(report.contains("## Summary"));
        assert!(report.contains("| 2 | 75.00% | 50.0% |"));
        assert!(report.contains("## Employees"));
        assert!(report.contains("| Region |"));
        assert!(report.contains("## Top 10 by KPI"));
        assert!(report.contains("## Rating Distribution"));
        assert!(report.contains("## Skipped Rows"));
    }

    #[test]
    fn test_pipes_are_escaped() {
        let report = generate_markdown_report(&create_test_dashboard(), &ReportOptions::default());
        assert!(report.contains("Bob \\| Jr"));
    }

    #[test]
    fn test_leaderboard_rows_carry_color_and_score() {
        let report = generate_markdown_report(&create_test_dashboard(), &ReportOptions::default());
        assert!(report.contains("| 1 | Ann | 90.00 | 🔵 Excellent |"));
        assert!(report.contains("| 2 | Bob \\| Jr | 60.00 | 🟡 Satisfactory |"));
    }

    #[test]
    fn test_uzbek_labels() {
        let options = ReportOptions {
            locale: Locale::Uz,
            ..ReportOptions::default()
        };
        let report = generate_markdown_report(&create_test_dashboard(), &options);
        assert!(report.contains("A’lo"));
        assert!(report.contains("Qoniqarli"));
    }

    #[test]
    fn test_rating_filter_uses_report_locale() {
        let mut dashboard = create_test_dashboard();
        dashboard.metadata.rating_filter = RatingFilter::Band(Rating::Good);
        let options = ReportOptions {
            locale: Locale::Uz,
            ..ReportOptions::default()
        };

        let report = generate_markdown_report(&dashboard, &options);

        assert!(report.contains("- **Rating Filter:** Yaxshi"));
        assert!(report.contains("*Rating filter: Yaxshi*"));
        assert!(!report.contains("Good"));
    }

    #[test]
    fn test_empty_sections() {
        let mut dashboard = create_test_dashboard();
        dashboard.table.clear();
        dashboard.leaderboard.clear();
        dashboard.distribution.clear();
        dashboard.skipped.clear();

        let report = generate_markdown_report(&dashboard, &ReportOptions::default());
        assert!(report.contains("No employees to show."));
        assert!(report.contains("No employees match this rating."));
        assert!(!report.contains("## Skipped Rows"));
    }

    #[test]
    fn test_text_bar() {
        assert_eq!(text_bar(0.0), "░".repeat(BAR_WIDTH));
        assert_eq!(text_bar(100.0), "█".repeat(BAR_WIDTH));
        assert_eq!(text_bar(150.0), "█".repeat(BAR_WIDTH));
        assert_eq!(text_bar(50.0).chars().filter(|c| *c == '█').count(), 10);
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_dashboard()).unwrap();

        assert!(json.contains("\"leaderboard\""));
        assert!(json.contains("\"percent_score\": 90.0"));
        assert!(json.contains("\"rating\": \"excellent\""));
        assert!(json.contains("\"excellent_share\": 50.0"));
    }
}
