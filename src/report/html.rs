//! Self-contained HTML dashboard.
//!
//! Renders the same views as the Markdown report, with the leaderboard as
//! an inline SVG horizontal bar chart and the distribution as an SVG donut.

use super::ReportOptions;
use crate::models::{BandCount, Dashboard, EmployeeRecord, Summary};

const BAR_CHART_WIDTH: f64 = 640.0;
const BAR_LABEL_WIDTH: f64 = 200.0;
const BAR_HEIGHT: f64 = 24.0;
const BAR_GAP: f64 = 8.0;

/// Radius giving a circumference of 100, so dash lengths are percentages.
const DONUT_RADIUS: f64 = 15.915_494_309_189_533;

const STYLE: &str = "body{font-family:sans-serif;margin:2rem;color:#222}\
table{border-collapse:collapse;margin-bottom:1.5rem}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:left}\
th{background:#f4f4f4}\
.metrics{display:flex;gap:2rem;margin-bottom:1.5rem}\
.metric{border:1px solid #ccc;border-radius:6px;padding:0.75rem 1.25rem}\
.metric .value{font-size:1.6rem;font-weight:bold}\
.charts{display:flex;flex-wrap:wrap;gap:2rem}\
.legend span{display:inline-block;width:0.8rem;height:0.8rem;margin-right:0.3rem}";

/// Escape text for HTML element content and attribute values.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Generate a complete HTML page.
pub fn generate_html_report(dashboard: &Dashboard, options: &ReportOptions) -> String {
    let title = escape_html(&options.title);
    let mut page = String::new();

    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    page.push_str(&format!("<title>{}</title>\n", title));
    page.push_str(&format!("<style>{}</style>\n", STYLE));
    page.push_str("</head>\n<body>\n");
    page.push_str(&format!("<h1>{}</h1>\n", title));
    page.push_str(&format!(
        "<p>Source <code>{}</code>, sheet {}, generated {}.</p>\n",
        escape_html(&dashboard.metadata.source),
        escape_html(&dashboard.metadata.sheet),
        dashboard.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    page.push_str(&generate_metrics(&dashboard.summary));
    page.push_str(&generate_table(dashboard, options));

    page.push_str("<div class=\"charts\">\n");
    page.push_str(&format!(
        "<section>\n<h2>Top {} by KPI</h2>\n<p>Rating filter: {}</p>\n",
        dashboard.metadata.top_n,
        escape_html(dashboard.metadata.rating_filter.label(options.locale))
    ));
    page.push_str(&generate_bar_chart(&dashboard.leaderboard));
    page.push_str("</section>\n");
    page.push_str("<section>\n<h2>Rating Distribution</h2>\n");
    page.push_str(&generate_donut_chart(&dashboard.distribution, options));
    page.push_str("</section>\n</div>\n");

    if !dashboard.skipped.is_empty() {
        page.push_str("<h2>Skipped Rows</h2>\n<ul>\n");
        for row in &dashboard.skipped {
            page.push_str(&format!(
                "<li>Row {}: {}</li>\n",
                row.row,
                escape_html(&row.reason)
            ));
        }
        page.push_str("</ul>\n");
    }

    page.push_str("</body>\n</html>\n");
    page
}

fn generate_metrics(summary: &Summary) -> String {
    let metrics = [
        ("Employees", summary.employee_count.to_string()),
        ("Mean KPI %", summary.mean_display()),
        ("Excellent Share", summary.excellent_share_display()),
    ];

    let mut block = String::from("<div class=\"metrics\">\n");
    for (label, value) in metrics {
        block.push_str(&format!(
            "<div class=\"metric\"><div>{}</div><div class=\"value\">{}</div></div>\n",
            label, value
        ));
    }
    block.push_str("</div>\n");
    block
}

fn generate_table(dashboard: &Dashboard, options: &ReportOptions) -> String {
    let mut table = String::from("<h2>Employees</h2>\n");

    if dashboard.table.is_empty() {
        table.push_str("<p>No employees to show.</p>\n");
        return table;
    }

    table.push_str("<table>\n<tr><th>Full Name</th><th>Role</th><th>Raw Score</th><th>KPI %</th><th>Rating</th>");
    for header in &dashboard.extra_columns {
        table.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    table.push_str("</tr>\n");

    for record in &dashboard.table {
        table.push_str(&generate_table_row(record, options));
    }
    table.push_str("</table>\n");
    table
}

fn generate_table_row(record: &EmployeeRecord, options: &ReportOptions) -> String {
    let mut row = format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td style=\"color:{}\">{}</td>",
        escape_html(&record.full_name),
        escape_html(&record.role),
        record.raw_score,
        record.percent_score,
        record.rating.color(),
        escape_html(record.rating.label(options.locale))
    );
    for value in &record.extra {
        row.push_str(&format!("<td>{}</td>", escape_html(value)));
    }
    row.push_str("</tr>\n");
    row
}

/// Horizontal bars, one per ranked employee, annotated with the KPI %.
fn generate_bar_chart(records: &[EmployeeRecord]) -> String {
    if records.is_empty() {
        return "<p>No employees match this rating.</p>\n".to_string();
    }

    // Scale to at least 100% so bars are comparable across passes.
    let max = records
        .iter()
        .map(|r| r.percent_score)
        .fold(100.0_f64, f64::max);
    let plot_width = BAR_CHART_WIDTH - BAR_LABEL_WIDTH - 60.0;
    let height = records.len() as f64 * (BAR_HEIGHT + BAR_GAP) + BAR_GAP;

    let mut svg = format!(
        "<svg width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" role=\"img\">\n",
        w = BAR_CHART_WIDTH,
        h = height
    );

    for (i, record) in records.iter().enumerate() {
        let y = BAR_GAP + i as f64 * (BAR_HEIGHT + BAR_GAP);
        let width = (record.percent_score.max(0.0) / max) * plot_width;
        let text_y = y + BAR_HEIGHT / 2.0 + 4.0;

        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"12\">{}</text>\n",
            BAR_LABEL_WIDTH - 6.0,
            text_y,
            escape_html(&record.full_name)
        ));
        svg.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\" stroke=\"#555\" stroke-width=\"0.5\"/>\n",
            BAR_LABEL_WIDTH,
            y,
            width,
            BAR_HEIGHT,
            record.rating.color()
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\">{:.2}</text>\n",
            BAR_LABEL_WIDTH + width + 4.0,
            text_y,
            record.percent_score
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Donut of the rating distribution, one arc per non-empty band.
fn generate_donut_chart(distribution: &[BandCount], options: &ReportOptions) -> String {
    if distribution.is_empty() {
        return "<p>No employees to classify.</p>\n".to_string();
    }

    let mut svg = String::from("<svg width=\"240\" height=\"240\" viewBox=\"0 0 42 42\" role=\"img\">\n");
    // Arcs start at 12 o'clock.
    let mut offset = 25.0;

    for band in distribution {
        let length = band.share * 100.0;
        svg.push_str(&format!(
            "<circle cx=\"21\" cy=\"21\" r=\"{:.4}\" fill=\"transparent\" stroke=\"{}\" stroke-width=\"6\" stroke-dasharray=\"{:.3} {:.3}\" stroke-dashoffset=\"{:.3}\"/>\n",
            DONUT_RADIUS,
            band.rating.color(),
            length,
            100.0 - length,
            offset
        ));
        offset -= length;
    }
    svg.push_str("</svg>\n");

    svg.push_str("<div class=\"legend\">\n");
    for band in distribution {
        svg.push_str(&format!(
            "<div><span style=\"background:{}\"></span>{}: {} ({:.1}%)</div>\n",
            band.rating.color(),
            escape_html(band.rating.label(options.locale)),
            band.count,
            band.share * 100.0
        ));
    }
    svg.push_str("</div>\n");

    svg
}
