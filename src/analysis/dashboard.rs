//! Assembly of the dashboard view model.

use super::aggregator::{
    filter_by_employee, filter_by_rating, leaderboard, rating_distribution, summarize,
    unique_names,
};
use crate::error::KpiError;
use crate::models::{Dashboard, DashboardMetadata, EmployeeFilter, KpiTable, Selection};
use chrono::Utc;
use tracing::debug;

/// Build every view for one rendering pass.
///
/// Filters only shape the table and the leaderboard; summary metrics and
/// the distribution always cover the whole table.
pub fn build_dashboard(
    table: &KpiTable,
    selection: &Selection,
    top_n: usize,
    source: &str,
) -> Result<Dashboard, KpiError> {
    if let EmployeeFilter::Name(name) = &selection.employee {
        if !unique_names(&table.records).contains(&name.as_str()) {
            return Err(KpiError::UnknownEmployee { name: name.clone() });
        }
    }

    let rows = filter_by_employee(&table.records, &selection.employee);
    let ranked = leaderboard(filter_by_rating(&table.records, selection.rating), top_n);
    debug!(
        "Selection employee={} rating={}: {} table rows, {} ranked",
        selection.employee,
        selection.rating,
        rows.len(),
        ranked.len()
    );

    Ok(Dashboard {
        metadata: DashboardMetadata {
            source: source.to_string(),
            sheet: table.sheet.clone(),
            generated_at: Utc::now(),
            employee_filter: selection.employee.to_string(),
            rating_filter: selection.rating,
            top_n,
        },
        extra_columns: table.extra_columns.clone(),
        table: rows.into_iter().cloned().collect(),
        leaderboard: ranked.into_iter().cloned().collect(),
        distribution: rating_distribution(&table.records),
        summary: summarize(&table.records),
        skipped: table.skipped.clone(),
    })
}
