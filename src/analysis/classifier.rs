//! Per-row KPI derivation.
//!
//! Turns resolved sheet rows into [`EmployeeRecord`]s: parses the raw score,
//! applies the [`ScorePolicy`], derives the percentage and the rating.

use super::columns::{resolve_columns, ColumnAliases, ColumnMap};
use crate::error::KpiError;
use crate::models::{EmployeeRecord, KpiTable, Rating, SkippedRow};
use crate::workbook::{CellValue, RawTable};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// How rows with unusable scores or names are treated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ScorePolicy {
    /// Skip unparseable rows, keep out-of-range scores as-is (default)
    #[default]
    Lenient,
    /// Skip unparseable rows, clamp scores into 0..1
    Clamp,
    /// Fail on any unparseable row or out-of-range score
    Strict,
}

/// Round to `decimals` places, ties to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// `raw * 100` rounded to two decimals.
pub fn percent_from_raw(raw: f64) -> f64 {
    round_to(raw * 100.0, 2)
}

/// Read a numeric score from a cell. Text cells may use `,` as the
/// decimal separator.
fn parse_score(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => s.trim().replace(',', ".").parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// Outcome of classifying a single row.
enum RowOutcome {
    Record(EmployeeRecord),
    Skip(String),
    Blank,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

fn cell_at(cells: &[CellValue], index: usize) -> &CellValue {
    cells.get(index).unwrap_or(&EMPTY_CELL)
}

fn classify_row(
    row: usize,
    cells: &[CellValue],
    columns: &ColumnMap,
    policy: ScorePolicy,
) -> Result<RowOutcome, KpiError> {
    if cells.iter().all(CellValue::is_blank) {
        return Ok(RowOutcome::Blank);
    }

    let full_name = cell_at(cells, columns.full_name).to_string().trim().to_string();
    if full_name.is_empty() {
        return match policy {
            ScorePolicy::Strict => Err(KpiError::MissingName { row }),
            _ => Ok(RowOutcome::Skip("employee name is empty".to_string())),
        };
    }

    let score_cell = cell_at(cells, columns.raw_score);
    let Some(mut raw_score) = parse_score(score_cell) else {
        let value = score_cell.to_string();
        return match policy {
            ScorePolicy::Strict => Err(KpiError::InvalidScore { row, value }),
            _ if value.trim().is_empty() => Ok(RowOutcome::Skip("score is empty".to_string())),
            _ => Ok(RowOutcome::Skip(format!("score '{}' is not a number", value))),
        };
    };

    if !(0.0..=1.0).contains(&raw_score) {
        match policy {
            ScorePolicy::Strict => {
                return Err(KpiError::ScoreOutOfRange {
                    row,
                    value: raw_score,
                })
            }
            ScorePolicy::Clamp => {
                debug!("Row {}: clamping score {} into 0..1", row, raw_score);
                raw_score = raw_score.clamp(0.0, 1.0);
            }
            ScorePolicy::Lenient => {
                debug!("Row {}: score {} is outside 0..1, keeping it", row, raw_score);
            }
        }
    }

    let percent_score = percent_from_raw(raw_score);

    Ok(RowOutcome::Record(EmployeeRecord {
        row,
        full_name,
        role: cell_at(cells, columns.role).to_string().trim().to_string(),
        raw_score,
        percent_score,
        rating: Rating::from_percent(percent_score),
        extra: columns
            .extra
            .iter()
            .map(|(index, _)| cell_at(cells, *index).to_string())
            .collect(),
    }))
}

/// Resolve columns and classify every data row of `raw`.
///
/// Column resolution happens before any row is looked at, so a missing
/// column never yields a partial table.
pub fn classify(
    raw: &RawTable,
    aliases: &ColumnAliases,
    policy: ScorePolicy,
) -> Result<KpiTable, KpiError> {
    let columns = resolve_columns(&raw.headers, aliases)?;

    let mut table = KpiTable {
        sheet: raw.sheet.clone(),
        extra_columns: columns.extra.iter().map(|(_, h)| h.clone()).collect(),
        records: Vec::with_capacity(raw.rows.len()),
        skipped: Vec::new(),
    };

    for (row, cells) in &raw.rows {
        match classify_row(*row, cells, &columns, policy)? {
            RowOutcome::Record(record) => table.records.push(record),
            RowOutcome::Skip(reason) => {
                warn!("Skipping row {}: {}", row, reason);
                table.skipped.push(SkippedRow { row: *row, reason });
            }
            RowOutcome::Blank => {}
        }
    }

    info!(
        "Classified {} employees ({} rows skipped)",
        table.records.len(),
        table.skipped.len()
    );

    Ok(table)
}
