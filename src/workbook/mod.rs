//! Spreadsheet loading.
//!
//! This module reads the first sheet of a workbook into a [`RawTable`]
//! of typed cells, leaving column resolution and scoring to `analysis`.

use crate::error::KpiError;
use calamine::{open_workbook_auto, Data, ExcelDateTime, Reader};
use chrono::Timelike;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// A single cell value, independent of the spreadsheet backend.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// A formula error such as `#DIV/0!`.
    Error(String),
}

impl CellValue {
    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::Error(e) => CellValue::Error(e.to_string()),
            Data::DateTime(dt) => CellValue::Text(format_datetime(dt)),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }
}

/// Calendar text for a date cell: `2024-01-01`, with the time of day
/// appended when it is not midnight. Durations keep their serial value.
fn format_datetime(dt: &ExcelDateTime) -> String {
    if !dt.is_datetime() {
        return dt.as_f64().to_string();
    }
    match dt.as_datetime() {
        Some(value) if value.num_seconds_from_midnight() == 0 => {
            value.format("%Y-%m-%d").to_string()
        }
        Some(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => dt.as_f64().to_string(),
    }
}

/// Header row plus data rows of one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub sheet: String,
    pub headers: Vec<String>,
    /// Data rows with their 1-indexed sheet row numbers.
    pub rows: Vec<(usize, Vec<CellValue>)>,
}

impl RawTable {
    /// Build a table from sheet rows, taking the first non-blank row as the header.
    ///
    /// `first_row` is the 1-indexed sheet row of the first element of `rows`.
    pub fn from_rows<I>(sheet: &str, first_row: usize, rows: I) -> Result<Self, KpiError>
    where
        I: IntoIterator<Item = Vec<CellValue>>,
    {
        let mut numbered = rows
            .into_iter()
            .enumerate()
            .map(|(i, cells)| (first_row + i, cells))
            .skip_while(|(_, cells)| cells.iter().all(CellValue::is_blank));

        let (header_row, header_cells) = numbered.next().ok_or_else(|| KpiError::EmptySheet {
            sheet: sheet.to_string(),
        })?;
        debug!("Header found on row {}", header_row);

        let headers = header_cells.iter().map(|c| c.to_string()).collect();

        Ok(Self {
            sheet: sheet.to_string(),
            headers,
            rows: numbered.collect(),
        })
    }
}

/// Load the first sheet of a workbook (xlsx, xlsm, xlsb, xls or ods).
pub fn load_first_sheet(path: &Path) -> Result<RawTable, KpiError> {
    info!("Reading workbook: {}", path.display());

    let mut workbook = open_workbook_auto(path).map_err(|source| KpiError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| KpiError::NoSheets {
            path: path.to_path_buf(),
        })?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|source| KpiError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;

    // Ranges start at the first used cell, not at A1.
    let first_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
    let rows = range
        .rows()
        .map(|row| row.iter().map(CellValue::from).collect::<Vec<_>>());

    let table = RawTable::from_rows(&sheet, first_row, rows)?;
    info!(
        "Sheet '{}': {} columns, {} data rows",
        table.sheet,
        table.headers.len(),
        table.rows.len()
    );

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{classify, ColumnAliases, ScorePolicy};
    use crate::models::Rating;
    use calamine::ExcelDateTimeType;
    use std::io::Write;
    use std::path::PathBuf;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_from_rows_uses_first_non_blank_row_as_header() {
        let rows = vec![
            vec![CellValue::Empty, text("  ")],
            vec![text("full_name"), text("role")],
            vec![text("Ann"), text("Auditor")],
        ];

        let table = RawTable::from_rows("Sheet1", 3, rows).unwrap();

        assert_eq!(table.headers, vec!["full_name", "role"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].0, 5);
    }

    #[test]
    fn test_from_rows_empty_sheet() {
        let rows: Vec<Vec<CellValue>> = vec![vec![CellValue::Empty]];
        let err = RawTable::from_rows("Sheet1", 1, rows).unwrap_err();
        assert!(matches!(err, KpiError::EmptySheet { .. }));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Number(5.0).to_string(), "5");
        assert_eq!(CellValue::Number(0.875).to_string(), "0.875");
        assert_eq!(CellValue::Empty.to_string(), "");
        assert!(text(" ").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn test_cell_from_calamine() {
        assert_eq!(CellValue::from(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(
            CellValue::from(&Data::String("x".to_string())),
            text("x")
        );
        assert_eq!(CellValue::from(&Data::Empty), CellValue::Empty);
    }

    #[test]
    fn test_cell_from_calamine_dates() {
        let date = Data::DateTime(ExcelDateTime::new(
            45292.0,
            ExcelDateTimeType::DateTime,
            false,
        ));
        assert_eq!(CellValue::from(&date), text("2024-01-01"));

        let noon = Data::DateTime(ExcelDateTime::new(
            45292.5,
            ExcelDateTimeType::DateTime,
            false,
        ));
        assert_eq!(CellValue::from(&noon), text("2024-01-01 12:00:00"));

        let iso = Data::DateTimeIso("2024-01-01T08:30:00".to_string());
        assert_eq!(CellValue::from(&iso), text("2024-01-01T08:30:00"));
    }

    /// Two sheets: `KPI` with its header at B3, then `Archive`.
    fn create_test_workbook(dir: &Path) -> PathBuf {
        use rust_xlsxwriter::{ExcelDateTime as XlsxDate, Format, Workbook};

        let path = dir.join("kpi.xlsx");
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        let sheet = workbook.add_worksheet();
        sheet.set_name("KPI").unwrap();
        for (col, header) in ["FIO", "Lavozimi", "Yigma", "Hudud", "Sana"].iter().enumerate() {
            sheet.write_string(2, col as u16 + 1, *header).unwrap();
        }
        sheet.write_string(3, 1, "Ann").unwrap();
        sheet.write_string(3, 2, "Auditor").unwrap();
        sheet.write_number(3, 3, 0.8765).unwrap();
        sheet.write_string(3, 4, "Tashkent").unwrap();
        let hired = XlsxDate::from_ymd(2024, 1, 1).unwrap();
        sheet
            .write_datetime_with_format(3, 5, &hired, &date_format)
            .unwrap();
        sheet.write_string(4, 1, "Bob").unwrap();
        sheet.write_string(4, 2, "Auditor").unwrap();
        sheet.write_number(4, 3, 0.5).unwrap();
        sheet.write_string(4, 4, "Samarkand").unwrap();

        let archive = workbook.add_worksheet();
        archive.set_name("Archive").unwrap();
        archive.write_string(0, 0, "FIO").unwrap();
        archive.write_string(1, 0, "Old Employee").unwrap();

        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn test_load_first_sheet_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = create_test_workbook(dir.path());

        let table = load_first_sheet(&path).unwrap();

        assert_eq!(table.sheet, "KPI");
        assert_eq!(table.headers, vec!["FIO", "Lavozimi", "Yigma", "Hudud", "Sana"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].0, 4);
        assert_eq!(table.rows[1].0, 5);
        assert_eq!(table.rows[0].1[0], text("Ann"));
        assert_eq!(table.rows[0].1[2], CellValue::Number(0.8765));
        assert_eq!(table.rows[0].1[4], text("2024-01-01"));
        assert!(table
            .rows
            .iter()
            .all(|(_, cells)| !cells.contains(&text("Old Employee"))));
    }

    #[test]
    fn test_loaded_sheet_classifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = create_test_workbook(dir.path());

        let raw = load_first_sheet(&path).unwrap();
        let table = classify(&raw, &ColumnAliases::default(), ScorePolicy::Strict).unwrap();

        assert_eq!(table.records.len(), 2);
        let ann = &table.records[0];
        assert_eq!(ann.row, 4);
        assert_eq!(ann.percent_score, 87.65);
        assert_eq!(ann.rating, Rating::Excellent);
        assert_eq!(ann.extra, vec!["Tashkent", "2024-01-01"]);
        assert_eq!(table.records[1].rating, Rating::Unsatisfactory);
        assert_eq!(table.extra_columns, vec!["Hudud", "Sana"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_first_sheet(&dir.path().join("absent.xlsx")).unwrap_err();
        assert!(matches!(err, KpiError::Workbook { .. }));
    }

    #[test]
    fn test_load_corrupt_file() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(b"definitely not a zip archive").unwrap();

        let err = load_first_sheet(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to open workbook"));
    }
}
