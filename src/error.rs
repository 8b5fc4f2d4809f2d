//! Domain errors for workbook loading and KPI classification.

use std::path::PathBuf;

/// Errors raised while turning a spreadsheet into a KPI dashboard.
#[derive(Debug, thiserror::Error)]
pub enum KpiError {
    #[error("missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("unknown employee '{name}' (use --list-employees to see valid names)")]
    UnknownEmployee { name: String },

    #[error("unknown rating '{value}' (expected all, unsatisfactory, satisfactory, good or excellent)")]
    InvalidRating { value: String },

    #[error("row {row}: score '{value}' is not a number")]
    InvalidScore { row: usize, value: String },

    #[error("row {row}: score {value} is outside the range 0..1")]
    ScoreOutOfRange { row: usize, value: f64 },

    #[error("row {row}: employee name is empty")]
    MissingName { row: usize },

    #[error("failed to open workbook {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook {} contains no sheets", .path.display())]
    NoSheets { path: PathBuf },

    #[error("sheet '{sheet}' has no header row")]
    EmptySheet { sheet: String },
}
