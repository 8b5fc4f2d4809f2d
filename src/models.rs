//! Data models for the KPI dashboard.
//!
//! This module contains the core data structures used throughout
//! the application for representing employees, ratings, and the
//! dashboard view that every report renders.

use crate::error::KpiError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Performance band derived from an employee's KPI percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    /// Below 56%
    Unsatisfactory,
    /// 56% up to 71%
    Satisfactory,
    /// 71% up to 86%
    Good,
    /// 86% and above
    Excellent,
}

/// Lower bounds of each band above `Unsatisfactory`, highest first.
/// A value equal to a bound belongs to that bound's band.
const RATING_THRESHOLDS: [(f64, Rating); 3] = [
    (86.0, Rating::Excellent),
    (71.0, Rating::Good),
    (56.0, Rating::Satisfactory),
];

impl Rating {
    /// All bands in ascending order.
    pub const ALL: [Rating; 4] = [
        Rating::Unsatisfactory,
        Rating::Satisfactory,
        Rating::Good,
        Rating::Excellent,
    ];

    /// Classify a KPI percentage.
    pub fn from_percent(percent: f64) -> Self {
        RATING_THRESHOLDS
            .iter()
            .find(|(min, _)| percent >= *min)
            .map(|(_, rating)| *rating)
            .unwrap_or(Rating::Unsatisfactory)
    }

    /// Label in the requested locale.
    pub fn label(&self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::En, Rating::Unsatisfactory) => "Unsatisfactory",
            (Locale::En, Rating::Satisfactory) => "Satisfactory",
            (Locale::En, Rating::Good) => "Good",
            (Locale::En, Rating::Excellent) => "Excellent",
            (Locale::Uz, Rating::Unsatisfactory) => "Qoniqarsiz",
            (Locale::Uz, Rating::Satisfactory) => "Qoniqarli",
            (Locale::Uz, Rating::Good) => "Yaxshi",
            (Locale::Uz, Rating::Excellent) => "A’lo",
        }
    }

    /// Chart colour shared by the leaderboard and the distribution chart.
    pub fn color(&self) -> &'static str {
        match self {
            Rating::Unsatisfactory => "red",
            Rating::Satisfactory => "yellow",
            Rating::Good => "green",
            Rating::Excellent => "blue",
        }
    }

    /// Returns an emoji swatch matching [`Rating::color`].
    pub fn emoji(&self) -> &'static str {
        match self {
            Rating::Unsatisfactory => "🔴",
            Rating::Satisfactory => "🟡",
            Rating::Good => "🟢",
            Rating::Excellent => "🔵",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label(Locale::En))
    }
}

impl FromStr for Rating {
    type Err = KpiError;

    /// Accepts English or Uzbek labels, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_lowercase()
            .replace(['’', 'ʻ', '`', '‘'], "'");
        match normalized.as_str() {
            "unsatisfactory" | "qoniqarsiz" => Ok(Rating::Unsatisfactory),
            "satisfactory" | "qoniqarli" => Ok(Rating::Satisfactory),
            "good" | "yaxshi" => Ok(Rating::Good),
            "excellent" | "a'lo" | "alo" => Ok(Rating::Excellent),
            _ => Err(KpiError::InvalidRating {
                value: s.to_string(),
            }),
        }
    }
}

/// Language used for rating labels in reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English labels (default)
    #[default]
    En,
    /// Uzbek labels, as used in the source spreadsheets
    Uz,
}

/// One employee row after classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// 1-indexed row in the source sheet.
    pub row: usize,
    pub full_name: String,
    pub role: String,
    /// Composite score as a fraction, nominally 0..1.
    pub raw_score: f64,
    /// `raw_score * 100` rounded to two decimals.
    pub percent_score: f64,
    pub rating: Rating,
    /// Display values of the non-required columns, in sheet order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<String>,
}

/// A data row dropped by the score policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
}

/// The classified contents of one uploaded workbook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KpiTable {
    /// Name of the sheet the rows were read from.
    pub sheet: String,
    /// Headers of the non-required columns.
    pub extra_columns: Vec<String>,
    pub records: Vec<EmployeeRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Employee selection for the table view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EmployeeFilter {
    #[default]
    All,
    Name(String),
}

impl EmployeeFilter {
    /// Parse a selector value; `all` (any case) selects everyone.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("all") {
            EmployeeFilter::All
        } else {
            EmployeeFilter::Name(value.to_string())
        }
    }
}

impl fmt::Display for EmployeeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmployeeFilter::All => write!(f, "all"),
            EmployeeFilter::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Band selection for the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RatingFilter {
    #[default]
    All,
    Band(Rating),
}

impl RatingFilter {
    /// Label in the requested locale; `all` is the same in every locale.
    pub fn label(&self, locale: Locale) -> &'static str {
        match self {
            RatingFilter::All => "all",
            RatingFilter::Band(rating) => rating.label(locale),
        }
    }
}

impl From<RatingFilter> for String {
    fn from(filter: RatingFilter) -> Self {
        filter.to_string()
    }
}

impl TryFrom<String> for RatingFilter {
    type Error = KpiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for RatingFilter {
    type Err = KpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(RatingFilter::All)
        } else {
            s.parse().map(RatingFilter::Band)
        }
    }
}

impl fmt::Display for RatingFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label(Locale::En))
    }
}

/// Request-scoped selector state for one rendering pass.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub employee: EmployeeFilter,
    pub rating: RatingFilter,
}

/// Headline metrics over the unfiltered record set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub employee_count: usize,
    /// Mean KPI percentage; 0 when there are no employees.
    pub mean_percent: f64,
    /// Percentage of employees rated Excellent; 0 when there are no employees.
    pub excellent_share: f64,
}

impl Summary {
    /// Mean KPI as shown on the dashboard, e.g. `66.67%`.
    pub fn mean_display(&self) -> String {
        format!("{:.2}%", self.mean_percent)
    }

    /// Excellent share as shown on the dashboard, e.g. `33.3%`.
    pub fn excellent_share_display(&self) -> String {
        format!("{:.1}%", self.excellent_share)
    }
}

/// Number of employees in one rating band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandCount {
    pub rating: Rating,
    pub count: usize,
    /// Fraction of all employees, 0..1.
    pub share: f64,
}

/// Metadata about a rendered dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMetadata {
    /// Path of the workbook the data came from.
    pub source: String,
    pub sheet: String,
    pub generated_at: DateTime<Utc>,
    pub employee_filter: String,
    pub rating_filter: RatingFilter,
    pub top_n: usize,
}

/// Everything a report renderer needs for one pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub metadata: DashboardMetadata,
    pub extra_columns: Vec<String>,
    /// Employee-filtered table view.
    pub table: Vec<EmployeeRecord>,
    /// Rating-filtered top-N view, best first.
    pub leaderboard: Vec<EmployeeRecord>,
    pub distribution: Vec<BandCount>,
    pub summary: Summary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRow>,
}
