//! Header alias resolution.
//!
//! Maps raw sheet headers onto the three canonical columns the
//! classifier needs. Every other column is carried through as an extra.

use crate::error::KpiError;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const FULL_NAME: &str = "full_name";
pub const ROLE: &str = "role";
pub const RAW_SCORE: &str = "raw_score";

/// Accepted header texts for each canonical column.
///
/// The canonical name itself is always accepted, even when it is not
/// listed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnAliases {
    #[serde(default = "default_full_name")]
    pub full_name: Vec<String>,

    #[serde(default = "default_role")]
    pub role: Vec<String>,

    #[serde(default = "default_raw_score")]
    pub raw_score: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            full_name: default_full_name(),
            role: default_role(),
            raw_score: default_raw_score(),
        }
    }
}

fn default_full_name() -> Vec<String> {
    vec!["Ichki audit xizmati xodimlari\nFIO".to_string(), "FIO".to_string()]
}

fn default_role() -> Vec<String> {
    vec!["Lavozimi".to_string(), "Lavozim".to_string()]
}

fn default_raw_score() -> Vec<String> {
    vec!["Yigʻma koʻrsatkich".to_string(), "Yigma".to_string()]
}

/// Column positions after alias resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub full_name: usize,
    pub role: usize,
    pub raw_score: usize,
    /// Remaining columns as (index, header), in sheet order.
    pub extra: Vec<(usize, String)>,
}

/// Locate the canonical columns in `headers`.
///
/// Headers are compared after trimming surrounding whitespace. When several
/// headers match, the leftmost wins. Fails with every missing column named.
pub fn resolve_columns(headers: &[String], aliases: &ColumnAliases) -> Result<ColumnMap, KpiError> {
    let find = |canonical: &str, names: &[String]| -> Option<usize> {
        headers.iter().position(|header| {
            let header = header.trim();
            header == canonical || names.iter().any(|alias| alias.trim() == header)
        })
    };

    let full_name = find(FULL_NAME, &aliases.full_name);
    let role = find(ROLE, &aliases.role);
    let raw_score = find(RAW_SCORE, &aliases.raw_score);

    match (full_name, role, raw_score) {
        (Some(full_name), Some(role), Some(raw_score)) => {
            let extra = headers
                .iter()
                .enumerate()
                .filter(|(i, _)| ![full_name, role, raw_score].contains(i))
                .map(|(i, header)| (i, header.clone()))
                .collect::<Vec<_>>();

            debug!(
                "Resolved columns: full_name={}, role={}, raw_score={}, {} extra",
                full_name,
                role,
                raw_score,
                extra.len()
            );

            Ok(ColumnMap {
                full_name,
                role,
                raw_score,
                extra,
            })
        }
        _ => {
            let missing = [
                (FULL_NAME, full_name),
                (ROLE, role),
                (RAW_SCORE, raw_score),
            ]
            .into_iter()
            .filter(|(_, found)| found.is_none())
            .map(|(name, _)| name.to_string())
            .collect();

            Err(KpiError::MissingColumns { missing })
        }
    }
}
