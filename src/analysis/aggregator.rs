//! Filtering, ranking and summary statistics.
//!
//! This module provides the read-only views the dashboard is built from:
//! employee and rating filters, the leaderboard, the headline metrics and
//! the rating distribution.

use crate::models::{BandCount, EmployeeFilter, EmployeeRecord, Rating, RatingFilter, Summary};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Rows matching an employee selection.
pub fn filter_by_employee<'a>(
    records: &'a [EmployeeRecord],
    filter: &EmployeeFilter,
) -> Vec<&'a EmployeeRecord> {
    match filter {
        EmployeeFilter::All => records.iter().collect(),
        EmployeeFilter::Name(name) => records.iter().filter(|r| &r.full_name == name).collect(),
    }
}

/// Rows matching a rating selection.
pub fn filter_by_rating(records: &[EmployeeRecord], filter: RatingFilter) -> Vec<&EmployeeRecord> {
    match filter {
        RatingFilter::All => records.iter().collect(),
        RatingFilter::Band(rating) => records.iter().filter(|r| r.rating == rating).collect(),
    }
}

/// Sort by KPI percentage (highest first) and keep at most `n` rows.
///
/// The sort is stable, so equal scores keep their sheet order.
pub fn leaderboard<'a>(mut records: Vec<&'a EmployeeRecord>, n: usize) -> Vec<&'a EmployeeRecord> {
    records.sort_by(|a, b| {
        b.percent_score
            .partial_cmp(&a.percent_score)
            .unwrap_or(Ordering::Equal)
    });
    records.truncate(n);
    records
}

/// Headline metrics over the given rows.
pub fn summarize(records: &[EmployeeRecord]) -> Summary {
    let employee_count = records.len();
    if employee_count == 0 {
        return Summary::default();
    }

    let total: f64 = records.iter().map(|r| r.percent_score).sum();
    let excellent = records
        .iter()
        .filter(|r| r.rating == Rating::Excellent)
        .count();

    Summary {
        employee_count,
        mean_percent: total / employee_count as f64,
        excellent_share: excellent as f64 / employee_count as f64 * 100.0,
    }
}

/// Count employees per rating band.
///
/// Empty bands are omitted. Bands are ordered by count, largest first,
/// with ties in band order.
pub fn rating_distribution(records: &[EmployeeRecord]) -> Vec<BandCount> {
    let mut counts: HashMap<Rating, usize> = HashMap::new();

    for record in records {
        *counts.entry(record.rating).or_default() += 1;
    }

    let total = records.len() as f64;
    let mut distribution: Vec<BandCount> = Rating::ALL
        .iter()
        .filter_map(|rating| {
            counts.get(rating).map(|&count| BandCount {
                rating: *rating,
                count,
                share: count as f64 / total,
            })
        })
        .collect();

    distribution.sort_by_key(|band| std::cmp::Reverse(band.count));
    distribution
}

/// Distinct employee names in order of first appearance.
pub fn unique_names(records: &[EmployeeRecord]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();

    for record in records {
        if !names.contains(&record.full_name.as_str()) {
            names.push(&record.full_name);
        }
    }

    names
}
