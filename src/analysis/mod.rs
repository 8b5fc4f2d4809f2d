//! KPI analysis modules.
//!
//! Column resolution, per-row classification, aggregation and the
//! dashboard view model built on top of them.

pub mod aggregator;
pub mod classifier;
pub mod columns;
pub mod dashboard;

pub use aggregator::*;
pub use classifier::{classify, percent_from_raw, ScorePolicy};
pub use columns::ColumnAliases;
pub use dashboard::build_dashboard;
