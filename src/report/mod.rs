//! Report renderers.
//!
//! Each renderer turns a [`Dashboard`] into a complete document; none of
//! them compute anything beyond layout.

mod generator;
mod html;

pub use generator::{generate_json_report, generate_markdown_report};
pub use html::generate_html_report;

use crate::cli::OutputFormat;
use crate::models::{Dashboard, Locale};
use anyhow::Result;

/// Presentation settings shared by all renderers.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub title: String,
    pub locale: Locale,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "KPI Dashboard".to_string(),
            locale: Locale::En,
        }
    }
}

/// Render `dashboard` in the requested format.
pub fn render(dashboard: &Dashboard, format: OutputFormat, options: &ReportOptions) -> Result<String> {
    match format {
        OutputFormat::Markdown => Ok(generate_markdown_report(dashboard, options)),
        OutputFormat::Json => generate_json_report(dashboard),
        OutputFormat::Html => Ok(generate_html_report(dashboard, options)),
    }
}
