//! Report rendering: plain text lines or a JSON document.

use serde::Serialize;

use crate::app::{PipelineStats, TallyOutcome};
use crate::errors::{MxTallyError, Result};
use crate::resolver::SkippedDomain;
use crate::tally::RankedEntry;

/// Which rendering to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Everything a formatter may render.
#[derive(Debug, Serialize)]
pub struct TallyReport {
    pub providers: Vec<RankedEntry>,
    pub skipped_domains: Vec<SkippedDomain>,
    pub stats: PipelineStats,
}

impl From<TallyOutcome> for TallyReport {
    fn from(outcome: TallyOutcome) -> Self {
        Self {
            providers: outcome.entries,
            skipped_domains: outcome.skipped,
            stats: outcome.stats,
        }
    }
}

/// A rendering strategy for the final report.
pub trait ReportFormatter {
    fn format_report(&self, report: &TallyReport) -> Result<String>;
}

/// One `<providerDomain> <count>` line per entry, ranked order, nothing else.
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format_report(&self, report: &TallyReport) -> Result<String> {
        let mut out = String::new();
        for entry in &report.providers {
            out.push_str(&entry.provider);
            out.push(' ');
            out.push_str(&entry.count.to_string());
            out.push('\n');
        }
        Ok(out)
    }
}

/// Full report as a pretty-printed JSON document.
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format_report(&self, report: &TallyReport) -> Result<String> {
        let mut rendered = serde_json::to_string_pretty(report)
            .map_err(|e| MxTallyError::internal(format!("JSON rendering failed: {e}")))?;
        rendered.push('\n');
        Ok(rendered)
    }
}

/// Factory keeping the binary decoupled from concrete formatters.
pub fn create_formatter(format: ReportFormat) -> Box<dyn ReportFormatter> {
    match format {
        ReportFormat::Text => Box::new(TextFormatter),
        ReportFormat::Json => Box::new(JsonFormatter),
    }
}
