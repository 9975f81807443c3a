//! Output formatting and display system
//!
//! Renders the dashboard: result panel, last-N history table, summary and
//! throughput chart, either as colored/plain text or as a JSON document.

mod colored;
mod formatter;

pub use colored::{ColorScheme, ColoredFormatter};
pub use formatter::{
    panel_values, sparkline, Alignment, Column, FormattingOptions, OutputFormatter, PlainFormatter,
    RowData, TableFormat, ABSENT_TEXT, UNAVAILABLE_TEXT,
};

use crate::{
    error::{AppError, Result},
    models::{Measurement, MeasurementRecord},
    stats::{ChartSeries, HistorySummary},
};
use serde::Serialize;

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            ..FormattingOptions::default()
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false, false)
    }
}

/// Machine-readable rendering of a dashboard view
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub identity: &'a str,
    /// Present for `run`; `null` when the measurement was unavailable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement: Option<Option<&'a Measurement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Last rows of the log, oldest first
    pub history: &'a [MeasurementRecord],
    pub summary: HistorySummary,
    pub chart: ChartSeries,
}

impl<'a> JsonReport<'a> {
    pub fn history(identity: &'a str, all: &'a [MeasurementRecord], rows: usize) -> Self {
        Self {
            identity,
            measurement: None,
            error: None,
            history: tail(all, rows),
            summary: HistorySummary::from_records(all),
            chart: ChartSeries::from_records(all),
        }
    }

    pub fn run(
        identity: &'a str,
        outcome: std::result::Result<&'a Measurement, &AppError>,
        all: &'a [MeasurementRecord],
        rows: usize,
    ) -> Self {
        let mut report = Self::history(identity, all, rows);
        match outcome {
            Ok(measurement) => report.measurement = Some(Some(measurement)),
            Err(e) => {
                report.measurement = Some(None);
                report.error = Some(e.to_string());
            }
        }
        report
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn tail(records: &[MeasurementRecord], rows: usize) -> &[MeasurementRecord] {
    &records[records.len().saturating_sub(rows)..]
}

/// Main output coordinator that assembles the dashboard views
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
}

impl OutputCoordinator {
    pub fn new(formatter: Box<dyn OutputFormatter>) -> Self {
        Self { formatter }
    }

    /// Result panel of a test attempt, followed by the history when present
    pub fn display_run(
        &self,
        identity: &str,
        outcome: std::result::Result<&Measurement, &AppError>,
        history: &[MeasurementRecord],
        rows: usize,
    ) -> Result<String> {
        let mut sections = vec![self.formatter.format_header(&format!("Speed Test: {}", identity))?];

        match outcome {
            Ok(measurement) => {
                sections.push(self.formatter.format_result_panel(Some(measurement))?);
            }
            Err(e) => {
                sections.push(self.formatter.format_result_panel(None)?);
                sections.push(self.formatter.format_error(&e.to_string())?);
            }
        }

        if !history.is_empty() {
            sections.push(self.history_sections(history, rows, false)?);
        }

        Ok(sections.join("\n\n"))
    }

    /// History table, summary and chart without a new measurement
    pub fn display_history(&self, identity: &str, history: &[MeasurementRecord], rows: usize) -> Result<String> {
        let header = self.formatter.format_header(&format!("Speed Test History: {}", identity))?;

        if history.is_empty() {
            let notice = self
                .formatter
                .format_warning(&format!("No measurements logged for '{}' yet", identity))?;
            return Ok(format!("{}\n\n{}", header, notice));
        }

        Ok(format!("{}\n\n{}", header, self.history_sections(history, rows, true)?))
    }

    fn history_sections(&self, history: &[MeasurementRecord], rows: usize, with_summary: bool) -> Result<String> {
        let shown = tail(history, rows);
        let mut sections = vec![format!(
            "Last {} of {} measurements\n{}",
            shown.len(),
            history.len(),
            self.formatter.format_history_table(shown)?
        )];

        if with_summary {
            sections.push(self.formatter.format_history_summary(&HistorySummary::from_records(history))?);
        }

        let chart = self.formatter.format_chart(&ChartSeries::from_records(history))?;
        if !chart.is_empty() {
            sections.push(chart);
        }

        Ok(sections.join("\n\n"))
    }
}
