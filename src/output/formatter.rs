//! Core formatting traits and the plain text implementation

use crate::{
    error::{AppError, Result},
    models::{Measurement, MeasurementRecord},
    stats::{ChartPoint, ChartSeries, ColumnStats, HistorySummary},
};
use std::fmt::Write as _;

/// Literal shown for every metric when the measurement was unavailable
pub const UNAVAILABLE_TEXT: &str = "Error";
/// Literal shown for a metric that was not obtained
pub const ABSENT_TEXT: &str = "N/A";

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Main trait for output formatting
pub trait OutputFormatter {
    fn format_header(&self, title: &str) -> Result<String>;

    /// The four labeled metrics of one test; `None` renders the unavailable state
    fn format_result_panel(&self, measurement: Option<&Measurement>) -> Result<String>;

    /// Bordered table of log rows, oldest first
    fn format_history_table(&self, records: &[MeasurementRecord]) -> Result<String>;

    fn format_history_summary(&self, summary: &HistorySummary) -> Result<String>;

    /// Download and upload over time
    fn format_chart(&self, chart: &ChartSeries) -> Result<String>;

    fn format_error(&self, error: &str) -> Result<String>;

    fn format_warning(&self, warning: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    pub enable_color: bool,
    pub verbose_mode: bool,
    pub table_borders: bool,
    /// Maximum number of points drawn per chart series
    pub chart_width: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            table_borders: true,
            chart_width: 60,
        }
    }
}

/// Table formatting configuration
#[derive(Debug, Clone)]
pub struct TableFormat {
    pub columns: Vec<Column>,
    pub show_borders: bool,
    pub show_header: bool,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub alignment: Alignment,
    pub min_width: usize,
}

impl Column {
    pub fn new(header: &str, alignment: Alignment) -> Self {
        Self {
            header: header.to_string(),
            alignment,
            min_width: 0,
        }
    }
}

/// Text alignment options
#[derive(Debug, Clone)]
pub enum Alignment {
    Left,
    Right,
}

/// Row data for table formatting
pub type RowData = Vec<String>;

/// (label, value) pairs of the result panel in display order
pub fn panel_values(measurement: Option<&Measurement>) -> [(&'static str, String); 4] {
    match measurement {
        Some(m) => [
            ("Download", format!("{:.2} Mbps", m.download_mbps)),
            ("Upload", format!("{:.2} Mbps", m.upload_mbps)),
            ("Ping", format_optional(m.ping_ms, "ms")),
            ("Jitter", format_optional(m.jitter_ms, "ms")),
        ],
        None => [
            ("Download", UNAVAILABLE_TEXT.to_string()),
            ("Upload", UNAVAILABLE_TEXT.to_string()),
            ("Ping", UNAVAILABLE_TEXT.to_string()),
            ("Jitter", UNAVAILABLE_TEXT.to_string()),
        ],
    }
}

fn format_optional(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.2} {}", v, unit),
        None => ABSENT_TEXT.to_string(),
    }
}

fn format_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| ABSENT_TEXT.to_string())
}

/// Table rows for the history table
pub fn history_rows(records: &[MeasurementRecord]) -> Vec<RowData> {
    records
        .iter()
        .map(|r| {
            vec![
                r.formatted_timestamp(),
                format_cell(r.download_mbps),
                format_cell(r.upload_mbps),
                format_cell(r.ping_ms),
                format_cell(r.jitter_ms),
            ]
        })
        .collect()
}

pub fn history_table_format(show_borders: bool) -> TableFormat {
    TableFormat {
        columns: vec![
            Column::new("Timestamp", Alignment::Left),
            Column::new("Download (Mbps)", Alignment::Right),
            Column::new("Upload (Mbps)", Alignment::Right),
            Column::new("Ping (ms)", Alignment::Right),
            Column::new("Jitter (ms)", Alignment::Right),
        ],
        show_borders,
        show_header: true,
    }
}

/// Render values as a one-line bar chart scaled between their min and max.
///
/// Only the last `width` values are drawn.
pub fn sparkline(values: &[f64], width: usize) -> String {
    let start = values.len().saturating_sub(width);
    let values = &values[start..];
    if values.is_empty() {
        return String::new();
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let top = SPARK_LEVELS.len() - 1;

    values
        .iter()
        .map(|&v| {
            let level = if span <= f64::EPSILON {
                top / 2
            } else {
                (((v - min) / span) * top as f64).round() as usize
            };
            SPARK_LEVELS[level.min(top)]
        })
        .collect()
}

fn fmt_err(what: &str) -> impl Fn(std::fmt::Error) -> AppError + '_ {
    move |e| AppError::io(format!("Failed to format {}: {}", what, e))
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormattingOptions {
        &self.options
    }

    /// Create a table with the given format and data
    pub fn create_table(&self, format: &TableFormat, rows: &[RowData]) -> String {
        if rows.is_empty() {
            return String::new();
        }

        let column_widths = self.calculate_column_widths(format, rows);
        let mut output = String::new();

        if format.show_header && !format.columns.is_empty() {
            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }

            let headers: Vec<String> = format.columns.iter().map(|c| c.header.clone()).collect();
            output.push_str(&self.create_row(&headers, &column_widths, format));
            output.push('\n');

            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }
        }

        for row in rows {
            output.push_str(&self.create_row(row, &column_widths, format));
            output.push('\n');
        }

        if format.show_borders {
            output.push_str(&self.create_horizontal_border(&column_widths));
        }

        output
    }

    fn calculate_column_widths(&self, format: &TableFormat, rows: &[RowData]) -> Vec<usize> {
        let num_columns = format
            .columns
            .len()
            .max(rows.iter().map(|r| r.len()).max().unwrap_or(0));

        (0..num_columns)
            .map(|col_idx| {
                let base = format
                    .columns
                    .get(col_idx)
                    .map(|c| c.min_width.max(c.header.chars().count()))
                    .unwrap_or(0);

                rows.iter()
                    .filter_map(|row| row.get(col_idx))
                    .map(|cell| cell.chars().count())
                    .fold(base, usize::max)
            })
            .collect()
    }

    fn create_row(&self, data: &[String], widths: &[usize], format: &TableFormat) -> String {
        let mut row = String::new();

        if format.show_borders {
            row.push('|');
        }

        for (idx, (cell, &width)) in data.iter().zip(widths.iter()).enumerate() {
            let alignment = format
                .columns
                .get(idx)
                .map(|c| &c.alignment)
                .unwrap_or(&Alignment::Left);

            if format.show_borders {
                row.push(' ');
            }
            row.push_str(&self.align_text(cell, width, alignment));
            if format.show_borders {
                row.push_str(" |");
            } else {
                row.push_str("  ");
            }
        }

        row.trim_end().to_string()
    }

    fn create_horizontal_border(&self, widths: &[usize]) -> String {
        let mut border = String::new();

        if !widths.is_empty() {
            border.push('+');
            for &width in widths {
                border.push_str(&"-".repeat(width + 2));
                border.push('+');
            }
        }

        border
    }

    fn align_text(&self, text: &str, width: usize, alignment: &Alignment) -> String {
        let len = text.chars().count();
        if len >= width {
            return text.chars().take(width).collect();
        }

        let padding = width - len;
        match alignment {
            Alignment::Left => format!("{}{}", text, " ".repeat(padding)),
            Alignment::Right => format!("{}{}", " ".repeat(padding), text),
        }
    }

    fn format_column_stats(label: &str, stats: Option<&ColumnStats>, unit: &str) -> String {
        match stats {
            Some(s) => format!(
                "{:<10} avg {:.2} {unit}, min {:.2} {unit}, max {:.2} {unit}",
                format!("{}:", label),
                s.mean,
                s.min,
                s.max,
                unit = unit
            ),
            None => format!("{:<10} {}", format!("{}:", label), ABSENT_TEXT),
        }
    }

    pub(super) fn chart_lines(&self, chart: &ChartSeries) -> Vec<(String, String, String)> {
        let width = self.options.chart_width;
        let mut lines = Vec::new();

        for (label, points) in [("Download", &chart.download), ("Upload", &chart.upload)] {
            let values: Vec<f64> = points.iter().map(|p| p.value).collect();
            if values.is_empty() {
                continue;
            }
            let shown = &values[values.len().saturating_sub(width)..];
            let min = shown.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = shown.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            lines.push((
                format!("{:<9}", label),
                sparkline(&values, width),
                format!("{:.2}..{:.2} Mbps", min, max),
            ));
        }

        lines
    }

    pub(super) fn chart_axis(&self, chart: &ChartSeries) -> Option<String> {
        let width = self.options.chart_width;
        let shown = |points: &[ChartPoint]| points[points.len().saturating_sub(width)..].to_vec();
        let timestamps: Vec<_> = shown(&chart.download)
            .into_iter()
            .chain(shown(&chart.upload))
            .map(|p| p.timestamp)
            .collect();

        let first = timestamps.iter().min()?;
        let last = timestamps.iter().max()?;

        Some(format!(
            "{:<9} {} -> {}",
            "Time",
            first.format(crate::models::TIMESTAMP_FORMAT),
            last.format(crate::models::TIMESTAMP_FORMAT)
        ))
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(title.chars().count() + 4);
        let err = fmt_err("header");

        writeln!(output, "{}", border).map_err(&err)?;
        writeln!(output, "  {}  ", title).map_err(&err)?;
        write!(output, "{}", border).map_err(&err)?;

        Ok(output)
    }

    fn format_result_panel(&self, measurement: Option<&Measurement>) -> Result<String> {
        let mut output = String::new();
        let err = fmt_err("result panel");

        for (label, value) in panel_values(measurement) {
            writeln!(output, "{:<10} {}", format!("{}:", label), value).map_err(&err)?;
        }
        if let (Some(m), true) = (measurement, self.options.verbose_mode) {
            writeln!(output, "{:<10} {} ({:.2} ms)", "Server:", m.endpoint.name, m.endpoint.latency_ms)
                .map_err(&err)?;
        }

        Ok(output.trim_end().to_string())
    }

    fn format_history_table(&self, records: &[MeasurementRecord]) -> Result<String> {
        let format = history_table_format(self.options.table_borders);
        Ok(self.create_table(&format, &history_rows(records)))
    }

    fn format_history_summary(&self, summary: &HistorySummary) -> Result<String> {
        let mut output = String::new();
        let err = fmt_err("summary");

        writeln!(output, "Summary ({} measurements)", summary.total_records).map_err(&err)?;
        if let (Some(first), Some(last)) = (summary.first_timestamp, summary.last_timestamp) {
            writeln!(
                output,
                "{:<10} {} -> {}",
                "Period:",
                first.format(crate::models::TIMESTAMP_FORMAT),
                last.format(crate::models::TIMESTAMP_FORMAT)
            )
            .map_err(&err)?;
        }
        writeln!(output, "{}", Self::format_column_stats("Download", summary.download.as_ref(), "Mbps"))
            .map_err(&err)?;
        writeln!(output, "{}", Self::format_column_stats("Upload", summary.upload.as_ref(), "Mbps"))
            .map_err(&err)?;
        write!(output, "{}", Self::format_column_stats("Ping", summary.ping.as_ref(), "ms")).map_err(&err)?;

        Ok(output)
    }

    fn format_chart(&self, chart: &ChartSeries) -> Result<String> {
        if chart.is_empty() {
            return Ok(String::new());
        }

        let mut output = String::new();
        let err = fmt_err("chart");

        writeln!(output, "Throughput over time").map_err(&err)?;
        for (label, line, range) in self.chart_lines(chart) {
            writeln!(output, "{} {}  {}", label, line, range).map_err(&err)?;
        }
        if let Some(axis) = self.chart_axis(chart) {
            write!(output, "{}", axis).map_err(&err)?;
        }

        Ok(output.trim_end().to_string())
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }
}
