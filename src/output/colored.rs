//! Colored formatter implementation with terminal color support

use super::formatter::{
    history_rows, history_table_format, panel_values, FormattingOptions, OutputFormatter,
    PlainFormatter, ABSENT_TEXT, UNAVAILABLE_TEXT,
};
use crate::{
    error::Result,
    models::{Measurement, MeasurementRecord},
    stats::{ChartSeries, HistorySummary},
    types::SpeedLevel,
};
use colored::*;

impl SpeedLevel {
    /// Color used for throughput values at this level
    pub fn color(&self) -> Color {
        match self {
            Self::Fast => Color::Green,
            Self::Moderate => Color::Yellow,
            Self::Slow => Color::Red,
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub warning: Color,
    pub error: Color,
    pub download: Color,
    pub upload: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            warning: Color::Yellow,
            error: Color::Red,
            download: Color::Cyan,
            upload: Color::Magenta,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self::with_color_scheme(options, ColorScheme::default())
    }

    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        let plain_formatter = PlainFormatter::new(options.clone());
        Self {
            plain_formatter,
            options,
            color_scheme,
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    fn dimmed(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.dimmed()
        } else {
            text.normal()
        }
    }

    fn colorize_value(&self, label: &str, value: &str, measurement: Option<&Measurement>) -> ColoredString {
        if value == UNAVAILABLE_TEXT {
            return self.colorize(value, self.color_scheme.error);
        }
        if value == ABSENT_TEXT {
            return self.dimmed(value);
        }

        match (label, measurement) {
            ("Download", Some(m)) => self.colorize(value, SpeedLevel::from_mbps(m.download_mbps).color()),
            ("Upload", Some(m)) => self.colorize(value, SpeedLevel::from_mbps(m.upload_mbps).color()),
            _ => value.normal(),
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let border = "=".repeat(title.chars().count() + 4);
        Ok(format!(
            "{}\n  {}  \n{}",
            self.colorize(&border, self.color_scheme.header),
            self.bold(title).color(self.color_scheme.header),
            self.colorize(&border, self.color_scheme.header)
        ))
    }

    fn format_result_panel(&self, measurement: Option<&Measurement>) -> Result<String> {
        let mut lines: Vec<String> = panel_values(measurement)
            .iter()
            .map(|(label, value)| {
                format!(
                    "{} {}",
                    self.bold(&format!("{:<10}", format!("{}:", label))),
                    self.colorize_value(label, value, measurement)
                )
            })
            .collect();

        if let (Some(m), true) = (measurement, self.options.verbose_mode) {
            lines.push(format!(
                "{} {}",
                self.bold(&format!("{:<10}", "Server:")),
                self.dimmed(&format!("{} ({:.2} ms)", m.endpoint.name, m.endpoint.latency_ms))
            ));
        }

        Ok(lines.join("\n"))
    }

    fn format_history_table(&self, records: &[MeasurementRecord]) -> Result<String> {
        let format = history_table_format(self.options.table_borders);
        let table = self.plain_formatter.create_table(&format, &history_rows(records));

        // Borders are dimmed, the header row is bold
        let lines: Vec<String> = table
            .lines()
            .enumerate()
            .map(|(idx, line)| {
                if line.starts_with('+') {
                    self.colorize(line, self.color_scheme.muted).to_string()
                } else if idx <= 1 {
                    self.bold(line).to_string()
                } else {
                    line.to_string()
                }
            })
            .collect();

        Ok(lines.join("\n"))
    }

    fn format_history_summary(&self, summary: &HistorySummary) -> Result<String> {
        let text = self.plain_formatter.format_history_summary(summary)?;
        let mut lines = text.lines();
        let mut output = Vec::new();

        if let Some(title) = lines.next() {
            output.push(self.bold(title).color(self.color_scheme.header).to_string());
        }
        output.extend(lines.map(String::from));

        Ok(output.join("\n"))
    }

    fn format_chart(&self, chart: &ChartSeries) -> Result<String> {
        if chart.is_empty() {
            return Ok(String::new());
        }

        let mut output = vec![self.bold("Throughput over time").color(self.color_scheme.header).to_string()];

        for (label, line, range) in self.plain_formatter.chart_lines(chart) {
            let color = if label.trim() == "Download" {
                self.color_scheme.download
            } else {
                self.color_scheme.upload
            };
            output.push(format!("{} {}  {}", self.bold(&label), self.colorize(&line, color), self.dimmed(&range)));
        }
        if let Some(axis) = self.plain_formatter.chart_axis(chart) {
            output.push(self.dimmed(&axis).to_string());
        }

        Ok(output.join("\n"))
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("❌ {}", self.colorize(error, self.color_scheme.error)))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("⚠️  {}", self.colorize(warning, self.color_scheme.warning)))
    }
}
