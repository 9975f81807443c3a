//! Text encoding of the measurement log table

use crate::error::{AppError, Result};
use crate::models::{MeasurementRecord, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;

/// Header row; the column order is fixed
pub const HEADER: &str = "Timestamp,Download_Mbps,Upload_Mbps,Ping_ms,Jitter_ms";

const COLUMN_COUNT: usize = 5;

/// Render records as a complete table, header first, one row per record
pub fn encode(records: &[MeasurementRecord]) -> String {
    let mut out = String::with_capacity(HEADER.len() + 1 + records.len() * 48);
    out.push_str(HEADER);
    out.push('\n');
    for record in records {
        out.push_str(&encode_row(record));
        out.push('\n');
    }
    out
}

/// Render one record; absent values become empty cells
pub fn encode_row(record: &MeasurementRecord) -> String {
    format!(
        "{},{},{},{},{}",
        record.formatted_timestamp(),
        encode_cell(record.download_mbps),
        encode_cell(record.upload_mbps),
        encode_cell(record.ping_ms),
        encode_cell(record.jitter_ms),
    )
}

fn encode_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Parse a table produced by [`encode`]. Blank lines are ignored; an empty
/// input is an empty log. Anything else that does not match the layout is
/// reported as corrupt.
pub fn decode(content: &str) -> Result<Vec<MeasurementRecord>> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty());

    let (header_line, header) = match lines.next() {
        Some(first) => first,
        None => return Ok(Vec::new()),
    };

    if header.trim() != HEADER {
        return Err(AppError::storage_unavailable(format!(
            "Unrecognized log header on line {}: '{}'",
            header_line, header
        )));
    }

    lines.map(|(line_number, line)| decode_row(line_number, line)).collect()
}

fn decode_row(line_number: usize, line: &str) -> Result<MeasurementRecord> {
    let cells: Vec<&str> = line.split(',').map(str::trim).collect();
    if cells.len() != COLUMN_COUNT {
        return Err(AppError::storage_unavailable(format!(
            "Line {} has {} columns, expected {}",
            line_number,
            cells.len(),
            COLUMN_COUNT
        )));
    }

    let timestamp = NaiveDateTime::parse_from_str(cells[0], TIMESTAMP_FORMAT).map_err(|e| {
        AppError::storage_unavailable(format!("Line {}: invalid timestamp '{}': {}", line_number, cells[0], e))
    })?;

    Ok(MeasurementRecord::new(
        timestamp,
        decode_cell(line_number, "Download_Mbps", cells[1])?,
        decode_cell(line_number, "Upload_Mbps", cells[2])?,
        decode_cell(line_number, "Ping_ms", cells[3])?,
        decode_cell(line_number, "Jitter_ms", cells[4])?,
    ))
}

fn decode_cell(line_number: usize, column: &str, cell: &str) -> Result<Option<f64>> {
    if cell.is_empty() {
        return Ok(None);
    }

    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(AppError::storage_unavailable(format!(
            "Line {}: invalid {} value '{}'",
            line_number, column, cell
        ))),
    }
}
