//! Per-device measurement log
//!
//! Each device identity owns one table at
//! `<data_dir>/<identity>/speedtest_log.csv`. Appends rewrite the whole table
//! through a temporary file in the same directory that is renamed over the
//! old one, so a failed append never leaves a partially written table.
//!
//! There is no cross-process lock: two appends racing on the same identity
//! both succeed, and the later rename wins (one row is lost).

pub mod table;

use crate::error::{AppError, Result};
use crate::models::{Config, MeasurementRecord};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Identity used when a device name sanitizes to nothing usable
pub const FALLBACK_IDENTITY: &str = "unknown-device";

/// Make a device name safe to use as a single path component.
///
/// Letters, digits, `.`, `_` and `-` are kept; every other character becomes
/// `_`. Names that end up empty or made only of dots fall back to
/// [`FALLBACK_IDENTITY`].
pub fn sanitize_identity(raw: &str) -> String {
    let sanitized: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        FALLBACK_IDENTITY.to_string()
    } else {
        sanitized
    }
}

/// File-backed store of measurement records, partitioned by device identity
#[derive(Debug, Clone)]
pub struct LogStore {
    root: PathBuf,
}

impl LogStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.data_dir.clone())
    }

    /// Location of the table for `identity`
    pub fn table_path(&self, identity: &str) -> PathBuf {
        self.root
            .join(sanitize_identity(identity))
            .join(crate::defaults::LOG_FILE_NAME)
    }

    /// Read every record for `identity` in insertion order.
    ///
    /// A table that does not exist yet is an empty log.
    pub fn read_all(&self, identity: &str) -> Result<Vec<MeasurementRecord>> {
        let path = self.table_path(identity);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::storage_unavailable(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        table::decode(&content).map_err(|e| match e {
            AppError::StorageUnavailable(message) => {
                AppError::storage_unavailable(format!("{} is corrupt: {}", path.display(), message))
            }
            other => other,
        })
    }

    /// The last `n` records for `identity`, oldest first
    pub fn tail(&self, identity: &str, n: usize) -> Result<Vec<MeasurementRecord>> {
        let mut records = self.read_all(identity)?;
        let skip = records.len().saturating_sub(n);
        Ok(records.split_off(skip))
    }

    /// Append one record to the end of the log for `identity`, creating the
    /// directory and table on first use.
    ///
    /// Records holding a non-finite value are rejected before the table is
    /// touched, since they could not be read back.
    pub fn append(&self, identity: &str, record: &MeasurementRecord) -> Result<()> {
        check_finite(record)?;

        let mut records = self.read_all(identity)?;
        records.push(record.clone());
        self.write_all(identity, &records)
    }

    fn write_all(&self, identity: &str, records: &[MeasurementRecord]) -> Result<()> {
        let path = self.table_path(identity);
        let dir = match path.parent() {
            Some(dir) => dir,
            None => {
                return Err(AppError::storage_unavailable(format!(
                    "Log path has no parent directory: {}",
                    path.display()
                )))
            }
        };

        let storage_err = |action: &str, e: std::io::Error| {
            AppError::storage_unavailable(format!("Failed to {} {}: {}", action, dir.display(), e))
        };

        fs::create_dir_all(dir).map_err(|e| storage_err("create", e))?;

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| storage_err("write to", e))?;
        temp.write_all(table::encode(records).as_bytes())
            .map_err(|e| storage_err("write to", e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| storage_err("sync", e))?;

        temp.persist(&path).map_err(|e| {
            AppError::storage_unavailable(format!("Failed to replace {}: {}", path.display(), e.error))
        })?;

        Ok(())
    }
}

fn check_finite(record: &MeasurementRecord) -> Result<()> {
    let fields = [
        ("Download_Mbps", record.download_mbps),
        ("Upload_Mbps", record.upload_mbps),
        ("Ping_ms", record.ping_ms),
        ("Jitter_ms", record.jitter_ms),
    ];

    for (column, value) in fields {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(AppError::validation(format!("{} must be a finite number, got {}", column, v)));
            }
        }
    }
    Ok(())
}
