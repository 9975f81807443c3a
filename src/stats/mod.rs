//! Statistics over latency samples and the measurement history

use crate::models::{round2, MeasurementRecord};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Ping and jitter derived from repeated round-trip probes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    /// Mean round-trip time (milliseconds)
    pub ping_ms: Option<f64>,
    /// Sample standard deviation of the round-trip times (milliseconds)
    pub jitter_ms: Option<f64>,
    /// Number of probes that produced a sample
    pub sample_count: usize,
}

impl LatencySummary {
    /// Derive ping and jitter from latency samples in milliseconds.
    ///
    /// Two or more samples give the mean and the sample standard deviation
    /// (n - 1 denominator). A single sample is reported as-is with a jitter of
    /// exactly zero. Without samples both values are absent.
    pub fn from_samples(samples: &[f64]) -> Self {
        match samples.len() {
            0 => Self {
                ping_ms: None,
                jitter_ms: None,
                sample_count: 0,
            },
            1 => Self {
                ping_ms: Some(round2(samples[0])),
                jitter_ms: Some(0.0),
                sample_count: 1,
            },
            count => {
                let mean = samples.iter().sum::<f64>() / count as f64;
                let sum_squared_diff: f64 = samples.iter().map(|&x| (x - mean).powi(2)).sum();
                let std_dev = (sum_squared_diff / (count - 1) as f64).sqrt();

                Self {
                    ping_ms: Some(round2(mean)),
                    jitter_ms: Some(round2(std_dev)),
                    sample_count: count,
                }
            }
        }
    }
}

/// Mean, minimum and maximum over the present values of one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl ColumnStats {
    fn from_values(values: impl Iterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        if count == 0 {
            return None;
        }

        Some(Self {
            mean: round2(sum / count as f64),
            min,
            max,
            count,
        })
    }
}

/// Aggregate view of a device's measurement log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub total_records: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
    pub download: Option<ColumnStats>,
    pub upload: Option<ColumnStats>,
    pub ping: Option<ColumnStats>,
}

impl HistorySummary {
    pub fn from_records(records: &[MeasurementRecord]) -> Self {
        Self {
            total_records: records.len(),
            first_timestamp: records.first().map(|r| r.timestamp),
            last_timestamp: records.last().map(|r| r.timestamp),
            download: ColumnStats::from_values(records.iter().filter_map(|r| r.download_mbps)),
            upload: ColumnStats::from_values(records.iter().filter_map(|r| r.upload_mbps)),
            ping: ColumnStats::from_values(records.iter().filter_map(|r| r.ping_ms)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }
}

/// A single (time, value) point of a chart series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Download and upload throughput over time, time on the x-axis
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartSeries {
    pub download: Vec<ChartPoint>,
    pub upload: Vec<ChartPoint>,
}

impl ChartSeries {
    /// Build both series; a record missing a value is skipped for that series only
    pub fn from_records(records: &[MeasurementRecord]) -> Self {
        let points = |value: fn(&MeasurementRecord) -> Option<f64>| -> Vec<ChartPoint> {
            records
                .iter()
                .filter_map(|r| value(r).map(|v| ChartPoint { timestamp: r.timestamp, value: v }))
                .collect()
        };

        Self {
            download: points(|r| r.download_mbps),
            upload: points(|r| r.upload_mbps),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.download.is_empty() && self.upload.is_empty()
    }

    pub fn download_values(&self) -> Vec<f64> {
        self.download.iter().map(|p| p.value).collect()
    }

    pub fn upload_values(&self) -> Vec<f64> {
        self.upload.iter().map(|p| p.value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(minute: u32, download: Option<f64>, upload: Option<f64>, ping: Option<f64>) -> MeasurementRecord {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, minute, 0)
            .unwrap();
        MeasurementRecord::new(ts, download, upload, ping, None)
    }

    #[test]
    fn test_latency_two_samples() {
        let summary = LatencySummary::from_samples(&[10.0, 12.0]);
        assert_eq!(summary.ping_ms, Some(11.0));
        let jitter = summary.jitter_ms.unwrap();
        assert!((jitter - 1.41).abs() < 0.005);
        assert_eq!(summary.sample_count, 2);
    }

    #[test]
    fn test_latency_single_sample_has_zero_jitter() {
        let summary = LatencySummary::from_samples(&[20.0]);
        assert_eq!(summary.ping_ms, Some(20.0));
        assert_eq!(summary.jitter_ms, Some(0.0));
    }

    #[test]
    fn test_latency_no_samples() {
        let summary = LatencySummary::from_samples(&[]);
        assert_eq!(summary.ping_ms, None);
        assert_eq!(summary.jitter_ms, None);
        assert_eq!(summary.sample_count, 0);
    }

    #[test]
    fn test_latency_uses_sample_standard_deviation() {
        // Population std dev would be 2.0; the sample std dev is sqrt(32/7)
        let samples = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let summary = LatencySummary::from_samples(&samples);
        assert_eq!(summary.ping_ms, Some(5.0));
        assert_eq!(summary.jitter_ms, Some(2.14));
    }

    #[test]
    fn test_history_summary() {
        let records = vec![
            record(0, Some(50.0), Some(10.0), Some(20.0)),
            record(5, Some(100.0), None, None),
            record(10, Some(75.0), Some(20.0), Some(30.0)),
        ];

        let summary = HistorySummary::from_records(&records);
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.first_timestamp, Some(records[0].timestamp));
        assert_eq!(summary.last_timestamp, Some(records[2].timestamp));

        let download = summary.download.unwrap();
        assert_eq!(download.mean, 75.0);
        assert_eq!(download.min, 50.0);
        assert_eq!(download.max, 100.0);
        assert_eq!(download.count, 3);

        let upload = summary.upload.unwrap();
        assert_eq!(upload.count, 2);
        assert_eq!(upload.mean, 15.0);

        assert_eq!(summary.ping.unwrap().mean, 25.0);
    }

    #[test]
    fn test_history_summary_empty() {
        let summary = HistorySummary::from_records(&[]);
        assert!(summary.is_empty());
        assert!(summary.download.is_none());
        assert!(summary.first_timestamp.is_none());
    }

    #[test]
    fn test_chart_series_skips_missing_values_per_series() {
        let records = vec![
            record(0, Some(50.0), Some(10.0), None),
            record(1, None, Some(11.0), None),
            record(2, Some(52.0), None, None),
        ];

        let chart = ChartSeries::from_records(&records);
        assert_eq!(chart.download_values(), vec![50.0, 52.0]);
        assert_eq!(chart.upload_values(), vec![10.0, 11.0]);
        assert_eq!(chart.download[1].timestamp, records[2].timestamp);
        assert!(!chart.is_empty());
        assert!(ChartSeries::from_records(&[]).is_empty());
    }
}
