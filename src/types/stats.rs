//! Aggregate statistics result types

use crate::types::LogLevel;
use serde::{Deserialize, Serialize};

/// Per-level record counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    /// INFO records
    #[serde(rename = "INFO")]
    pub info: u64,
    /// WARN records
    #[serde(rename = "WARN")]
    pub warn: u64,
    /// ERROR records
    #[serde(rename = "ERROR")]
    pub error: u64,
    /// Records with no recognized level
    #[serde(rename = "UNKNOWN")]
    pub unknown: u64,
}

impl LevelCounts {
    /// Count one record of the given level
    pub fn record(&mut self, level: LogLevel) {
        match level {
            LogLevel::Info => self.info += 1,
            LogLevel::Warn => self.warn += 1,
            LogLevel::Error => self.error += 1,
            LogLevel::Unknown => self.unknown += 1,
        }
    }

    /// Sum over all levels
    pub fn sum(&self) -> u64 {
        self.info + self.warn + self.error + self.unknown
    }
}

/// One fixed interval of a statistics time series
///
/// Buckets are emitted for every interval in the window, zero counts
/// included, so charts render without gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBucket {
    /// Interval label, formatted for chart axes
    pub label: String,
    /// INFO records in the interval
    pub info: u64,
    /// WARN records in the interval
    pub warn: u64,
    /// ERROR records in the interval
    pub error: u64,
}

impl TimeBucket {
    /// Create an empty bucket with the given label
    pub fn empty(label: String) -> Self {
        Self {
            label,
            info: 0,
            warn: 0,
            error: 0,
        }
    }
}

/// Statistics for one host over a requested time window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResult {
    /// Record count over the entire store, window ignored
    pub total: u64,
    /// Per-level counts over the entire store
    pub levels: LevelCounts,
    /// Record count restricted to the window
    pub filtered_total: u64,
    /// Per-level counts restricted to the window
    pub filtered_levels: LevelCounts,
    /// Chronological, gap-free bucket series for the window
    pub time_series: Vec<TimeBucket>,
}

impl StatsResult {
    /// Result for an empty or unknown host
    pub fn empty() -> Self {
        Self {
            total: 0,
            levels: LevelCounts::default(),
            filtered_total: 0,
            filtered_levels: LevelCounts::default(),
            time_series: Vec::new(),
        }
    }
}
