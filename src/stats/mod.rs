//! Windowed statistics over a host's records
//!
//! Totals and level counts cover the whole store; the filtered values and
//! the time series are restricted to the requested [`TimeWindow`].
//! Records without a parseable timestamp count toward the all-time totals
//! but never toward a bounded window or any series bucket.
//!
//! Series buckets are contiguous and gap-free: every interval between the
//! window start and "now" appears exactly once, in chronological order,
//! zero counts included, so charts render without holes.

use crate::store::LogStore;
use crate::types::{LevelCounts, LogLevel, LogRecord, StatsResult, TimeBucket, TimeWindow};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Maximum buckets in a returned series; longer series are stride-sampled.
const MAX_SERIES_POINTS: usize = 100;

/// Bucket width and label format for a series
struct BucketSpec {
    width: Duration,
    label_format: &'static str,
}

fn spec_for_window(window: TimeWindow) -> BucketSpec {
    match window {
        TimeWindow::LastHour => BucketSpec {
            width: Duration::minutes(1),
            label_format: "%H:%M",
        },
        TimeWindow::LastDay => BucketSpec {
            width: Duration::hours(1),
            label_format: "%m/%d %H:00",
        },
        TimeWindow::LastWeek | TimeWindow::LastMonth | TimeWindow::AllTime => BucketSpec {
            width: Duration::days(1),
            label_format: "%m/%d",
        },
    }
}

/// Bucket width for the all-time series, sized to the data span.
fn spec_for_span(span: Duration) -> BucketSpec {
    if span <= Duration::hours(1) {
        BucketSpec {
            width: Duration::minutes(1),
            label_format: "%H:%M",
        }
    } else if span <= Duration::days(1) {
        BucketSpec {
            width: Duration::hours(1),
            label_format: "%m/%d %H:00",
        }
    } else {
        BucketSpec {
            width: Duration::days(1),
            label_format: "%m/%d",
        }
    }
}

/// Aggregate statistics for a store, evaluated at the current instant.
pub fn aggregate(store: &LogStore, window: TimeWindow) -> StatsResult {
    aggregate_at(store, window, Utc::now())
}

/// Aggregate statistics for a store, evaluated at an explicit instant.
///
/// Pure with respect to its inputs, which keeps window arithmetic
/// testable without a clock.
pub fn aggregate_at(store: &LogStore, window: TimeWindow, now: DateTime<Utc>) -> StatsResult {
    let mut levels = LevelCounts::default();
    for record in store.records() {
        levels.record(record.level);
    }
    let total = store.len() as u64;

    match window.start_from(now) {
        // All-time: the filtered values equal the unfiltered ones by
        // definition; recomputing them would double-count records with
        // unparseable timestamps.
        None => StatsResult {
            total,
            levels,
            filtered_total: total,
            filtered_levels: levels,
            time_series: all_time_series(store),
        },
        Some(start) => {
            let filtered: Vec<&LogRecord> = store
                .records()
                .iter()
                .filter(|r| r.timestamp.map_or(false, |ts| ts >= start))
                .collect();

            let mut filtered_levels = LevelCounts::default();
            for record in &filtered {
                filtered_levels.record(record.level);
            }

            let has_parseable = store.records().iter().any(|r| r.timestamp.is_some());
            let time_series = if has_parseable {
                build_series(&filtered, start, now, &spec_for_window(window))
            } else {
                Vec::new()
            };

            StatsResult {
                total,
                levels,
                filtered_total: filtered.len() as u64,
                filtered_levels,
                time_series,
            }
        }
    }
}

/// Series over the full data span, bucket width sized to that span.
fn all_time_series(store: &LogStore) -> Vec<TimeBucket> {
    let timestamps: Vec<DateTime<Utc>> =
        store.records().iter().filter_map(|r| r.timestamp).collect();

    let (first, last) = match (timestamps.iter().min(), timestamps.iter().max()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Vec::new(),
    };

    let with_timestamp: Vec<&LogRecord> = store
        .records()
        .iter()
        .filter(|r| r.timestamp.is_some())
        .collect();

    build_series(&with_timestamp, first, last, &spec_for_span(last - first))
}

/// Build a zero-filled bucket series from `start` through `end` and count
/// the given records into it. Records whose label falls outside the range
/// are dropped from the series (they still count toward the filtered
/// totals upstream).
fn build_series(
    records: &[&LogRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    spec: &BucketSpec,
) -> Vec<TimeBucket> {
    let mut buckets = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut cursor = start;
    while cursor <= end {
        let label = cursor.format(spec.label_format).to_string();
        index.entry(label.clone()).or_insert(buckets.len());
        buckets.push(TimeBucket::empty(label));
        cursor += spec.width;
    }

    for record in records {
        let ts = match record.timestamp {
            Some(ts) => ts,
            None => continue,
        };
        let label = ts.format(spec.label_format).to_string();
        if let Some(&i) = index.get(&label) {
            match record.level {
                LogLevel::Info => buckets[i].info += 1,
                LogLevel::Warn => buckets[i].warn += 1,
                LogLevel::Error => buckets[i].error += 1,
                LogLevel::Unknown => {}
            }
        }
    }

    downsample(buckets)
}

/// Keep at most [`MAX_SERIES_POINTS`] buckets by stride sampling.
fn downsample(buckets: Vec<TimeBucket>) -> Vec<TimeBucket> {
    if buckets.len() <= MAX_SERIES_POINTS {
        return buckets;
    }
    let step = (buckets.len() / MAX_SERIES_POINTS).max(1);
    buckets.into_iter().step_by(step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::LineParser;
    use chrono::TimeZone;

    fn store_from_lines(lines: &[&str]) -> LogStore {
        let parser = LineParser::with_default_year(2024);
        let records = lines.iter().map(|l| parser.parse(l)).collect();
        LogStore::from_records("test", records)
    }

    fn mixed_scenario_store() -> LogStore {
        store_from_lines(&[
            "2024-01-15 10:00:00 INFO svc: ok",
            "2024-01-15 10:00:05 ERROR svc: fail",
            "garbage line no timestamp",
        ])
    }

    #[test]
    fn totals_ignore_the_window() {
        let store = mixed_scenario_store();
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let stats = aggregate_at(&store, TimeWindow::LastHour, now);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.levels.info, 1);
        assert_eq!(stats.levels.error, 1);
        assert_eq!(stats.levels.unknown, 1);
    }

    #[test]
    fn level_sums_equal_totals() {
        let store = mixed_scenario_store();
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        for window in [
            TimeWindow::LastHour,
            TimeWindow::LastDay,
            TimeWindow::LastWeek,
            TimeWindow::LastMonth,
            TimeWindow::AllTime,
        ] {
            let stats = aggregate_at(&store, window, now);
            assert_eq!(stats.levels.sum(), stats.total);
            assert_eq!(stats.filtered_levels.sum(), stats.filtered_total);
            assert!(stats.filtered_total <= stats.total);
        }
    }

    #[test]
    fn all_time_filtered_values_equal_unfiltered() {
        let store = mixed_scenario_store();
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let stats = aggregate_at(&store, TimeWindow::AllTime, now);
        assert_eq!(stats.filtered_total, stats.total);
        assert_eq!(stats.filtered_levels, stats.levels);
        // The garbage record counts toward the all-time totals.
        assert_eq!(stats.filtered_total, 3);
    }

    #[test]
    fn bounded_window_excludes_unparseable_timestamps() {
        let store = mixed_scenario_store();
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let stats = aggregate_at(&store, TimeWindow::LastHour, now);
        assert_eq!(stats.filtered_total, 2);
        assert_eq!(stats.filtered_levels.info, 1);
        assert_eq!(stats.filtered_levels.error, 1);
        assert_eq!(stats.filtered_levels.unknown, 0);

        let populated: Vec<&TimeBucket> = stats
            .time_series
            .iter()
            .filter(|b| b.info + b.warn + b.error > 0)
            .collect();
        assert_eq!(populated.len(), 1);
        assert_eq!(populated[0].label, "10:00");
        assert_eq!(populated[0].info, 1);
        assert_eq!(populated[0].error, 1);
    }

    #[test]
    fn last_hour_series_is_contiguous_and_gap_free() {
        let store = mixed_scenario_store();
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let stats = aggregate_at(&store, TimeWindow::LastHour, now);

        // One bucket per minute from 09:30 through 10:30 inclusive.
        assert_eq!(stats.time_series.len(), 61);
        assert_eq!(stats.time_series.first().unwrap().label, "09:30");
        assert_eq!(stats.time_series.last().unwrap().label, "10:30");

        let labels: Vec<&str> = stats.time_series.iter().map(|b| b.label.as_str()).collect();
        let mut sorted = labels.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), labels.len(), "every label appears exactly once");
    }

    #[test]
    fn last_day_series_uses_hour_buckets() {
        let store = store_from_lines(&["2024-01-15 08:15:00 WARN svc: w"]);
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let stats = aggregate_at(&store, TimeWindow::LastDay, now);
        assert_eq!(stats.time_series.len(), 25);
        let bucket = stats
            .time_series
            .iter()
            .find(|b| b.label == "01/15 08:00")
            .unwrap();
        assert_eq!(bucket.warn, 1);
    }

    #[test]
    fn zero_parseable_timestamps_yield_empty_series() {
        let store = store_from_lines(&["nothing here", "still nothing"]);
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        for window in [TimeWindow::LastHour, TimeWindow::AllTime] {
            let stats = aggregate_at(&store, window, now);
            assert!(stats.time_series.is_empty());
            assert_eq!(stats.total, 2);
        }
        let bounded = aggregate_at(&store, TimeWindow::LastHour, now);
        assert_eq!(bounded.filtered_total, 0);
    }

    #[test]
    fn empty_store_yields_empty_stats() {
        let store = LogStore::empty("ghost");
        let stats = aggregate_at(
            &store,
            TimeWindow::LastWeek,
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
        );
        assert_eq!(stats, StatsResult::empty());
    }

    #[test]
    fn all_time_series_spans_the_data() {
        let store = store_from_lines(&[
            "2024-01-10 00:00:00 INFO svc: a",
            "2024-01-12 00:00:00 ERROR svc: b",
        ]);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let stats = aggregate_at(&store, TimeWindow::AllTime, now);
        let labels: Vec<&str> = stats.time_series.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["01/10", "01/11", "01/12"]);
        assert_eq!(stats.time_series[0].info, 1);
        assert_eq!(stats.time_series[1].info + stats.time_series[1].error, 0);
        assert_eq!(stats.time_series[2].error, 1);
    }

    #[test]
    fn all_time_short_span_uses_minute_buckets() {
        let store = store_from_lines(&[
            "2024-01-15 10:00:00 INFO svc: a",
            "2024-01-15 10:05:00 INFO svc: b",
        ]);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let stats = aggregate_at(&store, TimeWindow::AllTime, now);
        assert_eq!(stats.time_series.len(), 6);
        assert_eq!(stats.time_series.first().unwrap().label, "10:00");
        assert_eq!(stats.time_series.last().unwrap().label, "10:05");
    }

    #[test]
    fn records_after_now_count_but_do_not_chart() {
        let store = store_from_lines(&[
            "2024-01-15 10:00:00 INFO svc: in range",
            "2024-01-15 11:00:00 INFO svc: future",
        ]);
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let stats = aggregate_at(&store, TimeWindow::LastHour, now);
        assert_eq!(stats.filtered_total, 2);
        let charted: u64 = stats.time_series.iter().map(|b| b.info).sum();
        assert_eq!(charted, 1);
    }

    #[test]
    fn long_series_downsample_to_at_most_100_points() {
        let store = store_from_lines(&[
            "2023-01-01 00:00:00 INFO svc: old",
            "2024-01-01 00:00:00 INFO svc: new",
        ]);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let stats = aggregate_at(&store, TimeWindow::AllTime, now);
        assert!(stats.time_series.len() <= 2 * MAX_SERIES_POINTS);
        assert!(stats.time_series.len() >= MAX_SERIES_POINTS / 2);
    }
}
