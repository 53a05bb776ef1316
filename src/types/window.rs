//! Relative time windows used to scope statistics

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Enumerated relative time range for statistics queries
///
/// A window's start instant is computed from "now" at query time. Records
/// without a parseable timestamp are excluded from every bounded window but
/// still count toward all-time totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeWindow {
    /// The last 60 minutes
    LastHour,
    /// The last 24 hours
    LastDay,
    /// The last 7 days
    LastWeek,
    /// The last 30 days
    LastMonth,
    /// No lower bound on timestamp
    AllTime,
}

impl TimeWindow {
    /// Start instant of the window relative to `now`.
    ///
    /// `None` means the window is unbounded.
    pub fn start_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeWindow::LastHour => Some(now - Duration::hours(1)),
            TimeWindow::LastDay => Some(now - Duration::days(1)),
            TimeWindow::LastWeek => Some(now - Duration::weeks(1)),
            TimeWindow::LastMonth => Some(now - Duration::days(30)),
            TimeWindow::AllTime => None,
        }
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(TimeWindow::LastHour),
            "1d" => Ok(TimeWindow::LastDay),
            "1w" => Ok(TimeWindow::LastWeek),
            "1m" => Ok(TimeWindow::LastMonth),
            "all" => Ok(TimeWindow::AllTime),
            other => Err(format!(
                "unknown time window '{}', expected 1h, 1d, 1w, 1m or all",
                other
            )),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeWindow::LastHour => write!(f, "1h"),
            TimeWindow::LastDay => write!(f, "1d"),
            TimeWindow::LastWeek => write!(f, "1w"),
            TimeWindow::LastMonth => write!(f, "1m"),
            TimeWindow::AllTime => write!(f, "all"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn start_instants_are_deterministic() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();

        assert_eq!(
            TimeWindow::LastHour.start_from(now),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 11, 0, 0).unwrap())
        );
        assert_eq!(
            TimeWindow::LastDay.start_from(now),
            Some(Utc.with_ymd_and_hms(2024, 1, 14, 12, 0, 0).unwrap())
        );
        assert_eq!(
            TimeWindow::LastWeek.start_from(now),
            Some(Utc.with_ymd_and_hms(2024, 1, 8, 12, 0, 0).unwrap())
        );
        assert_eq!(
            TimeWindow::LastMonth.start_from(now),
            Some(Utc.with_ymd_and_hms(2023, 12, 16, 12, 0, 0).unwrap())
        );
        assert_eq!(TimeWindow::AllTime.start_from(now), None);
    }

    #[test]
    fn parses_wire_tokens() {
        assert_eq!("1h".parse::<TimeWindow>().unwrap(), TimeWindow::LastHour);
        assert_eq!("1d".parse::<TimeWindow>().unwrap(), TimeWindow::LastDay);
        assert_eq!("1w".parse::<TimeWindow>().unwrap(), TimeWindow::LastWeek);
        assert_eq!("1m".parse::<TimeWindow>().unwrap(), TimeWindow::LastMonth);
        assert_eq!("all".parse::<TimeWindow>().unwrap(), TimeWindow::AllTime);
        assert!("2h".parse::<TimeWindow>().is_err());
    }
}
