//! Line parser turning raw log lines into normalized records
//!
//! Mixed-format input is the steady state, not an error: the parser
//! recognizes three timestamp shapes and degrades to a raw-only record
//! when none of them match. Parsing never fails and never panics.
//!
//! Recognized timestamp shapes, in priority order:
//!
//! 1. ISO 8601 with `T` separator, optional fractional seconds and
//!    optional `Z`/`+HH:MM`/`+HHMM` offset: `2025-12-17T16:13:08+00:00`
//! 2. Syslog with leading year: `2025 Nov 26 14:23:30`; the year may be
//!    omitted (`Nov 26 14:23:30`), in which case the parser's default
//!    year applies
//! 3. Plain date-time: `2024-01-15 10:00:00`
//!
//! Offset-carrying timestamps are converted to UTC; naive ones are taken
//! as UTC so that the same wall-clock instant round-trips identically
//! across shapes.

use crate::types::{LogLevel, LogRecord};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use regex::Regex;

/// Three-letter month abbreviations accepted in syslog timestamps.
///
/// Lookup is case-sensitive and positional: `"Nov"` is month 11, `"nov"`
/// is not a month.
const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn month_number(abbreviation: &str) -> Option<u32> {
    MONTH_ABBREVIATIONS
        .iter()
        .position(|m| *m == abbreviation)
        .map(|i| i as u32 + 1)
}

/// Parser for raw log lines
///
/// Holds pre-compiled patterns; construct once and reuse across files.
pub struct LineParser {
    iso8601: Regex,
    syslog: Regex,
    plain: Regex,
    default_year: i32,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser {
    /// Create a parser whose year-less syslog timestamps default to the
    /// current year.
    pub fn new() -> Self {
        Self::with_default_year(Utc::now().year())
    }

    /// Create a parser with an explicit default year for year-less syslog
    /// timestamps.
    pub fn with_default_year(default_year: i32) -> Self {
        Self {
            iso8601: Regex::new(
                r"^(\d{4})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2})(\.\d+)?(Z|[+-]\d{2}:?\d{2})?(?:\s+|$)",
            )
            .expect("ISO 8601 pattern must compile"),
            syslog: Regex::new(
                r"^(?:(\d{4})\s+)?([A-Za-z]{3})\s+(\d{1,2})\s+(\d{2}):(\d{2}):(\d{2})(?:\s+|$)",
            )
            .expect("syslog pattern must compile"),
            plain: Regex::new(r"^(\d{4})-(\d{2})-(\d{2})\s+(\d{2}):(\d{2}):(\d{2})(?:\s+|$)")
                .expect("plain pattern must compile"),
            default_year,
        }
    }

    /// Parse one raw line into a record.
    ///
    /// Never fails: a line that parses as nothing but raw text still
    /// yields a valid record with `timestamp = None`. The `service` field
    /// is left empty; the store fills it from the source file.
    pub fn parse(&self, line: &str) -> LogRecord {
        let level = detect_level(line);

        let (timestamp, rest) = match self.parse_timestamp(line) {
            Some((ts, consumed)) => (Some(ts), &line[consumed..]),
            None => {
                // No timestamp shape matched: the entire line is the message.
                return LogRecord::raw_only(line, level);
            }
        };

        let (process, message) = extract_shape(rest);

        LogRecord {
            timestamp,
            level,
            service: String::new(),
            process,
            message,
            raw: line.to_string(),
        }
    }

    /// Try every timestamp shape in priority order.
    ///
    /// Returns the instant and the byte offset of the first character
    /// after the timestamp (trailing whitespace included).
    fn parse_timestamp(&self, line: &str) -> Option<(DateTime<Utc>, usize)> {
        self.parse_iso8601(line)
            .or_else(|| self.parse_syslog(line))
            .or_else(|| self.parse_plain(line))
    }

    fn parse_iso8601(&self, line: &str) -> Option<(DateTime<Utc>, usize)> {
        let caps = self.iso8601.captures(line)?;
        let end = caps.get(0)?.end();

        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        let hour: u32 = caps[4].parse().ok()?;
        let minute: u32 = caps[5].parse().ok()?;
        let second: u32 = caps[6].parse().ok()?;
        let nanos = caps.get(7).map(|m| frac_nanos(m.as_str())).unwrap_or(0);

        let naive = NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_nano_opt(hour, minute, second, nanos)?;

        let offset_seconds = match caps.get(8) {
            Some(m) => parse_offset(m.as_str())?,
            None => 0,
        };

        let utc = naive - Duration::seconds(offset_seconds);
        Some((Utc.from_utc_datetime(&utc), end))
    }

    fn parse_syslog(&self, line: &str) -> Option<(DateTime<Utc>, usize)> {
        let caps = self.syslog.captures(line)?;
        let end = caps.get(0)?.end();

        let year: i32 = match caps.get(1) {
            Some(m) => m.as_str().parse().ok()?,
            None => self.default_year,
        };
        let month = month_number(&caps[2])?;
        let day: u32 = caps[3].parse().ok()?;
        let hour: u32 = caps[4].parse().ok()?;
        let minute: u32 = caps[5].parse().ok()?;
        let second: u32 = caps[6].parse().ok()?;

        let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
        Some((Utc.from_utc_datetime(&naive), end))
    }

    fn parse_plain(&self, line: &str) -> Option<(DateTime<Utc>, usize)> {
        let caps = self.plain.captures(line)?;
        let end = caps.get(0)?.end();

        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        let hour: u32 = caps[4].parse().ok()?;
        let minute: u32 = caps[5].parse().ok()?;
        let second: u32 = caps[6].parse().ok()?;

        let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
        Some((Utc.from_utc_datetime(&naive), end))
    }
}

/// First whitespace-delimited token that case-sensitively equals a level
/// name decides the record's level; no such token means `Unknown`.
fn detect_level(line: &str) -> LogLevel {
    line.split_whitespace()
        .find_map(LogLevel::from_token)
        .unwrap_or(LogLevel::Unknown)
}

/// Extract `(process, message)` from the post-timestamp remainder.
///
/// Handles `LEVEL process: message`, the syslog `host process[pid]: message`
/// shape, and bare `process: message`. When nothing matches, the whole
/// remainder is the message and the process is empty.
fn extract_shape(rest: &str) -> (String, String) {
    let rest = rest.trim_start();

    // Skip a leading level token; the level itself was already detected.
    let after_level = match rest.split_whitespace().next() {
        Some(token) if LogLevel::from_token(token).is_some() => {
            rest[token.len()..].trim_start()
        }
        _ => rest,
    };

    let mut tokens = after_level.split_whitespace();
    let first = match tokens.next() {
        Some(t) => t,
        None => return (String::new(), String::new()),
    };

    if let Some(name) = first.strip_suffix(':') {
        let message = after_level[first.len()..].trim_start();
        return (strip_pid(name), message.to_string());
    }

    // Syslog convention: the first token is the originating host and the
    // second, colon-terminated one is the process.
    if let Some(second) = tokens.next() {
        if let Some(name) = second.strip_suffix(':') {
            let offset = after_level.find(second).unwrap_or(0) + second.len();
            let message = after_level[offset..].trim_start();
            return (strip_pid(name), message.to_string());
        }
    }

    (String::new(), after_level.to_string())
}

/// Strip a numeric `[pid]` suffix from a process name: `sshd[2224]` becomes
/// `sshd`. Non-numeric bracket content is left in place.
fn strip_pid(process: &str) -> String {
    if let Some(open) = process.rfind('[') {
        if let Some(inner) = process[open..].strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit()) {
                return process[..open].to_string();
            }
        }
    }
    process.to_string()
}

/// Fractional-second capture (`.123456`) to nanoseconds.
fn frac_nanos(frac: &str) -> u32 {
    let digits = &frac[1..];
    let mut nanos: u32 = 0;
    for (i, c) in digits.chars().take(9).enumerate() {
        nanos += c.to_digit(10).unwrap_or(0) * 10u32.pow(8 - i as u32);
    }
    nanos
}

/// Offset suffix (`Z`, `+09:00`, `-0530`) to seconds east of UTC.
fn parse_offset(offset: &str) -> Option<i64> {
    if offset == "Z" {
        return Some(0);
    }
    let sign = match offset.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let digits: String = offset[1..].chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 4 {
        return None;
    }
    let hours: i64 = digits[..2].parse().ok()?;
    let minutes: i64 = digits[2..].parse().ok()?;
    Some(sign * (hours * 3600 + minutes * 60))
}
