//! Filtering, sorting and pagination over a host's records
//!
//! Queries are read-only: they borrow a store's records and produce a
//! page of clones. Without an explicit sort the filtered set keeps the
//! store's file-appearance order; source files are not timestamp-sorted
//! and neither is the default query result.

use crate::store::LogStore;
use crate::types::{LogLevel, LogRecord};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Level restriction: everything, or one exact level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelFilter {
    /// No level restriction
    #[default]
    All,
    /// Records whose level equals the given one
    Exact(LogLevel),
}

impl FromStr for LevelFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL" => Ok(LevelFilter::All),
            "INFO" => Ok(LevelFilter::Exact(LogLevel::Info)),
            "WARN" => Ok(LevelFilter::Exact(LogLevel::Warn)),
            "ERROR" => Ok(LevelFilter::Exact(LogLevel::Error)),
            "UNKNOWN" => Ok(LevelFilter::Exact(LogLevel::Unknown)),
            other => Err(format!(
                "unknown level filter '{}', expected ALL, INFO, WARN, ERROR or UNKNOWN",
                other
            )),
        }
    }
}

/// Record filters; every populated filter must match (logical AND)
///
/// The text filters are case-insensitive substring matches, so the result
/// set is the same whatever order they are applied in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogFilter {
    /// Level restriction
    pub level: LevelFilter,
    /// Substring over `process`
    pub process: Option<String>,
    /// Substring over `service`
    pub service: Option<String>,
    /// Substring over `message`
    pub message: Option<String>,
}

impl LogFilter {
    /// Whether a record passes every populated filter
    pub fn matches(&self, record: &LogRecord) -> bool {
        if let LevelFilter::Exact(level) = self.level {
            if record.level != level {
                return false;
            }
        }
        contains_ci(&record.process, self.process.as_deref())
            && contains_ci(&record.service, self.service.as_deref())
            && contains_ci(&record.message, self.message.as_deref())
    }
}

fn contains_ci(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
    }
}

/// Sortable record fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    /// Parsed timestamp (RFC 3339 text; records without one sort first)
    Timestamp,
    /// Severity level name
    Level,
    /// Process name
    Process,
    /// Service name
    Service,
    /// Message text
    Message,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timestamp" => Ok(SortField::Timestamp),
            "level" => Ok(SortField::Level),
            "process" => Ok(SortField::Process),
            "service" => Ok(SortField::Service),
            "message" => Ok(SortField::Message),
            other => Err(format!("unknown sort field '{}'", other)),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest key first
    #[default]
    Ascending,
    /// Largest key first
    Descending,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Ascending),
            "desc" => Ok(SortDirection::Descending),
            other => Err(format!("unknown sort direction '{}', expected asc or desc", other)),
        }
    }
}

/// Query options: filters, optional sort, pagination slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Record filters
    pub filter: LogFilter,
    /// Sort field; `None` keeps file-appearance order
    pub sort_field: Option<SortField>,
    /// Direction used when `sort_field` is set
    pub sort_direction: SortDirection,
    /// Records to skip
    pub offset: usize,
    /// Maximum records in the page
    pub limit: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            filter: LogFilter::default(),
            sort_field: None,
            sort_direction: SortDirection::default(),
            offset: 0,
            limit: 100,
        }
    }
}

/// One page of query results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPage {
    /// Records in the page
    pub records: Vec<LogRecord>,
    /// Whether records beyond this page matched the filters
    pub has_more: bool,
}

impl QueryPage {
    /// Page with no records
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            has_more: false,
        }
    }
}

/// Run a query against a store.
///
/// Filters are AND-combined; an optional stable sort orders the filtered
/// set by the case-insensitive string representation of the chosen field;
/// `offset`/`limit` slice the result. `has_more` is true when records
/// matched beyond the returned slice.
pub fn run(store: &LogStore, options: &QueryOptions) -> QueryPage {
    let selected: Vec<&LogRecord> = store
        .records()
        .iter()
        .filter(|record| options.filter.matches(record))
        .collect();

    let selected = match options.sort_field {
        Some(field) => sort_stable(selected, field, options.sort_direction),
        None => selected,
    };

    let filtered_count = selected.len();
    let records: Vec<LogRecord> = selected
        .into_iter()
        .skip(options.offset)
        .take(options.limit)
        .cloned()
        .collect();

    QueryPage {
        records,
        has_more: options.offset.saturating_add(options.limit) < filtered_count,
    }
}

/// Stable sort in either direction: ties keep their filtered order.
fn sort_stable(
    selected: Vec<&LogRecord>,
    field: SortField,
    direction: SortDirection,
) -> Vec<&LogRecord> {
    let mut keyed: Vec<(String, &LogRecord)> = selected
        .into_iter()
        .map(|record| (sort_key(record, field), record))
        .collect();
    match direction {
        SortDirection::Ascending => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
        SortDirection::Descending => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
    }
    keyed.into_iter().map(|(_, record)| record).collect()
}

fn sort_key(record: &LogRecord, field: SortField) -> String {
    match field {
        SortField::Timestamp => record
            .timestamp
            .map(|ts| ts.to_rfc3339())
            .unwrap_or_default(),
        SortField::Level => record.level.to_string().to_lowercase(),
        SortField::Process => record.process.to_lowercase(),
        SortField::Service => record.service.to_lowercase(),
        SortField::Message => record.message.to_lowercase(),
    }
}
