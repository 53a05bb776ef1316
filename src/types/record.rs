//! Log record types and utilities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Log severity levels recognized in raw log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Info: informational messages
    Info,
    /// Warn: warning conditions
    Warn,
    /// Error: error conditions
    Error,
    /// Unknown: no recognizable level token on the line
    Unknown,
}

impl LogLevel {
    /// Match a whitespace-delimited token against the recognized levels.
    ///
    /// The comparison is case-sensitive: `"info"` and `"Warning"` are not
    /// level tokens.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "INFO" => Some(LogLevel::Info),
            "WARN" => Some(LogLevel::Warn),
            "ERROR" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// One normalized log line
///
/// `raw` preserves the original line verbatim and is never mutated after
/// the record is created; every other field is derived from it. Optional
/// textual fields hold the empty string rather than an absent value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Parsed timestamp, `None` when no supported shape matched
    pub timestamp: Option<DateTime<Utc>>,

    /// Severity level detected on the line
    pub level: LogLevel,

    /// Short source identifier (stem of the file the line came from)
    pub service: String,

    /// Process or unit name, empty when the line carried none
    pub process: String,

    /// Remaining free text
    pub message: String,

    /// Original line, preserved verbatim
    pub raw: String,
}

impl LogRecord {
    /// Create a record carrying nothing but the raw line.
    ///
    /// Used when no timestamp shape matches; the whole line becomes the
    /// message.
    pub fn raw_only(line: &str, level: LogLevel) -> Self {
        Self {
            timestamp: None,
            level,
            service: String::new(),
            process: String::new(),
            message: line.to_string(),
            raw: line.to_string(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
