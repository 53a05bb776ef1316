//! # LogLens - Flat-File Log Ingestion and Statistics
//!
//! LogLens is the ingestion, normalization and statistics core of a log
//! management system. It reads heterogeneous, loosely-structured log files
//! produced by different hosts and tools, parses them into a uniform record
//! model, and answers three classes of query: host listing, filtered and
//! paginated log retrieval, and time-windowed aggregate statistics.
//!
//! ## Features
//!
//! - **Mixed-Format Parsing**: ISO 8601, syslog and plain timestamp shapes
//!   in the same file; unparseable lines degrade to raw records
//! - **Host Discovery**: configurable directories, glob filters and
//!   grouping strategies with deterministic ordering
//! - **Read-Mostly Caching**: per-host stores behind a TTL cache; rebuilds
//!   never block unrelated hosts
//! - **Windowed Statistics**: level counts and gap-free bucketed time series
//!
//! ## Quick Start
//!
//! ```no_run
//! use loglens::config::Config;
//! use loglens::engine::LogEngine;
//! use loglens::types::TimeWindow;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/loglens.toml")?;
//!     let engine = LogEngine::new(config)?;
//!
//!     for host in engine.list_hosts() {
//!         let stats = engine.get_stats(&host, TimeWindow::LastHour).await;
//!         println!("{}: {} records", host, stats.total);
//!     }
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod engine;
pub mod parser;
pub mod query;
pub mod registry;
pub mod stats;
pub mod store;
pub mod types;

/// Common error types used throughout LogLens
pub mod error {
    use std::fmt;

    /// LogLens error types
    #[derive(Debug)]
    pub enum LogLensError {
        /// I/O operation failed
        Io(std::io::Error),
        /// Serialization/deserialization failed
        Serde(serde_json::Error),
        /// Configuration error
        Config(String),
        /// Host discovery error
        Discovery(String),
        /// External analysis boundary failed
        Analysis(String),
        /// External translation boundary failed
        Translation(String),
    }

    impl fmt::Display for LogLensError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                LogLensError::Io(e) => write!(f, "I/O error: {}", e),
                LogLensError::Serde(e) => write!(f, "Serialization error: {}", e),
                LogLensError::Config(e) => write!(f, "Configuration error: {}", e),
                LogLensError::Discovery(e) => write!(f, "Discovery error: {}", e),
                LogLensError::Analysis(e) => write!(f, "Analysis error: {}", e),
                LogLensError::Translation(e) => write!(f, "Translation error: {}", e),
            }
        }
    }

    impl std::error::Error for LogLensError {}

    impl From<std::io::Error> for LogLensError {
        fn from(err: std::io::Error) -> Self {
            LogLensError::Io(err)
        }
    }

    impl From<serde_json::Error> for LogLensError {
        fn from(err: serde_json::Error) -> Self {
            LogLensError::Serde(err)
        }
    }

    /// Result type alias for LogLens operations
    pub type Result<T> = std::result::Result<T, LogLensError>;
}

pub use error::{LogLensError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::engine::LogEngine;
    pub use crate::query::{LogFilter, QueryOptions, QueryPage};
    pub use crate::types::{LogLevel, LogRecord, StatsResult, TimeWindow};
    pub use crate::{LogLensError, Result};
}
