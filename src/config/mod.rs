//! Configuration management for LogLens

pub mod settings;

pub use settings::{
    AnalysisSettings, CacheSettings, Config, DiscoverySettings, HostDetection,
};
