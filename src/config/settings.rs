//! Configuration structures for LogLens

use crate::{LogLensError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Host discovery settings
    #[serde(default)]
    pub discovery: DiscoverySettings,
    /// Store cache settings
    #[serde(default)]
    pub cache: CacheSettings,
    /// Analysis extraction settings
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

/// Host discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySettings {
    /// Base directories to scan for log files
    pub directories: Vec<PathBuf>,
    /// Recurse into subdirectories
    pub recursive: bool,
    /// Filename patterns a file must match to be picked up
    pub include_patterns: Vec<String>,
    /// Filename patterns that exclude a file even when included
    pub exclude_patterns: Vec<String>,
    /// Files larger than this many bytes are skipped unread
    pub max_file_size: u64,
    /// How discovered files are grouped into hosts
    pub host_detection: HostDetection,
}

/// Strategy for grouping discovered files into hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostDetection {
    /// File stem names the host
    Filename,
    /// Containing directory names the host
    Directory,
    /// Directory name when the file lives in its own subdirectory, else file stem
    Auto,
}

/// Store cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Seconds before a cached store is considered stale; 0 disables expiry
    pub refresh_seconds: u64,
}

/// Analysis extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Maximum number of raw lines handed to the analysis boundary
    pub max_lines: usize,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            directories: vec![PathBuf::from("./logs")],
            recursive: false,
            include_patterns: vec!["*.log".to_string(), "*.txt".to_string()],
            exclude_patterns: vec![
                "*.gz".to_string(),
                "*.zip".to_string(),
                "*backup*".to_string(),
                "*.bak".to_string(),
            ],
            max_file_size: 100 * 1024 * 1024, // 100MB
            host_detection: HostDetection::Filename,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { refresh_seconds: 60 }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self { max_lines: 50 }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LogLensError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| LogLensError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.discovery.directories.is_empty() {
            return Err(LogLensError::Config(
                "At least one log directory must be configured".to_string(),
            ));
        }
        if self.discovery.include_patterns.is_empty() {
            return Err(LogLensError::Config(
                "Include patterns cannot be empty".to_string(),
            ));
        }
        if self.discovery.max_file_size == 0 {
            return Err(LogLensError::Config(
                "Maximum file size must be greater than zero".to_string(),
            ));
        }
        for dir in &self.discovery.directories {
            if !dir.exists() {
                warn!("Log directory does not exist: {}", dir.display());
            }
        }
        Ok(())
    }

    /// Override settings from environment variables.
    ///
    /// `LOGLENS_DIRECTORIES` is a comma-separated directory list;
    /// `LOGLENS_RECURSIVE` is `true` or `false`. Unparseable values are
    /// ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dirs) = std::env::var("LOGLENS_DIRECTORIES") {
            let parsed: Vec<PathBuf> = dirs
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(PathBuf::from)
                .collect();
            if parsed.is_empty() {
                warn!("LOGLENS_DIRECTORIES is set but empty, keeping configured directories");
            } else {
                self.discovery.directories = parsed;
            }
        }

        if let Ok(recursive) = std::env::var("LOGLENS_RECURSIVE") {
            match recursive.to_lowercase().as_str() {
                "true" => self.discovery.recursive = true,
                "false" => self.discovery.recursive = false,
                other => warn!("Invalid LOGLENS_RECURSIVE value: {}", other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.discovery.directories, vec![PathBuf::from("./logs")]);
        assert!(!config.discovery.recursive);
        assert_eq!(config.discovery.include_patterns, vec!["*.log", "*.txt"]);
        assert_eq!(config.discovery.max_file_size, 100 * 1024 * 1024);
        assert_eq!(config.discovery.host_detection, HostDetection::Filename);
        assert_eq!(config.cache.refresh_seconds, 60);
        assert_eq!(config.analysis.max_lines, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_empty_directories() {
        let mut config = Config::default();
        config.discovery.directories.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_max_file_size() {
        let mut config = Config::default();
        config.discovery.max_file_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let toml_src = r#"
            [discovery]
            directories = ["/var/log/hosts"]
            recursive = true
            include_patterns = ["*.log"]
            exclude_patterns = []
            max_file_size = 1048576
            host_detection = "auto"
        "#;
        let config: Config = toml::from_str(toml_src).unwrap();
        assert_eq!(
            config.discovery.directories,
            vec![PathBuf::from("/var/log/hosts")]
        );
        assert!(config.discovery.recursive);
        assert_eq!(config.discovery.host_detection, HostDetection::Auto);
        // Sections absent from the file fall back to defaults
        assert_eq!(config.cache.refresh_seconds, 60);
        assert_eq!(config.analysis.max_lines, 50);
    }
}
