//! Host discovery over configured log directories
//!
//! Discovery walks the configured base directories, applies include and
//! exclude glob filters, and groups the surviving files into hosts. The
//! result is an immutable snapshot published through [`arc_swap::ArcSwap`]:
//! readers always see either the previous complete snapshot or the new
//! complete one, never an intermediate state.
//!
//! Ordering is deterministic: host names are lexicographically sorted, as
//! is each host's file list, so two discoveries over an unchanged tree
//! return identical results.

use crate::config::{DiscoverySettings, HostDetection};
use arc_swap::ArcSwap;
use glob::Pattern;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One complete discovery result
///
/// Maps host name to that host's files, both in sorted order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistrySnapshot {
    hosts: BTreeMap<String, Vec<PathBuf>>,
}

impl RegistrySnapshot {
    /// Host names in lexicographic order
    pub fn host_names(&self) -> Vec<String> {
        self.hosts.keys().cloned().collect()
    }

    /// File paths backing a host, sorted; empty for unknown hosts
    pub fn files_for(&self, host: &str) -> Vec<PathBuf> {
        self.hosts.get(host).cloned().unwrap_or_default()
    }

    /// Whether the snapshot knows the host
    pub fn contains(&self, host: &str) -> bool {
        self.hosts.contains_key(host)
    }
}

/// Host registry backed by filesystem discovery
pub struct HostRegistry {
    settings: DiscoverySettings,
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    snapshot: ArcSwap<RegistrySnapshot>,
}

impl HostRegistry {
    /// Create a registry and run the initial discovery.
    ///
    /// Malformed glob patterns are dropped with a warning rather than
    /// failing the whole registry.
    pub fn new(settings: DiscoverySettings) -> Self {
        let include = compile_patterns(&settings.include_patterns);
        let exclude = compile_patterns(&settings.exclude_patterns);

        let registry = Self {
            settings,
            include,
            exclude,
            snapshot: ArcSwap::from_pointee(RegistrySnapshot::default()),
        };
        registry.refresh();
        registry
    }

    /// Current snapshot; cheap to call from any number of readers.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.snapshot.load_full()
    }

    /// Host names in lexicographic order
    pub fn list_hosts(&self) -> Vec<String> {
        self.snapshot.load().host_names()
    }

    /// File paths backing a host; empty for unknown hosts
    pub fn resolve(&self, host: &str) -> Vec<PathBuf> {
        self.snapshot.load().files_for(host)
    }

    /// Re-run discovery and atomically publish the new snapshot.
    pub fn refresh(&self) {
        let snapshot = self.discover();
        debug!(hosts = snapshot.hosts.len(), "host discovery complete");
        self.snapshot.store(Arc::new(snapshot));
    }

    fn discover(&self) -> RegistrySnapshot {
        let mut hosts: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

        for base_dir in &self.settings.directories {
            if !base_dir.is_dir() {
                warn!("Log directory does not exist: {}", base_dir.display());
                continue;
            }

            let max_depth = if self.settings.recursive { usize::MAX } else { 1 };
            let walker = WalkDir::new(base_dir)
                .max_depth(max_depth)
                .sort_by_file_name();

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("Error walking {}: {}", base_dir.display(), e);
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }

                let path = entry.path();
                let file_name = match path.file_name().and_then(|n| n.to_str()) {
                    Some(name) => name,
                    None => continue,
                };

                if !self.include.iter().any(|p| p.matches(file_name)) {
                    continue;
                }
                if self.exclude.iter().any(|p| p.matches(file_name)) {
                    continue;
                }

                match entry.metadata() {
                    Ok(meta) if meta.len() > self.settings.max_file_size => {
                        warn!("File too large, skipping: {}", path.display());
                        continue;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Error checking file size: {}: {}", path.display(), e);
                        continue;
                    }
                }

                let host = host_name(path, base_dir, self.settings.host_detection);
                hosts.entry(host).or_default().push(path.to_path_buf());
            }
        }

        for files in hosts.values_mut() {
            files.sort();
            files.dedup();
        }

        RegistrySnapshot { hosts }
    }
}

fn compile_patterns(sources: &[String]) -> Vec<Pattern> {
    sources
        .iter()
        .filter_map(|source| match Pattern::new(source) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                warn!("Invalid glob pattern '{}': {}", source, e);
                None
            }
        })
        .collect()
}

/// Determine the host name for a file per the configured strategy.
fn host_name(path: &Path, base_dir: &Path, strategy: HostDetection) -> String {
    let stem = || {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    let parent_name = || {
        path.parent()
            .and_then(|p| p.file_name())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(stem)
    };

    match strategy {
        HostDetection::Filename => stem(),
        HostDetection::Directory => parent_name(),
        HostDetection::Auto => {
            if path.parent() == Some(base_dir) {
                stem()
            } else {
                parent_name()
            }
        }
    }
}
