//! Engine façade coordinating discovery, caching, queries and statistics
//!
//! [`LogEngine`] ties the components together behind the four logical
//! operations a serving layer consumes: host listing, log retrieval,
//! statistics, and analysis-input extraction. Every operation takes the
//! host as a plain parameter; the engine holds no current-host session
//! state.

use crate::analysis;
use crate::config::Config;
use crate::parser::LineParser;
use crate::query::{self, LogFilter, QueryOptions, QueryPage};
use crate::registry::HostRegistry;
use crate::stats;
use crate::store::{LogStore, StoreCache};
use crate::types::{StatsResult, TimeWindow};
use crate::Result;
use std::sync::Arc;
use tracing::debug;

/// Main query engine over discovered hosts
pub struct LogEngine {
    config: Config,
    registry: HostRegistry,
    cache: StoreCache,
    parser: LineParser,
}

impl LogEngine {
    /// Create an engine with the given configuration and run the initial
    /// host discovery.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let registry = HostRegistry::new(config.discovery.clone());
        let cache = StoreCache::new(config.cache.refresh_seconds);

        Ok(Self {
            config,
            registry,
            cache,
            parser: LineParser::new(),
        })
    }

    /// Configuration the engine was created with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discovered host names in lexicographic order
    pub fn list_hosts(&self) -> Vec<String> {
        self.registry.list_hosts()
    }

    /// Fetch a filtered, optionally sorted, paginated page of a host's
    /// records.
    ///
    /// An unknown host yields an empty page, not an error: host existence
    /// is advisory.
    pub async fn list_logs(&self, host: &str, options: &QueryOptions) -> QueryPage {
        let store = self.store_for(host).await;
        query::run(&store, options)
    }

    /// Aggregate statistics for a host over a time window.
    ///
    /// An unknown host yields zeroed statistics.
    pub async fn get_stats(&self, host: &str, window: TimeWindow) -> StatsResult {
        let store = self.store_for(host).await;
        stats::aggregate(&store, window)
    }

    /// Raw lines for the external analysis boundary: the host's records
    /// with the given filters applied, truncated to `max_count`, in
    /// file-appearance order.
    pub async fn prepare_analysis_input(
        &self,
        host: &str,
        filter: &LogFilter,
        max_count: usize,
    ) -> Vec<String> {
        let store = self.store_for(host).await;
        let options = QueryOptions {
            filter: filter.clone(),
            limit: max_count,
            ..QueryOptions::default()
        };
        let page = query::run(&store, &options);
        analysis::extract_for_analysis(&page.records, max_count)
    }

    /// Re-run host discovery and drop every cached store.
    pub fn refresh(&self) {
        debug!("refreshing host registry and store cache");
        self.registry.refresh();
        self.cache.clear();
    }

    async fn store_for(&self, host: &str) -> Arc<LogStore> {
        let files = self.registry.resolve(host);
        if files.is_empty() {
            return Arc::new(LogStore::empty(host));
        }
        self.cache.get_or_build(host, &files, &self.parser).await
    }
}
