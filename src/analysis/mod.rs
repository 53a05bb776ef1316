//! Bounded raw-line extraction and the external analysis boundaries
//!
//! The core never talks to the analysis or translation services itself.
//! It extracts an ordered, bounded slice of raw lines and hands it across
//! the [`Analyzer`] boundary; the boundary's text result may then be
//! handed across the independent [`Translator`] boundary. Both contracts
//! are "strings in, string out or fail", and failures surface unchanged,
//! tagged with which boundary failed.

use crate::types::LogRecord;
use crate::{LogLensError, Result};
use async_trait::async_trait;

/// Extract at most `max_count` raw lines from already-filtered records,
/// preserving their order. Performs no I/O.
pub fn extract_for_analysis(records: &[LogRecord], max_count: usize) -> Vec<String> {
    records
        .iter()
        .take(max_count)
        .map(|record| record.raw.clone())
        .collect()
}

/// External text-analysis boundary
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Produce an analysis text for an ordered batch of raw log lines.
    async fn analyze(&self, lines: &[String]) -> std::result::Result<String, String>;
}

/// External translation boundary
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate an analysis text.
    async fn translate(&self, text: &str) -> std::result::Result<String, String>;
}

/// Result of a pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    /// Text returned by the analysis boundary
    pub analysis: String,
    /// Text returned by the translation boundary, when one was configured
    pub translation: Option<String>,
}

/// Orchestrates extraction and the external boundary calls
pub struct AnalysisPipeline {
    analyzer: Box<dyn Analyzer>,
    translator: Option<Box<dyn Translator>>,
}

impl AnalysisPipeline {
    /// Pipeline that stops after the analysis boundary
    pub fn new(analyzer: Box<dyn Analyzer>) -> Self {
        Self {
            analyzer,
            translator: None,
        }
    }

    /// Also run the analysis text through a translation boundary
    pub fn with_translator(mut self, translator: Box<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Extract lines from the given records and run the boundaries.
    ///
    /// Boundary failures are surfaced unchanged as
    /// [`LogLensError::Analysis`] or [`LogLensError::Translation`].
    pub async fn run(&self, records: &[LogRecord], max_count: usize) -> Result<AnalysisReport> {
        let lines = extract_for_analysis(records, max_count);

        let analysis = self
            .analyzer
            .analyze(&lines)
            .await
            .map_err(LogLensError::Analysis)?;

        let translation = match &self.translator {
            Some(translator) => Some(
                translator
                    .translate(&analysis)
                    .await
                    .map_err(LogLensError::Translation)?,
            ),
            None => None,
        };

        Ok(AnalysisReport {
            analysis,
            translation,
        })
    }
}
