use crate::enricher::RecordEnricher;
use crate::extractor::{StructuredExtractor, TextSummarizer};
use crate::model::{
    ExtractionError, FetchError, HostingServiceRecord, ModelError, PipelineError, UrlStage,
};
use crate::scraper::ContentFetcher;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct RunSettings {
    /// URLs in flight at once; 1 processes them strictly one after another.
    pub concurrency: usize,
    pub fetch_timeout: Duration,
    pub model_timeout: Duration,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            concurrency: 1,
            fetch_timeout: Duration::from_secs(30),
            model_timeout: Duration::from_secs(180),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedUrl {
    pub url: String,
    pub stage: UrlStage,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: Vec<FailedUrl>,
    pub records: usize,
}

impl RunReport {
    pub fn log(&self) {
        let elapsed = self.finished_at - self.started_at;
        info!(
            "Run finished in {}s: {} of {} URLs succeeded, {} records collected",
            elapsed.num_seconds(),
            self.succeeded,
            self.attempted,
            self.records
        );
        for failure in &self.failed {
            warn!(
                "Skipped {} while {}: {}",
                failure.url, failure.stage, failure.error
            );
        }
    }
}

pub struct BatchOutcome {
    pub records: Vec<HostingServiceRecord>,
    pub report: RunReport,
}

/// Drives fetch, summarize, extract and enrich over a list of URLs.
/// A failing URL is logged and skipped; it never affects the others.
pub struct BatchRunner {
    fetcher: Arc<dyn ContentFetcher>,
    summarizer: TextSummarizer,
    extractor: StructuredExtractor,
    enricher: RecordEnricher,
    settings: RunSettings,
}

impl BatchRunner {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        summarizer: TextSummarizer,
        extractor: StructuredExtractor,
        enricher: RecordEnricher,
        settings: RunSettings,
    ) -> Self {
        Self {
            fetcher,
            summarizer,
            extractor,
            enricher,
            settings,
        }
    }

    pub async fn run(&self, urls: &[String]) -> BatchOutcome {
        let started_at = Utc::now();
        info!(
            "Processing {} URLs (concurrency {})",
            urls.len(),
            self.settings.concurrency
        );

        // `buffered` yields in input order regardless of completion order.
        let results: Vec<(&String, Result<Vec<HostingServiceRecord>, PipelineError>)> =
            stream::iter(urls)
                .map(|url| async move { (url, self.process_url(url).await) })
                .buffered(self.settings.concurrency.max(1))
                .collect()
                .await;

        let mut records = Vec::new();
        let mut failed = Vec::new();
        for (url, result) in results {
            match result {
                Ok(batch) => {
                    info!("✅ {}: {} record(s)", url, batch.len());
                    records.extend(batch);
                }
                Err(e) => {
                    warn!("❌ {} failed while {}: {}", url, e.stage(), e);
                    failed.push(FailedUrl {
                        url: url.clone(),
                        stage: e.stage(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let report = RunReport {
            started_at,
            finished_at: Utc::now(),
            attempted: urls.len(),
            succeeded: urls.len() - failed.len(),
            failed,
            records: records.len(),
        };
        BatchOutcome { records, report }
    }

    /// Full pipeline for one URL. Either every record it produced or an error;
    /// never a partial result.
    pub async fn process_url(&self, url: &str) -> Result<Vec<HostingServiceRecord>, PipelineError> {
        debug!("{}: {}", url, UrlStage::Fetching);
        let content = timeout(self.settings.fetch_timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| FetchError::Timeout)??;

        debug!("{}: {} ({} bytes)", url, UrlStage::Summarizing, content.len());
        let summary = timeout(self.settings.model_timeout, self.summarizer.summarize(&content))
            .await
            .map_err(|_| ModelError::Timeout)
            .and_then(|r| r)
            .map_err(PipelineError::Summarize)?;

        debug!("{}: {}", url, UrlStage::Extracting);
        let extracted = timeout(self.settings.model_timeout, self.extractor.extract(&summary))
            .await
            .map_err(|_| ExtractionError::Model(ModelError::Timeout))??;

        debug!("{}: {}", url, UrlStage::Enriching);
        Ok(extracted
            .into_records()
            .iter()
            .map(|record| self.enricher.enrich(record, url))
            .collect())
    }
}
