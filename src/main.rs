mod config;
mod enricher;
mod extractor;
mod llm;
mod model;
mod runner;
mod scraper;
mod storage;
mod utils;

#[cfg(test)]
mod testing;

use config::{AppConfig, DEFAULT_CONFIG_PATH, load_config};
use enricher::RecordEnricher;
use extractor::{StructuredExtractor, TextSummarizer};
use llm::{LanguageModel, OpenAiClient};
use model::ConfigurationError;
use runner::{BatchRunner, RunSettings};
use crate::scraper::HttpFetcher;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use storage::{JsonFileWriter, ResultWriter};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration from file
    let config = match load_config(DEFAULT_CONFIG_PATH) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Collaborators are built up front so misconfiguration aborts before any URL is touched
    let runner = match build_runner(&config) {
        Ok(r) => r,
        Err(e) => {
            error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Collecting hosting data from {} URLs...", config.urls.len());
    let outcome = runner.run(&config.urls).await;
    outcome.report.log();

    let writer = JsonFileWriter::new(&config.output_path);
    if let Err(e) = writer.write(&outcome.records) {
        error!("Failed to write {}: {}", writer.path().display(), e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn build_runner(config: &AppConfig) -> Result<BatchRunner, ConfigurationError> {
    let client = OpenAiClient::from_config(&config.model)?;
    info!("Using model {}", client.model());
    let model: Arc<dyn LanguageModel> = Arc::new(client);

    let fetch_timeout = Duration::from_secs(config.fetch_timeout_seconds);
    let fetcher = Arc::new(HttpFetcher::new(fetch_timeout)?);

    Ok(BatchRunner::new(
        fetcher,
        TextSummarizer::new(
            model.clone(),
            config.model.max_output_tokens,
            config.max_content_chars,
        ),
        StructuredExtractor::new(model, config.model.max_output_tokens),
        RecordEnricher::new(&config.affiliate_link_template),
        RunSettings {
            concurrency: config.concurrency,
            fetch_timeout,
            model_timeout: Duration::from_secs(config.model.timeout_seconds),
        },
    ))
}
