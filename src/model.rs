// Core structs: HostingServiceRecord, ExtractionResult and the error taxonomy
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One hosting provider as it leaves the pipeline and lands in the output file.
/// Field order is the order of the persisted JSON keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostingServiceRecord {
    pub service_name: String,
    pub starting_price: Option<String>,
    pub description: Option<String>,
    pub features: Option<String>,
    pub uptime_guarantee: Option<String>,
    pub security_features: Option<String>,
    pub backup_options: Option<String>,
    pub free_domain: Option<String>,
    pub money_back_guarantee: Option<String>,
    pub details: Option<String>,
    pub affiliate_link: Option<String>,
}

#[cfg(test)]
impl HostingServiceRecord {
    /// A record with only the name set; everything else absent.
    pub fn named(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            starting_price: None,
            description: None,
            features: None,
            uptime_guarantee: None,
            security_features: None,
            backup_options: None,
            free_domain: None,
            money_back_guarantee: None,
            details: None,
            affiliate_link: None,
        }
    }
}

/// The shape the model is asked to fill. It has no affiliate link: that field
/// is derived later and never comes from the model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ExtractedService {
    /// Unique name of the hosting service (website name).
    pub service_name: String,
    /// Lowest advertised price including billing period, or null if not found.
    pub starting_price: Option<String>,
    /// Short description of the service, or null if not found.
    pub description: Option<String>,
    /// Description of the main features, or null if not found.
    pub features: Option<String>,
    /// Uptime guarantee, or null if not found.
    pub uptime_guarantee: Option<String>,
    /// Security features, or null if not found.
    pub security_features: Option<String>,
    /// Backup options, or null if not found.
    pub backup_options: Option<String>,
    /// Whether and how a free domain is offered, or null if not found.
    pub free_domain: Option<String>,
    /// Money-back guarantee terms, or null if not found.
    pub money_back_guarantee: Option<String>,
    /// Any additional important information, or null if not found.
    pub details: Option<String>,
}

/// Wrapper requested from the model so that one page can describe several services.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ServiceListing {
    /// Every distinct hosting service described in the content.
    pub services: Vec<ExtractedService>,
}

impl From<ExtractedService> for HostingServiceRecord {
    fn from(s: ExtractedService) -> Self {
        Self {
            service_name: s.service_name,
            starting_price: s.starting_price,
            description: s.description,
            features: s.features,
            uptime_guarantee: s.uptime_guarantee,
            security_features: s.security_features,
            backup_options: s.backup_options,
            free_domain: s.free_domain,
            money_back_guarantee: s.money_back_guarantee,
            details: s.details,
            affiliate_link: None,
        }
    }
}

/// What a structured extraction produced for one document.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    Single(HostingServiceRecord),
    Many(Vec<HostingServiceRecord>),
}

impl ExtractionResult {
    /// Flattens both shapes into a list, keeping model order.
    pub fn into_records(self) -> Vec<HostingServiceRecord> {
        match self {
            ExtractionResult::Single(record) => vec![record],
            ExtractionResult::Many(records) => records,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ExtractionResult::Single(_) => 1,
            ExtractionResult::Many(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Where a URL was in its pipeline when something happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UrlStage {
    Fetching,
    Summarizing,
    Extracting,
    Enriching,
}

impl fmt::Display for UrlStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UrlStage::Fetching => "fetching",
            UrlStage::Summarizing => "summarizing",
            UrlStage::Extracting => "extracting",
            UrlStage::Enriching => "enriching",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("fetch timed out")]
    Timeout,
    #[error("page has no readable content")]
    EmptyContent,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error [{status}]: {body}")]
    Api { status: u16, body: String },
    #[error("model call timed out")]
    Timeout,
    #[error("model returned no content")]
    EmptyResponse,
    #[error("model refused: {0}")]
    Refused(String),
    #[error("parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("model output does not match the record schema: {0}")]
pub struct SchemaValidationError(pub String);

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExtractionError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Schema(#[from] SchemaValidationError),
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("environment variable {0} is not set")]
    MissingApiKey(String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("cannot build HTTP client: {0}")]
    HttpClient(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure of one URL's pipeline. Recovered by the batch runner.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("summarization failed: {0}")]
    Summarize(ModelError),
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractionError),
}

impl PipelineError {
    pub fn stage(&self) -> UrlStage {
        match self {
            PipelineError::Fetch(_) => UrlStage::Fetching,
            PipelineError::Summarize(_) => UrlStage::Summarizing,
            PipelineError::Extract(_) => UrlStage::Extracting,
        }
    }
}
