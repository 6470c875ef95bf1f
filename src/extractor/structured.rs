use crate::llm::{LanguageModel, OutputSchema, StructuredOutput};
use crate::model::{
    ExtractedService, ExtractionError, ExtractionResult, HostingServiceRecord,
    SchemaValidationError, ServiceListing,
};

use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Shapes a structured reply is accepted in. Order matters: the listing
/// wrapper is tried first, a bare record last.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawExtraction {
    Listing(ServiceListing),
    Many(Vec<ExtractedService>),
    Single(ExtractedService),
}

/// Second model pass: turns descriptive text into validated records.
pub struct StructuredExtractor {
    model: Arc<dyn LanguageModel>,
    max_output_tokens: u32,
    schema: OutputSchema,
}

impl StructuredExtractor {
    pub fn new(model: Arc<dyn LanguageModel>, max_output_tokens: u32) -> Self {
        Self {
            model,
            max_output_tokens,
            schema: ServiceListing::output_schema(),
        }
    }

    pub async fn extract(&self, content: &str) -> Result<ExtractionResult, ExtractionError> {
        let prompt = build_prompt(content);
        let value = self
            .model
            .complete_structured(&prompt, self.max_output_tokens, &self.schema)
            .await?;

        let result = validate(value)?;
        if result.is_empty() {
            debug!("No hosting services described in content");
        } else {
            debug!("Extracted {} service(s)", result.len());
        }
        Ok(result)
    }
}

fn build_prompt(content: &str) -> String {
    format!(
        "Analyze the following content about WordPress hosting services and turn it \
         into JSON. Produce one entry in `services` for every distinct hosting service \
         described. Fields per service:\n\
         - service_name (unique name of the service)\n\
         - starting_price\n\
         - description\n\
         - features (features description)\n\
         - uptime_guarantee\n\
         - security_features\n\
         - backup_options\n\
         - free_domain\n\
         - money_back_guarantee\n\
         - details (any additional important information)\n\n\
         If a field is not found, use null. Never fabricate values for missing data.\n\n\
         Content:\n{content}\n"
    )
}

/// Checks a structured reply against the record schema and normalizes its shape.
/// An empty listing is valid: the content simply describes no service.
pub fn validate(value: Value) -> Result<ExtractionResult, SchemaValidationError> {
    let raw: RawExtraction = serde_json::from_value(value).map_err(|e| {
        SchemaValidationError(format!("expected a service listing, a list or a record: {}", e))
    })?;

    let result = match raw {
        RawExtraction::Listing(listing) => ExtractionResult::Many(accept_all(listing.services)?),
        RawExtraction::Many(services) => ExtractionResult::Many(accept_all(services)?),
        RawExtraction::Single(service) => ExtractionResult::Single(accept(service)?),
    };
    Ok(result)
}

fn accept_all(services: Vec<ExtractedService>) -> Result<Vec<HostingServiceRecord>, SchemaValidationError> {
    services.into_iter().map(accept).collect()
}

fn accept(mut service: ExtractedService) -> Result<HostingServiceRecord, SchemaValidationError> {
    let name = service.service_name.trim().to_string();
    if name.is_empty() {
        return Err(SchemaValidationError("service_name is empty".into()));
    }
    service.service_name = name;
    Ok(service.into())
}
