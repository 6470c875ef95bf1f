//! Language-model collaborators.
//!
//! The pipeline only talks to [`LanguageModel`]; [`OpenAiClient`] is the
//! production implementation and tests plug in scripted models.

pub mod client;
pub mod schema;
pub mod types;

pub use client::OpenAiClient;
pub use schema::{OutputSchema, StructuredOutput};

use crate::model::ModelError;
use async_trait::async_trait;

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Free-text completion of `prompt`.
    async fn complete(&self, prompt: &str, max_output_tokens: u32) -> Result<String, ModelError>;

    /// Completion constrained to `schema`. Returns the parsed JSON the model
    /// produced; checking it against the target type is the caller's job.
    async fn complete_structured(
        &self,
        prompt: &str,
        max_output_tokens: u32,
        schema: &OutputSchema,
    ) -> Result<serde_json::Value, ModelError>;
}
