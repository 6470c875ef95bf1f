use crate::config::ModelConfig;
use crate::llm::LanguageModel;
use crate::llm::schema::OutputSchema;
use crate::llm::types::{ChatRequest, ChatResponse};
use crate::model::{ConfigurationError, ModelError};

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Chat-completions client. Cheap to clone; share one per run.
#[derive(Clone)]
pub struct OpenAiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigurationError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
        })
    }

    /// Builds a client from the model section of the config, reading the key
    /// from the configured environment variable.
    pub fn from_config(config: &ModelConfig) -> Result<Self, ConfigurationError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigurationError::MissingApiKey(config.api_key_env.clone()))?;

        Ok(Self::new(
            api_key,
            &config.name,
            Duration::from_secs(config.timeout_seconds),
        )?
        .with_base_url(&config.api_base_url))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Swaps in a preconfigured HTTP client.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, ModelError> {
        let start = Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!("Model request failed: {}", e);
                if e.is_timeout() {
                    ModelError::Timeout
                } else {
                    ModelError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("❌ Model API responded [{}]: {}", status, body);
            return Err(ModelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Parse(e.to_string()))?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "Model {} used {} tokens ({} prompt, {} completion) in {} ms",
                request.model,
                usage.total_tokens,
                usage.prompt_tokens,
                usage.completion_tokens,
                start.elapsed().as_millis()
            );
        }

        first_content(chat_response)
    }
}

fn first_content(response: ChatResponse) -> Result<String, ModelError> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or(ModelError::EmptyResponse)?;

    if let Some(refusal) = message.refusal {
        return Err(ModelError::Refused(refusal));
    }

    message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or(ModelError::EmptyResponse)
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, prompt: &str, max_output_tokens: u32) -> Result<String, ModelError> {
        let request = ChatRequest::new(&self.model, prompt, max_output_tokens);
        self.chat(&request).await
    }

    async fn complete_structured(
        &self,
        prompt: &str,
        max_output_tokens: u32,
        schema: &OutputSchema,
    ) -> Result<serde_json::Value, ModelError> {
        let request = ChatRequest::new(&self.model, prompt, max_output_tokens).with_schema(schema);
        let content = self.chat(&request).await?;

        serde_json::from_str(&content)
            .map_err(|e| ModelError::Parse(format!("structured output is not JSON: {}", e)))
    }
}
